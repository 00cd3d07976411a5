//! Shared application service layer for streamorder.
//!
//! Loads run configs, opens the stream/node datasets and output directory,
//! and drives the pipeline stages in order. The CLI is a thin wrapper over
//! this crate.

pub mod error;
pub mod loader;
pub mod progress;
pub mod run_service;
pub mod stage_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use loader::{pending_network, resolved_network, stream_ids};
pub use progress::{RunStage, StageEvent};
pub use run_service::{
    RunResponse, load_config, run_pipeline, run_pipeline_with_progress, run_stage,
};
pub use stage_service::{
    NetworkSummary, calculate_flow, calculate_stream_order, complete_braided_streams,
    get_node_network, prepare_stream,
};
