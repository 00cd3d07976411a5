//! Drainage topology for clustered stream networks.
//!
//! Three wave-based passes run over a `so_graph::Network`:
//! - `flow`: resolves from/to nodes outward from drainage outlets and flags
//!   simple braid ambiguities
//! - `braid`: delineates each braided sub-network by fraction-conservation
//!   tracing, optionally orienting segments by terrain first
//! - `order`: assigns Strahler stream order with braid-aware tie-breaking
//!
//! Every pass either completes or returns a `TopologyError`; ambiguity the
//! passes cannot settle is never guessed.

pub mod advisory;
pub mod braid;
pub mod error;
pub mod flow;
pub mod order;

pub use advisory::Advisories;
pub use braid::{
    BraidReport, BraidTrace, Orientation, complete_braids, orient_by_elevation, trace_braid,
};
pub use error::{TopologyError, TopologyResult};
pub use flow::{FlowReport, FlowResolver, resolve_flow};
pub use order::{OrderReport, classify_stream_order, combine_orders};
