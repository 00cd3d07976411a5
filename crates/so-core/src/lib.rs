//! so-core: stable foundation for streamorder.
//!
//! Contains:
//! - ids (stable compact IDs for nodes and stream segments)
//! - geometry (planar points + tolerance checks)
//! - numeric (Real + tolerances + float helpers)
//! - report (explicit, indentation-aware logging handle)
//! - elevation (terrain sampling seam)
//! - error (shared error types)

pub mod elevation;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod numeric;
pub mod report;

// Re-exports: nice ergonomics for downstream crates
pub use elevation::ElevationSampler;
pub use error::{SoError, SoResult};
pub use geometry::Point;
pub use ids::*;
pub use numeric::*;
pub use report::Reporter;
