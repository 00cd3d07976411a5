//! so-graph: entity model for stream networks.
//!
//! Provides:
//! - Segment and Node records held in an id-keyed arena (`Network`)
//! - Endpoint clustering of raw line geometry into shared nodes
//! - Reverse stream -> node indexing for reporting
//!
//! # Example
//!
//! ```
//! use so_core::{Point, SegmentId};
//! use so_graph::NodeGraphBuilder;
//!
//! let a = SegmentId::new(1).unwrap();
//! let b = SegmentId::new(2).unwrap();
//! let mut builder = NodeGraphBuilder::new(0.01);
//! builder.add_line(a, &[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).unwrap();
//! builder.add_line(b, &[Point::new(1.0, 1.0), Point::new(2.0, 0.0)]).unwrap();
//! let graph = builder.build().unwrap();
//!
//! assert_eq!(graph.nodes.len(), 3);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod indexing;
pub mod validate;

// Re-exports for ergonomics
pub use builder::{NodeGraph, NodeGraphBuilder};
pub use error::GraphError;
pub use graph::{Network, Node, Segment, UNRESOLVED_ORDER};
pub use indexing::StreamNodeIndex;
pub use validate::validate_network;
