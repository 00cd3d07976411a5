//! Error types for topology passes.

use so_core::{NodeId, SegmentId, join_ids};
use so_graph::GraphError;
use thiserror::Error;

/// Fatal failures; each one means the input network needs manual cleanup
/// before a rerun.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    #[error(
        "Error finding upstream node for segment ({segment}): often due to complex braided \
         networks, streams may need to be cleaned and reprocessed"
    )]
    TopologyResolution { segment: SegmentId },

    #[error(
        "Could not find shared end node for all assumed braided flows out of start node={source_node}; \
         complex networks with braided and unbraided streams from a common start node should be \
         classified manually"
    )]
    BraidResolution { source_node: NodeId },

    #[error("Could not match all drainage node IDs given (unmatched: {})", join_ids(.missing))]
    DrainageMismatch { missing: Vec<NodeId> },

    #[error("Node {node} has no coordinate to sample elevation at")]
    MissingCoordinate { node: NodeId },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type TopologyResult<T> = Result<T, TopologyError>;
