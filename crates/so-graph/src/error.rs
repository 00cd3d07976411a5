//! Graph-specific error types.

use so_core::{NodeId, SegmentId};

/// Network construction and mutation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A line feature has no points to place endpoint nodes on.
    EmptyGeometry { segment: SegmentId },

    /// Clustering tolerance is negative or not finite.
    InvalidTolerance { value: f64 },

    /// The same stream id was supplied twice.
    DuplicateSegment { segment: SegmentId },

    /// The same node id was supplied twice.
    DuplicateNode { node: NodeId },

    /// A node lists a segment id that is not in the segment set.
    UnknownSegment { node: NodeId, segment: SegmentId },

    /// No segment with this stream id.
    MissingSegment { segment: SegmentId },

    /// A segment refers to a node id that is not in the node set.
    UnknownNode { segment: SegmentId, node: NodeId },

    /// Tried to resolve an incidence that is not pending on the node.
    NotPending { node: NodeId, segment: SegmentId },

    /// A segment end was already assigned; from/to never change once set.
    DirectionAlreadySet {
        segment: SegmentId,
        end: &'static str,
        existing: NodeId,
    },

    /// Assignment would make a segment flow into its own start node.
    SelfLoop { segment: SegmentId, node: NodeId },

    /// Operation needs both ends of the segment resolved.
    Unresolved { segment: SegmentId },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::EmptyGeometry { segment } => {
                write!(f, "Stream {} has no geometry points", segment)
            }
            GraphError::InvalidTolerance { value } => {
                write!(f, "Node tolerance must be finite and >= 0 (got {})", value)
            }
            GraphError::DuplicateSegment { segment } => {
                write!(f, "Stream id {} appears more than once", segment)
            }
            GraphError::DuplicateNode { node } => {
                write!(f, "Node id {} appears more than once", node)
            }
            GraphError::UnknownSegment { node, segment } => {
                write!(f, "Could not find segment ({}) for node ({})", segment, node)
            }
            GraphError::MissingSegment { segment } => {
                write!(f, "Could not find segment ({})", segment)
            }
            GraphError::UnknownNode { segment, node } => {
                write!(f, "Could not find node ({}) for segment ({})", node, segment)
            }
            GraphError::NotPending { node, segment } => {
                write!(
                    f,
                    "Segment {} is not an unresolved entry of node {}",
                    segment, node
                )
            }
            GraphError::DirectionAlreadySet {
                segment,
                end,
                existing,
            } => {
                write!(
                    f,
                    "Segment {} already has {} node {}",
                    segment, end, existing
                )
            }
            GraphError::SelfLoop { segment, node } => {
                write!(
                    f,
                    "Segment {} would start and end at node {}",
                    segment, node
                )
            }
            GraphError::Unresolved { segment } => {
                write!(f, "Segment {} has no resolved from/to nodes", segment)
            }
        }
    }
}

impl std::error::Error for GraphError {}
