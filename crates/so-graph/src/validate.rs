//! Network consistency checks run before results are persisted.

use crate::error::GraphError;
use crate::graph::Network;

/// Validate cross references: incidences name known segments, segment ends
/// name known nodes that list the segment as resolved, no self-loops.
pub fn validate_network(network: &Network) -> Result<(), GraphError> {
    // Node -> segment references
    for node in network.nodes() {
        for segment in node.incident_ids() {
            network.segment_at(node.id, segment)?;
        }
    }

    // Segment -> node references
    for segment in network.segments() {
        for end in [segment.from_node(), segment.to_node()].into_iter().flatten() {
            let node = network.node(end).ok_or(GraphError::UnknownNode {
                segment: segment.id,
                node: end,
            })?;
            if !node.holds_resolved(segment.id) {
                return Err(GraphError::NotPending {
                    node: end,
                    segment: segment.id,
                });
            }
        }
        if let (Some(from), Some(to)) = (segment.from_node(), segment.to_node()) {
            if from == to {
                return Err(GraphError::SelfLoop {
                    segment: segment.id,
                    node: from,
                });
            }
        }
    }

    Ok(())
}
