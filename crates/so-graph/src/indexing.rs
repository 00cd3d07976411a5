//! Reverse indexing: stream id -> nodes the stream touches.
//!
//! Feeds the `STREAM_ID, NODES` report table; flow resolution works on the
//! node side and never needs it.

use std::collections::HashMap;

use so_core::{NodeId, SegmentId};

use crate::graph::Node;

/// Stream -> node mapping, kept in stream input order.
#[derive(Debug, Clone, Default)]
pub struct StreamNodeIndex {
    /// Stream ids in the order the lines were read.
    stream_ids: Vec<SegmentId>,
    /// Node ids per stream, in node order.
    nodes_by_stream: HashMap<SegmentId, Vec<NodeId>>,
}

impl StreamNodeIndex {
    /// Build from nodes carrying (pending or resolved) stream ids.
    ///
    /// Streams listed in `stream_ids` but touching no node still get an
    /// (empty) entry so every stream appears in reports.
    pub fn from_nodes(stream_ids: Vec<SegmentId>, nodes: &[Node]) -> Self {
        let mut nodes_by_stream: HashMap<SegmentId, Vec<NodeId>> = stream_ids
            .iter()
            .map(|&sid| (sid, Vec::new()))
            .collect();
        for node in nodes {
            for sid in node.incident_ids() {
                nodes_by_stream.entry(sid).or_default().push(node.id);
            }
        }
        Self {
            stream_ids,
            nodes_by_stream,
        }
    }

    pub fn stream_ids(&self) -> &[SegmentId] {
        &self.stream_ids
    }

    pub fn len(&self) -> usize {
        self.stream_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stream_ids.is_empty()
    }

    /// Nodes touched by a stream (empty if unknown).
    pub fn nodes_of(&self, stream: SegmentId) -> &[NodeId] {
        self.nodes_by_stream
            .get(&stream)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// (stream, nodes) pairs in stream input order.
    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &[NodeId])> + '_ {
        self.stream_ids.iter().map(|&sid| (sid, self.nodes_of(sid)))
    }
}
