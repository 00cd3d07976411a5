//! Core network data structures.

use std::collections::BTreeMap;

use so_core::{NodeId, Point, SegmentId};

use crate::error::GraphError;

/// Stream order sentinel for segments not yet classified.
pub const UNRESOLVED_ORDER: i32 = -1;

/// A directed stream reach between two nodes.
///
/// `from_node`/`to_node` start unset and are filled in by flow resolution.
/// Once set they are never reassigned; `Network::reverse` is the one
/// explicit exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub id: SegmentId,
    from_node: Option<NodeId>,
    to_node: Option<NodeId>,
    pub order: i32,
    pub braided: bool,
}

impl Segment {
    pub fn new(id: SegmentId) -> Self {
        Self {
            id,
            from_node: None,
            to_node: None,
            order: UNRESOLVED_ORDER,
            braided: false,
        }
    }

    /// Segment with known direction, as read back from stored attributes.
    pub fn directed(id: SegmentId, from: Option<NodeId>, to: Option<NodeId>) -> Self {
        Self {
            from_node: from,
            to_node: to,
            ..Self::new(id)
        }
    }

    pub fn from_node(&self) -> Option<NodeId> {
        self.from_node
    }

    pub fn to_node(&self) -> Option<NodeId> {
        self.to_node
    }

    /// Both ends known.
    pub fn is_connected(&self) -> bool {
        self.from_node.is_some() && self.to_node.is_some()
    }
}

/// A point where one or more segments meet.
///
/// Incidences live in two explicit lists. `pending` holds raw stream ids
/// that flow resolution has not reached yet; `resolved` holds the ones
/// that have become edges. An id moves from the first to the second
/// exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub coord: Option<Point>,
    pending: Vec<SegmentId>,
    resolved: Vec<SegmentId>,
    /// Headwater: nothing flows in.
    pub start_node: bool,
    /// Outlet: nothing flows out.
    pub end_node: bool,
    /// Manually designated drainage outlet.
    pub drainage: bool,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            coord: None,
            pending: Vec::new(),
            resolved: Vec::new(),
            start_node: false,
            end_node: false,
            drainage: false,
        }
    }

    /// Node whose incidences are all still raw stream ids.
    pub fn with_pending(id: NodeId, coord: Option<Point>, pending: Vec<SegmentId>) -> Self {
        Self {
            coord,
            pending,
            ..Self::new(id)
        }
    }

    pub fn pending(&self) -> &[SegmentId] {
        &self.pending
    }

    pub fn resolved(&self) -> &[SegmentId] {
        &self.resolved
    }

    pub fn incident_count(&self) -> usize {
        self.pending.len() + self.resolved.len()
    }

    /// Resolved entries first, then the ones still pending.
    pub fn incident_ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.resolved.iter().chain(self.pending.iter()).copied()
    }

    /// Exactly one line touches this node.
    pub fn is_end_point(&self) -> bool {
        self.incident_count() == 1
    }

    pub fn holds_pending(&self, segment: SegmentId) -> bool {
        self.pending.contains(&segment)
    }

    pub fn holds_resolved(&self, segment: SegmentId) -> bool {
        self.resolved.contains(&segment)
    }

    /// No raw ids left.
    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Id-keyed arena of segments and nodes.
///
/// All relations are expressed as ids into this arena, so braided
/// (parallel) paths and cycles need no special representation.
#[derive(Debug, Clone, Default)]
pub struct Network {
    segments: BTreeMap<SegmentId, Segment>,
    nodes: BTreeMap<NodeId, Node>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a network, checking id uniqueness and that every node
    /// incidence names a known segment.
    pub fn from_parts(
        segments: impl IntoIterator<Item = Segment>,
        nodes: impl IntoIterator<Item = Node>,
    ) -> Result<Self, GraphError> {
        let mut network = Self::new();
        for segment in segments {
            network.insert_segment(segment)?;
        }
        for node in nodes {
            network.insert_node(node)?;
        }
        for node in network.nodes.values() {
            for segment in node.incident_ids() {
                if !network.segments.contains_key(&segment) {
                    return Err(GraphError::UnknownSegment {
                        node: node.id,
                        segment,
                    });
                }
            }
        }
        Ok(network)
    }

    /// Build the node set from segment from/to ids alone.
    ///
    /// Nodes are created on first mention; every end that is set becomes a
    /// resolved incidence.
    pub fn from_directed(segments: impl IntoIterator<Item = Segment>) -> Result<Self, GraphError> {
        let mut network = Self::new();
        let mut ends = Vec::new();
        for segment in segments {
            ends.push((segment.id, segment.from_node, segment.to_node));
            network.insert_segment(Segment {
                from_node: None,
                to_node: None,
                ..segment
            })?;
        }
        for (id, from, to) in ends {
            for node in [from, to].into_iter().flatten() {
                network.nodes.entry(node).or_insert_with(|| Node::new(node));
            }
            network.link(id, from, to)?;
        }
        Ok(network)
    }

    pub fn insert_segment(&mut self, segment: Segment) -> Result<(), GraphError> {
        if self.segments.contains_key(&segment.id) {
            return Err(GraphError::DuplicateSegment {
                segment: segment.id,
            });
        }
        self.segments.insert(segment.id, segment);
        Ok(())
    }

    pub fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode { node: node.id });
        }
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Segments in ascending id order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }

    /// Nodes in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.segments.keys().copied().collect()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Segment lookup that fails with the node that referenced it.
    pub fn segment_at(&self, node: NodeId, id: SegmentId) -> Result<&Segment, GraphError> {
        self.segments
            .get(&id)
            .ok_or(GraphError::UnknownSegment { node, segment: id })
    }

    pub fn set_braided(&mut self, id: SegmentId, braided: bool) -> Result<(), GraphError> {
        self.segment_mut(id)?.braided = braided;
        Ok(())
    }

    pub fn set_order(&mut self, id: SegmentId, order: i32) -> Result<(), GraphError> {
        self.segment_mut(id)?.order = order;
        Ok(())
    }

    /// Resolved segments flowing into `node`.
    pub fn upstream_segments(&self, node: NodeId) -> Vec<SegmentId> {
        self.resolved_where(node, |s| s.to_node == Some(node))
    }

    /// Resolved segments flowing out of `node`.
    pub fn downstream_segments(&self, node: NodeId) -> Vec<SegmentId> {
        self.resolved_where(node, |s| s.from_node == Some(node))
    }

    fn resolved_where(&self, node: NodeId, keep: impl Fn(&Segment) -> bool) -> Vec<SegmentId> {
        let Some(n) = self.nodes.get(&node) else {
            return Vec::new();
        };
        let mut out: Vec<SegmentId> = Vec::new();
        for id in &n.resolved {
            if out.contains(id) {
                continue;
            }
            if self.segments.get(id).is_some_and(&keep) {
                out.push(*id);
            }
        }
        out
    }

    /// Move the first pending occurrence of `segment` on `node` to resolved.
    pub fn resolve_entry(&mut self, node: NodeId, segment: SegmentId) -> Result<(), GraphError> {
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode { segment, node })?;
        let pos = n
            .pending
            .iter()
            .position(|&s| s == segment)
            .ok_or(GraphError::NotPending { node, segment })?;
        n.pending.remove(pos);
        n.resolved.push(segment);
        Ok(())
    }

    /// Set the upstream end of a segment.
    pub fn connect_from(&mut self, segment: SegmentId, node: NodeId) -> Result<(), GraphError> {
        self.require_node(segment, node)?;
        let s = self.segment_mut(segment)?;
        if let Some(existing) = s.from_node {
            return Err(GraphError::DirectionAlreadySet {
                segment,
                end: "from",
                existing,
            });
        }
        if s.to_node == Some(node) {
            return Err(GraphError::SelfLoop { segment, node });
        }
        s.from_node = Some(node);
        Ok(())
    }

    /// Set the downstream end of a segment.
    pub fn connect_to(&mut self, segment: SegmentId, node: NodeId) -> Result<(), GraphError> {
        self.require_node(segment, node)?;
        let s = self.segment_mut(segment)?;
        if let Some(existing) = s.to_node {
            return Err(GraphError::DirectionAlreadySet {
                segment,
                end: "to",
                existing,
            });
        }
        if s.from_node == Some(node) {
            return Err(GraphError::SelfLoop { segment, node });
        }
        s.to_node = Some(node);
        Ok(())
    }

    /// Swap from/to of a fully resolved segment.
    pub fn reverse(&mut self, segment: SegmentId) -> Result<(), GraphError> {
        let s = self.segment_mut(segment)?;
        match (s.from_node, s.to_node) {
            (Some(from), Some(to)) => {
                s.from_node = Some(to);
                s.to_node = Some(from);
                Ok(())
            }
            _ => Err(GraphError::Unresolved { segment }),
        }
    }

    /// Attach known ends of a segment, resolving the matching node
    /// incidences (or adding them when the node never listed the segment).
    pub fn link(
        &mut self,
        segment: SegmentId,
        from: Option<NodeId>,
        to: Option<NodeId>,
    ) -> Result<(), GraphError> {
        if let Some(node) = from {
            self.connect_from(segment, node)?;
            self.attach(node, segment)?;
        }
        if let Some(node) = to {
            self.connect_to(segment, node)?;
            self.attach(node, segment)?;
        }
        Ok(())
    }

    fn attach(&mut self, node: NodeId, segment: SegmentId) -> Result<(), GraphError> {
        let n = self
            .nodes
            .get_mut(&node)
            .ok_or(GraphError::UnknownNode { segment, node })?;
        if n.holds_pending(segment) {
            return self.resolve_entry(node, segment);
        }
        if !n.holds_resolved(segment) {
            n.resolved.push(segment);
        }
        Ok(())
    }

    fn require_node(&self, segment: SegmentId, node: NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode { segment, node })
        }
    }

    fn segment_mut(&mut self, id: SegmentId) -> Result<&mut Segment, GraphError> {
        self.segments
            .get_mut(&id)
            .ok_or(GraphError::MissingSegment { segment: id })
    }
}
