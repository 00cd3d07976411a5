//! Flow direction resolution outward from drainage outlets.

use std::collections::{BTreeSet, HashMap};

use so_core::{NodeId, Reporter, SegmentId};
use so_graph::Network;

use crate::advisory::Advisories;
use crate::error::{TopologyError, TopologyResult};

/// Outcome of flow resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowReport {
    /// Segments still missing a from or to node.
    pub unconnected: Vec<SegmentId>,
    /// Segments flagged braided while resolving, ascending.
    pub auto_braided: Vec<SegmentId>,
    /// Nodes marked `start_node`, ascending.
    pub headwaters: Vec<NodeId>,
    /// Number of upstream waves run.
    pub waves: usize,
}

impl FlowReport {
    pub fn advisories(&self) -> Advisories {
        Advisories {
            unconnected: self.unconnected.clone(),
            auto_braided: self.auto_braided.clone(),
            ..Advisories::default()
        }
    }
}

/// Wave-based resolver state over a network whose node incidences are
/// still pending.
pub struct FlowResolver<'a> {
    network: &'a mut Network,
    reporter: Reporter,
    /// Nodes that can still be picked as an upstream end.
    pool: BTreeSet<NodeId>,
    /// Every node touching a segment, ascending.
    holders: HashMap<SegmentId, Vec<NodeId>>,
    auto_braided: BTreeSet<SegmentId>,
    headwaters: BTreeSet<NodeId>,
}

/// Resolve from/to nodes for every segment reachable from `drainage`.
///
/// This function:
/// 1. Attaches every segment touching a drainage node as flowing into it
/// 2. Repeats, wave by wave: finds each frontier segment's upstream node,
///    flags segments sharing an upstream node as braided, then attaches the
///    node's remaining segments as the next frontier
/// 3. Marks nodes that feed no further segment as headwaters
///
/// # Arguments
/// * `network` - Clustered network with pending node incidences
/// * `drainage` - Outlet node ids; all must exist
/// * `reporter` - Logging handle for progress messages
pub fn resolve_flow(
    network: &mut Network,
    drainage: &[NodeId],
    reporter: &Reporter,
) -> TopologyResult<FlowReport> {
    FlowResolver::new(network, reporter).resolve(drainage)
}

impl<'a> FlowResolver<'a> {
    pub fn new(network: &'a mut Network, reporter: &Reporter) -> Self {
        Self {
            network,
            reporter: *reporter,
            pool: BTreeSet::new(),
            holders: HashMap::new(),
            auto_braided: BTreeSet::new(),
            headwaters: BTreeSet::new(),
        }
    }

    pub fn resolve(mut self, drainage: &[NodeId]) -> TopologyResult<FlowReport> {
        self.reporter.msg("Calculating flow..");
        let mut active = self.seed(drainage)?;

        let mut waves = 0;
        while !active.is_empty() {
            waves += 1;
            let active_nodes = self.upstream_wave(&active)?;
            self.flag_splits(&active, &active_nodes)?;
            active = self.downstream_pass(&active_nodes)?;
            tracing::debug!(wave = waves, frontier = active.len(), "flow wave complete");
        }

        let unconnected: Vec<SegmentId> = self
            .network
            .segments()
            .filter(|s| !s.is_connected())
            .map(|s| s.id)
            .collect();

        self.reporter.nested().msg(format!(
            "{} waves, {} headwaters, {} braided, {} unconnected",
            waves,
            self.headwaters.len(),
            self.auto_braided.len(),
            unconnected.len()
        ));

        Ok(FlowReport {
            unconnected,
            auto_braided: self.auto_braided.into_iter().collect(),
            headwaters: self.headwaters.into_iter().collect(),
            waves,
        })
    }

    /// Validate drainage ids, reset flags and attach outlet segments.
    fn seed(&mut self, drainage: &[NodeId]) -> TopologyResult<Vec<SegmentId>> {
        let missing: Vec<NodeId> = drainage
            .iter()
            .filter(|&&n| !self.network.contains_node(n))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(TopologyError::DrainageMismatch { missing });
        }

        for id in self.network.node_ids() {
            if let Some(node) = self.network.node_mut(id) {
                node.start_node = false;
                node.end_node = false;
                node.drainage = false;
            }
            self.pool.insert(id);
        }

        for node in self.network.nodes() {
            for segment in node.incident_ids() {
                self.network.segment_at(node.id, segment)?;
                let holders = self.holders.entry(segment).or_default();
                if holders.last() != Some(&node.id) {
                    holders.push(node.id);
                }
            }
        }

        let mut frontier = Vec::new();
        for &outlet in drainage {
            // repeated ids are seeded once
            if !self.pool.remove(&outlet) {
                continue;
            }
            let Some(node) = self.network.node_mut(outlet) else {
                continue;
            };
            node.end_node = true;
            node.drainage = true;
            let pending = node.pending().to_vec();

            for segment in pending {
                self.network.resolve_entry(outlet, segment)?;
                let attached = self
                    .network
                    .segment(segment)
                    .is_some_and(|s| s.to_node().is_some());
                if !attached {
                    self.network.connect_to(segment, outlet)?;
                    frontier.push(segment);
                }
            }
        }
        Ok(frontier)
    }

    /// Assign the upstream node of every frontier segment.
    fn upstream_wave(&mut self, active: &[SegmentId]) -> TopologyResult<Vec<NodeId>> {
        let mut active_nodes = Vec::new();
        for &segment in active {
            let has_from = self
                .network
                .segment(segment)
                .is_some_and(|s| s.from_node().is_some());
            if has_from {
                // re-entrant braided topology
                self.flag(segment)?;
                continue;
            }

            let Some(from) = self.find_upstream(segment) else {
                self.reporter.error(format!(
                    "Error finding upstream node for segment ({})",
                    segment
                ));
                return Err(TopologyError::TopologyResolution { segment });
            };
            if self
                .network
                .node(from)
                .is_some_and(|n| n.holds_pending(segment))
            {
                self.network.resolve_entry(from, segment)?;
            }
            self.network.connect_from(segment, from)?;

            if !active_nodes.contains(&from) {
                active_nodes.push(from);
            }
            self.retire_if_settled(from);
        }
        Ok(active_nodes)
    }

    /// First pooled node that still lists the segment as pending, or lists
    /// it as resolved without being its downstream end.
    fn find_upstream(&self, segment: SegmentId) -> Option<NodeId> {
        let to = self.network.segment(segment)?.to_node();
        self.holders.get(&segment)?.iter().copied().find(|&candidate| {
            self.pool.contains(&candidate)
                && self.network.node(candidate).is_some_and(|n| {
                    n.holds_pending(segment)
                        || (n.holds_resolved(segment) && Some(candidate) != to)
                })
        })
    }

    /// Segments of one wave that leave the same node are parallel paths.
    fn flag_splits(&mut self, active: &[SegmentId], active_nodes: &[NodeId]) -> TopologyResult<()> {
        for &node in active_nodes {
            let claims: Vec<SegmentId> = active
                .iter()
                .copied()
                .filter(|&s| {
                    self.network
                        .segment(s)
                        .is_some_and(|seg| seg.from_node() == Some(node))
                })
                .collect();
            if claims.len() > 1 {
                for segment in claims {
                    self.flag(segment)?;
                }
            }
        }
        Ok(())
    }

    /// Attach each active node's remaining pending segments.
    fn downstream_pass(&mut self, active_nodes: &[NodeId]) -> TopologyResult<Vec<SegmentId>> {
        let mut next = Vec::new();
        for &node in active_nodes {
            let pending = self
                .network
                .node(node)
                .map(|n| n.pending().to_vec())
                .unwrap_or_default();

            let mut connected = 0;
            for segment in pending {
                self.network.resolve_entry(node, segment)?;
                let (to, from) = match self.network.segment(segment) {
                    Some(s) => (s.to_node(), s.from_node()),
                    None => (None, None),
                };
                match (to, from) {
                    (None, _) => {
                        self.network.connect_to(segment, node)?;
                        next.push(segment);
                        connected += 1;
                    }
                    // another branch already claimed the downstream end
                    (Some(_), None) => {
                        self.network.connect_from(segment, node)?;
                        self.flag(segment)?;
                    }
                    (Some(_), Some(_)) => {
                        self.reporter.error(format!(
                            "Error finding upstream node for segment ({})",
                            segment
                        ));
                        return Err(TopologyError::TopologyResolution { segment });
                    }
                }
            }
            self.retire_if_settled(node);

            if connected == 0 {
                if let Some(n) = self.network.node_mut(node) {
                    n.start_node = true;
                }
                self.headwaters.insert(node);
            }
        }
        Ok(next)
    }

    fn flag(&mut self, segment: SegmentId) -> TopologyResult<()> {
        self.network.set_braided(segment, true)?;
        self.auto_braided.insert(segment);
        Ok(())
    }

    fn retire_if_settled(&mut self, node: NodeId) {
        if self.network.node(node).is_some_and(|n| n.is_settled()) {
            self.pool.remove(&node);
        }
    }
}
