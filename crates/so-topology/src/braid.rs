//! Braided sub-network completion.
//!
//! A braid starts where flow splits and ends where every split path has
//! merged again. The merge node is found by sending a fixed quantity down
//! from the split node: each node divides what it receives evenly among its
//! downstream segments, and the first node that collects the full quantity
//! back is the merge. Every segment between the two is part of the braid.

use std::collections::{BTreeSet, HashMap};

use so_core::{
    ElevationSampler, NodeId, Real, Reporter, SegmentId, Tolerances, even_share, nearly_equal,
};
use so_graph::{GraphError, Network};

use crate::advisory::Advisories;
use crate::error::{TopologyError, TopologyResult};

/// Quantity released at the split node. Large enough that repeated halving
/// stays well above the tolerance.
pub const SOURCE_QUANTITY: Real = 1_000_000.0;

/// Absolute tolerance when matching a node's quantity against the source.
pub const MERGE_TOLERANCE: Tolerances = Tolerances::absolute(1e-4);

/// One delineated braid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BraidTrace {
    pub source: NodeId,
    pub merge: NodeId,
    /// Nodes reached while sending the quantity down, in reach order.
    pub touched: Vec<NodeId>,
    /// Segments between source and merge, in discovery order.
    pub segments: Vec<SegmentId>,
}

/// Direction changes made from terrain samples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Orientation {
    pub reversed: Vec<SegmentId>,
    /// Braided segments left as they were for lack of a sample.
    pub skipped: Vec<SegmentId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BraidReport {
    pub reversed: Vec<SegmentId>,
    pub elevation_skipped: Vec<SegmentId>,
    pub traces: Vec<BraidTrace>,
    /// Union of all traced segments, ascending.
    pub braided: Vec<SegmentId>,
}

impl BraidReport {
    pub fn advisories(&self) -> Advisories {
        Advisories {
            elevation_skipped: self.elevation_skipped.clone(),
            ..Advisories::default()
        }
    }
}

fn braided_segments(network: &Network) -> Vec<SegmentId> {
    network
        .segments()
        .filter(|s| s.braided)
        .map(|s| s.id)
        .collect()
}

fn resolved_ends(network: &Network, segment: SegmentId) -> TopologyResult<(NodeId, NodeId)> {
    let s = network
        .segment(segment)
        .ok_or(GraphError::MissingSegment { segment })?;
    match (s.from_node(), s.to_node()) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(GraphError::Unresolved { segment }.into()),
    }
}

/// Reverse braided segments whose upstream end sits lower than their
/// downstream end.
pub fn orient_by_elevation(
    network: &mut Network,
    sampler: &dyn ElevationSampler,
    reporter: &Reporter,
) -> TopologyResult<Orientation> {
    reporter.msg("Orienting braided segments by elevation..");
    let mut orientation = Orientation::default();

    for segment in braided_segments(network) {
        let (from, to) = resolved_ends(network, segment)?;
        let mut samples = [None, None];
        for (slot, node) in samples.iter_mut().zip([from, to]) {
            let coord = network
                .node(node)
                .and_then(|n| n.coord)
                .ok_or(TopologyError::MissingCoordinate { node })?;
            *slot = sampler.elevation_at(coord);
        }

        match samples {
            [Some(up), Some(down)] => {
                if up < down {
                    network.reverse(segment)?;
                    orientation.reversed.push(segment);
                }
            }
            _ => {
                reporter
                    .nested()
                    .warn(format!("No elevation at the ends of segment ({segment})"));
                orientation.skipped.push(segment);
            }
        }
    }

    if !orientation.reversed.is_empty() {
        reporter
            .nested()
            .msg(format!("{} segments reversed", orientation.reversed.len()));
    }
    Ok(orientation)
}

/// Delineate the braid that splits at `source`.
pub fn trace_braid(network: &Network, source: NodeId) -> TopologyResult<BraidTrace> {
    let mut node_quantity: HashMap<NodeId, Real> = HashMap::new();
    let mut segment_quantity: HashMap<SegmentId, Real> = HashMap::new();
    node_quantity.insert(source, SOURCE_QUANTITY);

    let mut touched = vec![source];
    let mut active = vec![source];
    let mut merge = None;
    // cyclic input never collects the full quantity
    let wave_limit = network.node_count();
    let mut waves = 0;

    while merge.is_none() && !active.is_empty() && waves < wave_limit {
        waves += 1;
        let mut next = Vec::new();
        for node in &active {
            let downstream = network.downstream_segments(*node);
            if downstream.is_empty() {
                continue;
            }
            let quantity = node_quantity.get(node).copied().unwrap_or(0.0);
            let share = even_share(quantity, downstream.len());
            for segment in downstream {
                *segment_quantity.entry(segment).or_insert(0.0) += share;
                if let Some(to) = network.segment(segment).and_then(|s| s.to_node()) {
                    if !next.contains(&to) {
                        next.push(to);
                    }
                }
            }
        }

        for &node in &next {
            touched.push(node);
            let quantity: Real = network
                .upstream_segments(node)
                .iter()
                .filter_map(|s| segment_quantity.get(s))
                .sum();
            if nearly_equal(quantity, SOURCE_QUANTITY, MERGE_TOLERANCE) {
                merge = Some(node);
                break;
            }
            node_quantity.insert(node, quantity);
        }
        active = next;
    }

    let Some(merge) = merge else {
        return Err(TopologyError::BraidResolution {
            source_node: source,
        });
    };

    let reached: BTreeSet<NodeId> = touched.iter().copied().collect();
    let mut segments = Vec::new();
    let mut visited = BTreeSet::from([merge]);
    let mut active = vec![merge];
    while !active.is_empty() {
        let mut next = Vec::new();
        for node in active {
            for segment in network.upstream_segments(node) {
                let Some(from) = network.segment(segment).and_then(|s| s.from_node()) else {
                    continue;
                };
                if !reached.contains(&from) {
                    continue;
                }
                if !segments.contains(&segment) {
                    segments.push(segment);
                }
                if visited.insert(from) {
                    next.push(from);
                }
            }
        }
        active = next;
    }

    Ok(BraidTrace {
        source,
        merge,
        touched,
        segments,
    })
}

/// Complete every braided sub-network in `network`.
///
/// Runs the optional elevation pass first, then traces once per distinct
/// split node and flags the union of all traces braided.
pub fn complete_braids(
    network: &mut Network,
    sampler: Option<&dyn ElevationSampler>,
    reporter: &Reporter,
) -> TopologyResult<BraidReport> {
    let labelled = braided_segments(network);
    if labelled.is_empty() {
        reporter.msg("No braided segments labeled to complete.");
        return Ok(BraidReport::default());
    }

    let mut report = BraidReport::default();
    if let Some(sampler) = sampler {
        let orientation = orient_by_elevation(network, sampler, reporter)?;
        report.reversed = orientation.reversed;
        report.elevation_skipped = orientation.skipped;
    }

    reporter.msg("Completing braided networks..");
    let mut sources = Vec::new();
    for segment in labelled {
        let (from, _) = resolved_ends(network, segment)?;
        if !sources.contains(&from) {
            sources.push(from);
        }
    }

    let mut braided = BTreeSet::new();
    for source in sources {
        let trace = match trace_braid(network, source) {
            Ok(trace) => trace,
            Err(err) => {
                reporter.error(&err);
                return Err(err);
            }
        };
        tracing::debug!(
            source = %trace.source,
            merge = %trace.merge,
            segments = trace.segments.len(),
            "braid traced"
        );
        braided.extend(trace.segments.iter().copied());
        report.traces.push(trace);
    }

    for &segment in &braided {
        network.set_braided(segment, true)?;
    }
    reporter
        .nested()
        .msg(format!("{} braided segments", braided.len()));
    report.braided = braided.into_iter().collect();
    Ok(report)
}
