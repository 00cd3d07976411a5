//! Strahler stream order with braid-aware tie-breaking.

use std::collections::BTreeSet;

use so_core::{NodeId, Reporter, SegmentId};
use so_graph::{Network, UNRESOLVED_ORDER};

use crate::advisory::Advisories;
use crate::error::TopologyResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderReport {
    /// Segments left at the unresolved order, ascending.
    pub unordered: Vec<SegmentId>,
    /// Passes run after the headwater pass.
    pub passes: usize,
}

impl OrderReport {
    pub fn advisories(&self) -> Advisories {
        Advisories {
            unordered: self.unordered.clone(),
            ..Advisories::default()
        }
    }
}

/// Order leaving a node given `(order, braided)` of every upstream segment.
///
/// Non-braided inputs follow Strahler (the largest, plus one when the two
/// largest tie). Braided inputs contribute their largest order without an
/// increment. The result is the larger of the two candidates, plus one when
/// they are equal.
pub fn combine_orders(upstream: &[(i32, bool)]) -> i32 {
    match upstream {
        [] => 1,
        [(order, _)] => *order,
        _ => {
            let mut regular: Vec<i32> = upstream.iter().filter(|u| !u.1).map(|u| u.0).collect();
            regular.sort_unstable();
            let braided = upstream
                .iter()
                .filter(|u| u.1)
                .map(|u| u.0)
                .max()
                .unwrap_or(0);

            let regular = match regular.as_slice() {
                [] => 0,
                [.., a, b] if a == b => b + 1,
                [.., top] => *top,
            };

            if regular == braided && regular != 0 {
                regular + 1
            } else {
                regular.max(braided)
            }
        }
    }
}

/// Connected segments only; half-resolved ones take no part in ordering.
fn connected(network: &Network, segments: Vec<SegmentId>) -> Vec<SegmentId> {
    segments
        .into_iter()
        .filter(|&s| network.segment(s).is_some_and(|seg| seg.is_connected()))
        .collect()
}

/// Assign Strahler order to every segment reachable from a headwater.
///
/// Orders are reset first. Headwater segments get order 1, then each node
/// whose upstream segments are all ordered hands the combined order to its
/// downstream segments. Nodes still waiting on an upstream order are
/// retried on the next pass; the run stops once a pass changes nothing.
pub fn classify_stream_order(
    network: &mut Network,
    reporter: &Reporter,
) -> TopologyResult<OrderReport> {
    reporter.msg("Calculating stream order..");
    for segment in network.segment_ids() {
        network.set_order(segment, UNRESOLVED_ORDER)?;
    }

    let mut done: BTreeSet<NodeId> = BTreeSet::new();
    let mut active: Vec<NodeId> = Vec::new();
    for node in network.node_ids() {
        if !connected(network, network.upstream_segments(node)).is_empty() {
            continue;
        }
        for segment in connected(network, network.downstream_segments(node)) {
            network.set_order(segment, 1)?;
            if let Some(to) = network.segment(segment).and_then(|s| s.to_node()) {
                if !active.contains(&to) {
                    active.push(to);
                }
            }
        }
        done.insert(node);
    }

    let mut passes = 0;
    while !active.is_empty() {
        passes += 1;
        let mut next: Vec<NodeId> = Vec::new();
        let mut progressed = false;

        for node in active {
            if done.contains(&node) {
                continue;
            }
            let downstream = connected(network, network.downstream_segments(node));
            if downstream.is_empty() {
                done.insert(node);
                progressed = true;
                continue;
            }

            let mut inputs = Vec::new();
            let mut waiting = false;
            for segment in connected(network, network.upstream_segments(node)) {
                match network.segment(segment) {
                    Some(s) if s.order > 0 => inputs.push((s.order, s.braided)),
                    _ => {
                        waiting = true;
                        break;
                    }
                }
            }
            if waiting {
                if !next.contains(&node) {
                    next.push(node);
                }
                continue;
            }

            let order = combine_orders(&inputs);
            for segment in downstream {
                network.set_order(segment, order)?;
                if let Some(to) = network.segment(segment).and_then(|s| s.to_node()) {
                    if !done.contains(&to) && !next.contains(&to) {
                        next.push(to);
                    }
                }
            }
            done.insert(node);
            progressed = true;
        }

        if !progressed {
            tracing::debug!(waiting = next.len(), "stream order stalled");
            break;
        }
        active = next;
    }

    let unordered: Vec<SegmentId> = network
        .segments()
        .filter(|s| s.order <= 0)
        .map(|s| s.id)
        .collect();
    reporter.nested().msg(format!(
        "{} passes, {} segments ordered",
        passes,
        network.segment_count() - unordered.len()
    ));
    Ok(OrderReport { unordered, passes })
}
