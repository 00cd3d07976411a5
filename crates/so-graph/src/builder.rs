//! Endpoint clustering: raw line geometry -> shared network nodes.

use std::collections::HashSet;

use so_core::{NodeId, Point, SegmentId};

use crate::error::GraphError;
use crate::graph::{Network, Node, Segment};
use crate::indexing::StreamNodeIndex;

/// One line endpoint before clustering.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    coord: Point,
    segment: SegmentId,
}

/// Builder for the node network of a set of stream lines.
///
/// Use `add_line` for every stream feature in dataset order, then call
/// `build()` to cluster endpoints and number the resulting nodes 1..N.
#[derive(Debug)]
pub struct NodeGraphBuilder {
    tolerance: f64,
    candidates: Vec<Candidate>,
    stream_ids: Vec<SegmentId>,
    seen: HashSet<SegmentId>,
}

/// Clustered nodes plus the reverse stream -> nodes mapping.
#[derive(Debug, Clone)]
pub struct NodeGraph {
    /// Nodes numbered 1..N, every incidence still pending.
    pub nodes: Vec<Node>,
    pub stream_nodes: StreamNodeIndex,
}

impl NodeGraph {
    /// Stream ids in the order the lines were added.
    pub fn stream_ids(&self) -> &[SegmentId] {
        self.stream_nodes.stream_ids()
    }

    /// Arena with one unresolved segment per line, ready for flow resolution.
    pub fn into_network(self) -> Result<Network, GraphError> {
        let segments: Vec<Segment> = self
            .stream_ids()
            .iter()
            .map(|&id| Segment::new(id))
            .collect();
        Network::from_parts(segments, self.nodes)
    }
}

impl NodeGraphBuilder {
    /// Create a builder; endpoints within `tolerance` share a node.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            candidates: Vec::new(),
            stream_ids: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Register a line by its first and last point.
    pub fn add_line(&mut self, segment: SegmentId, points: &[Point]) -> Result<(), GraphError> {
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            return Err(GraphError::EmptyGeometry { segment });
        };
        if !self.seen.insert(segment) {
            return Err(GraphError::DuplicateSegment { segment });
        }
        self.stream_ids.push(segment);
        self.candidates.push(Candidate {
            coord: first,
            segment,
        });
        self.candidates.push(Candidate {
            coord: last,
            segment,
        });
        Ok(())
    }

    pub fn line_count(&self) -> usize {
        self.stream_ids.len()
    }

    /// Cluster endpoints and number the nodes.
    pub fn build(self) -> Result<NodeGraph, GraphError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(GraphError::InvalidTolerance {
                value: self.tolerance,
            });
        }

        let coords: Vec<Point> = self.candidates.iter().map(|c| c.coord).collect();
        let groups = cluster_points(&coords, self.tolerance);

        let nodes: Vec<Node> = groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let leader = self.candidates[group[0]];
                let pending = group.iter().map(|&c| self.candidates[c].segment).collect();
                Node::with_pending(NodeId::from_index(i as u32), Some(leader.coord), pending)
            })
            .collect();

        let stream_nodes = StreamNodeIndex::from_nodes(self.stream_ids, &nodes);
        Ok(NodeGraph {
            nodes,
            stream_nodes,
        })
    }
}

/// Leader clustering over points in input order.
///
/// Each point not yet absorbed starts a group and absorbs every later,
/// unabsorbed point within `tolerance` of it. Groups list point indices,
/// leader first.
pub fn cluster_points(points: &[Point], tolerance: f64) -> Vec<Vec<usize>> {
    let mut absorbed = vec![false; points.len()];
    let mut groups = Vec::new();
    for i in 0..points.len() {
        if absorbed[i] {
            continue;
        }
        absorbed[i] = true;
        let mut group = vec![i];
        for j in (i + 1)..points.len() {
            if !absorbed[j] && points[i].within(points[j], tolerance) {
                absorbed[j] = true;
                group.push(j);
            }
        }
        groups.push(group);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use so_core::Id;

    fn id(raw: u32) -> Id {
        Id::new(raw).unwrap()
    }

    #[test]
    fn builder_shares_touching_endpoints() {
        let mut builder = NodeGraphBuilder::new(0.01);
        builder
            .add_line(id(1), &[Point::new(0.0, 0.0), Point::new(1.0, 1.0)])
            .unwrap();
        builder
            .add_line(id(2), &[Point::new(1.005, 1.0), Point::new(2.0, 0.0)])
            .unwrap();
        let graph = builder.build().unwrap();

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[1].id, id(2));
        assert_eq!(graph.nodes[1].pending(), &[id(1), id(2)]);
        // leader coordinate is kept
        assert_eq!(graph.nodes[1].coord, Some(Point::new(1.0, 1.0)));
        assert!(graph.nodes[0].is_end_point());
        assert!(!graph.nodes[1].is_end_point());
    }

    #[test]
    fn builder_rejects_bad_input() {
        let mut builder = NodeGraphBuilder::new(1.0);
        assert_eq!(
            builder.add_line(id(1), &[]),
            Err(GraphError::EmptyGeometry { segment: id(1) })
        );
        builder.add_line(id(1), &[Point::new(0.0, 0.0)]).unwrap();
        assert_eq!(
            builder.add_line(id(1), &[Point::new(5.0, 0.0)]),
            Err(GraphError::DuplicateSegment { segment: id(1) })
        );

        let negative = NodeGraphBuilder::new(-1.0);
        assert!(matches!(
            negative.build(),
            Err(GraphError::InvalidTolerance { .. })
        ));
    }

    #[test]
    fn zero_and_one_line_do_not_fail() {
        let empty = NodeGraphBuilder::new(1.0).build().unwrap();
        assert!(empty.nodes.is_empty());

        let mut single = NodeGraphBuilder::new(1.0);
        single
            .add_line(id(4), &[Point::new(0.0, 0.0), Point::new(10.0, 0.0)])
            .unwrap();
        let graph = single.build().unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.stream_nodes.nodes_of(id(4)), &[id(1), id(2)]);
    }

    #[test]
    fn last_candidate_keeps_its_own_node() {
        let groups = cluster_points(
            &[
                Point::new(0.0, 0.0),
                Point::new(0.0, 0.0),
                Point::new(9.0, 9.0),
            ],
            0.5,
        );
        assert_eq!(groups, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn absorbed_points_are_not_shared() {
        // 1 is within reach of both 0 and 2, but belongs to 0 only.
        let groups = cluster_points(
            &[
                Point::new(0.0, 0.0),
                Point::new(0.8, 0.0),
                Point::new(1.6, 0.0),
            ],
            1.0,
        );
        assert_eq!(groups, vec![vec![0, 1], vec![2]]);
    }
}
