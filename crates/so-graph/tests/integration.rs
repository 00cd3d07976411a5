//! Integration tests for so-graph.

use proptest::prelude::*;
use so_core::{Id, Point, SegmentId};
use so_graph::builder::cluster_points;
use so_graph::{NodeGraphBuilder, validate_network};

fn id(raw: u32) -> Id {
    Id::new(raw).unwrap()
}

#[test]
fn three_lines_share_a_confluence() {
    // A (0,0)-(1,1), B (1,1)-(2,0), C (1,1)-(2,2)
    let mut builder = NodeGraphBuilder::new(0.01);
    builder
        .add_line(id(1), &[Point::new(0.0, 0.0), Point::new(1.0, 1.0)])
        .unwrap();
    builder
        .add_line(id(2), &[Point::new(1.0, 1.0), Point::new(2.0, 0.0)])
        .unwrap();
    builder
        .add_line(id(3), &[Point::new(1.0, 1.0), Point::new(2.0, 2.0)])
        .unwrap();
    let graph = builder.build().unwrap();

    assert_eq!(graph.nodes.len(), 4);
    let shared = graph
        .nodes
        .iter()
        .find(|n| n.coord == Some(Point::new(1.0, 1.0)))
        .unwrap();
    assert_eq!(shared.pending(), &[id(1), id(2), id(3)]);

    // node ids are 1..N in leader order
    let ids: Vec<u32> = graph.nodes.iter().map(|n| n.id.get()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    // reverse mapping
    assert_eq!(graph.stream_nodes.nodes_of(id(2)), &[id(2), id(3)]);
    assert_eq!(graph.stream_nodes.nodes_of(id(3)), &[id(2), id(4)]);

    let network = graph.into_network().unwrap();
    assert_eq!(network.segment_count(), 3);
    assert!(validate_network(&network).is_ok());
}

#[test]
fn multi_vertex_lines_use_endpoints_only() {
    let mut builder = NodeGraphBuilder::new(0.5);
    builder
        .add_line(
            id(1),
            &[
                Point::new(0.0, 0.0),
                Point::new(5.0, 5.0),
                Point::new(10.0, 0.0),
            ],
        )
        .unwrap();
    builder
        .add_line(id(2), &[Point::new(5.0, 5.0), Point::new(5.0, 10.0)])
        .unwrap();
    let graph = builder.build().unwrap();

    // interior vertex (5,5) of line 1 is not a node endpoint
    assert_eq!(graph.nodes.len(), 4);
    assert!(graph.nodes.iter().all(|n| n.is_end_point()));
}

#[test]
fn endpoint_counts_are_preserved() {
    let mut builder = NodeGraphBuilder::new(1.0);
    let lines: Vec<(SegmentId, [Point; 2])> = vec![
        (id(1), [Point::new(0.0, 0.0), Point::new(10.0, 0.0)]),
        (id(2), [Point::new(10.2, 0.1), Point::new(20.0, 0.0)]),
        (id(3), [Point::new(9.9, -0.2), Point::new(10.0, -10.0)]),
    ];
    for (sid, pts) in &lines {
        builder.add_line(*sid, pts).unwrap();
    }
    let graph = builder.build().unwrap();
    let total: usize = graph.nodes.iter().map(|n| n.incident_count()).sum();
    assert_eq!(total, 2 * lines.len());
}

proptest! {
    // Re-clustering the node coordinates of a clustered result where no two
    // nodes are within tolerance must not merge anything further.
    #[test]
    fn clustering_is_idempotent(
        raw in prop::collection::vec((0_i32..40, 0_i32..40), 1..30),
    ) {
        let tolerance = 0.25;
        let points: Vec<Point> = raw
            .iter()
            .map(|&(x, y)| Point::new(f64::from(x), f64::from(y)))
            .collect();
        let groups = cluster_points(&points, tolerance);
        let leaders: Vec<Point> = groups.iter().map(|g| points[g[0]]).collect();

        let again = cluster_points(&leaders, tolerance);
        prop_assert_eq!(again.len(), leaders.len());
        prop_assert!(again.iter().all(|g| g.len() == 1));
    }
}
