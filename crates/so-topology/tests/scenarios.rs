//! End-to-end topology scenarios: clustering, flow, braids and order.

use proptest::prelude::*;
use so_core::{Id, NodeId, Point, Reporter};
use so_graph::{Network, NodeGraphBuilder, Segment, validate_network};
use so_topology::{
    TopologyError, classify_stream_order, combine_orders, complete_braids, resolve_flow,
};

fn id(raw: u32) -> Id {
    Id::new(raw).unwrap()
}

fn cluster(lines: &[(u32, &[(f64, f64)])]) -> Network {
    let mut builder = NodeGraphBuilder::new(0.01);
    for (sid, pts) in lines {
        let pts: Vec<Point> = pts.iter().map(|&(x, y)| Point::new(x, y)).collect();
        builder.add_line(id(*sid), &pts).unwrap();
    }
    builder.build().unwrap().into_network().unwrap()
}

fn node_at(net: &Network, x: f64, y: f64) -> NodeId {
    net.nodes()
        .find(|n| n.coord == Some(Point::new(x, y)))
        .map(|n| n.id)
        .unwrap()
}

/// Rebuild from from/to alone, the way later stages read stored attributes.
fn reload(net: &Network) -> Network {
    let mut reloaded = Network::from_directed(
        net.segments()
            .map(|s| Segment::directed(s.id, s.from_node(), s.to_node())),
    )
    .unwrap();
    for s in net.segments() {
        reloaded.set_braided(s.id, s.braided).unwrap();
    }
    reloaded
}

fn order(net: &Network, sid: u32) -> i32 {
    net.segment(id(sid)).unwrap().order
}

#[test]
fn confluence_end_to_end() {
    // A=1 (0,0)-(1,1), B=2 (1,1)-(2,0), C=3 (1,1)-(2,2)
    let mut net = cluster(&[
        (1, &[(0.0, 0.0), (1.0, 1.0)]),
        (2, &[(1.0, 1.0), (2.0, 0.0)]),
        (3, &[(1.0, 1.0), (2.0, 2.0)]),
    ]);
    let confluence = node_at(&net, 1.0, 1.0);
    assert_eq!(net.node(confluence).unwrap().pending(), &[id(1), id(2), id(3)]);

    let outlet = node_at(&net, 2.0, 0.0);
    let reporter = Reporter::new();
    let flow = resolve_flow(&mut net, &[outlet], &reporter).unwrap();
    assert!(flow.advisories().is_empty());

    let b = net.segment(id(2)).unwrap();
    assert_eq!((b.from_node(), b.to_node()), (Some(confluence), Some(outlet)));
    assert_eq!(net.segment(id(1)).unwrap().to_node(), Some(confluence));
    assert_eq!(net.segment(id(3)).unwrap().to_node(), Some(confluence));

    let mut ordered = reload(&net);
    let report = classify_stream_order(&mut ordered, &reporter).unwrap();
    assert!(report.unordered.is_empty());
    assert_eq!((order(&ordered, 1), order(&ordered, 3), order(&ordered, 2)), (1, 1, 2));
}

#[test]
fn diamond_braid_end_to_end() {
    let mut net = cluster(&[
        (1, &[(0.0, 0.0), (1.0, 0.0)]),
        (2, &[(1.0, 0.0), (1.5, 0.5), (2.0, 0.0)]),
        (3, &[(1.0, 0.0), (1.5, -0.5), (2.0, 0.0)]),
        (4, &[(2.0, 0.0), (3.0, 0.0)]),
    ]);
    let outlet = node_at(&net, 3.0, 0.0);
    let reporter = Reporter::new();
    let flow = resolve_flow(&mut net, &[outlet], &reporter).unwrap();
    assert_eq!(flow.auto_braided, vec![id(2), id(3)]);

    let mut braids = reload(&net);
    let report = complete_braids(&mut braids, None, &reporter).unwrap();
    assert_eq!(report.traces.len(), 1);
    assert_eq!(report.traces[0].merge, node_at(&net, 2.0, 0.0));
    assert_eq!(report.braided, vec![id(2), id(3)]);
    let flagged: Vec<_> = braids.segments().filter(|s| s.braided).map(|s| s.id).collect();
    assert_eq!(flagged, vec![id(2), id(3)]);

    classify_stream_order(&mut braids, &reporter).unwrap();
    assert!(braids.segments().all(|s| s.order == 1));
}

#[test]
fn tributary_below_braid_increments_order() {
    // braid 2/3 between (1,0) and (2,0); tributaries 5 and 6 meet at (3,0)
    let mut net = cluster(&[
        (1, &[(0.0, 0.0), (1.0, 0.0)]),
        (2, &[(1.0, 0.0), (1.5, 0.5), (2.0, 0.0)]),
        (3, &[(1.0, 0.0), (1.5, -0.5), (2.0, 0.0)]),
        (4, &[(2.0, 0.0), (3.0, 0.0)]),
        (5, &[(3.0, 0.0), (4.0, 0.0)]),
        (6, &[(3.0, 1.0), (3.0, 0.0)]),
        (7, &[(4.0, 0.0), (5.0, 0.0)]),
        (8, &[(4.0, 1.0), (4.0, 0.0)]),
    ]);
    let outlet = node_at(&net, 5.0, 0.0);
    let reporter = Reporter::new();
    resolve_flow(&mut net, &[outlet], &reporter).unwrap();
    let mut net = reload(&net);
    complete_braids(&mut net, None, &reporter).unwrap();
    classify_stream_order(&mut net, &reporter).unwrap();

    assert_eq!(order(&net, 4), 1);
    assert_eq!(order(&net, 5), 2);
    // 2 meets 1
    assert_eq!(order(&net, 7), 2);
}

#[test]
fn dangling_segment_fails_flow() {
    let mut net = Network::from_parts(
        [Segment::new(id(1)), Segment::new(id(2))],
        [
            so_graph::Node::with_pending(id(1), None, vec![id(1)]),
            so_graph::Node::with_pending(id(2), None, vec![id(1), id(2)]),
        ],
    )
    .unwrap();
    let err = resolve_flow(&mut net, &[id(2)], &Reporter::new()).unwrap_err();
    assert_eq!(err, TopologyError::TopologyResolution { segment: id(2) });
    assert!(err.to_string().contains("segment (2)"));
}

#[test]
fn unmatched_drainage_is_named() {
    let mut net = cluster(&[(1, &[(0.0, 0.0), (1.0, 0.0)])]);
    let err = resolve_flow(&mut net, &[id(77)], &Reporter::new()).unwrap_err();
    assert_eq!(err, TopologyError::DrainageMismatch { missing: vec![id(77)] });
    assert!(err.to_string().contains("77"));
}

#[test]
fn resolved_segments_never_loop() {
    let mut net = cluster(&[
        (1, &[(0.0, 0.0), (1.0, 0.0)]),
        (2, &[(1.0, 0.0), (2.0, 0.0)]),
        (3, &[(1.0, 0.0), (1.5, 1.0)]),
        (4, &[(1.5, 1.0), (2.0, 0.0)]),
        (5, &[(2.0, 0.0), (3.0, 0.0)]),
        (6, &[(1.5, 1.0), (1.5, 2.0)]),
    ]);
    let outlet = node_at(&net, 3.0, 0.0);
    resolve_flow(&mut net, &[outlet], &Reporter::new()).unwrap();
    validate_network(&net).unwrap();
    for s in net.segments() {
        assert!(s.is_connected());
        assert_ne!(s.from_node(), s.to_node());
    }
}

proptest! {
    #[test]
    fn two_equal_regular_inputs_increment(order in 1i32..10) {
        prop_assert_eq!(combine_orders(&[(order, false), (order, false)]), order + 1);
        prop_assert_eq!(combine_orders(&[(order, false), (order, true)]), order + 1);
        prop_assert_eq!(combine_orders(&[(order, true), (order, true)]), order);
    }
}
