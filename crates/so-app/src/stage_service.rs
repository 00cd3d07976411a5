//! One service per pipeline stage.
//!
//! Every stage reads what it needs from the feature store (and, for flow
//! from a table, the output directory), runs the matching so-topology or
//! so-graph operation, then writes its attribute columns, tables and
//! datasets back.

use std::collections::BTreeMap;

use so_core::{ElevationSampler, Reporter, SegmentId, join_ids};
use so_graph::{Network, NodeGraphBuilder};
use so_project::{
    AttrValue, ElevationGrid, FeatureStore, NodeFeatureDef, PrepareReport, RunConfig,
    assign_stream_ids, check_linear_unit,
};
use so_results::{FlowRow, NodeStreamsRow, OrderRow, OutputStore, StreamNodesRow};
use so_topology::{
    Advisories, BraidReport, FlowReport, OrderReport, classify_stream_order, complete_braids,
    resolve_flow,
};

use crate::error::{AppError, AppResult};
use crate::loader::{pending_network, resolved_network, stream_ids};

/// Counts from building the node network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkSummary {
    pub segments: usize,
    pub nodes: usize,
    pub end_points: usize,
}

/// Make stream ids unique and positive, then save the stream dataset.
pub fn prepare_stream(
    store: &mut dyn FeatureStore,
    config: &RunConfig,
    reporter: &Reporter,
) -> AppResult<PrepareReport> {
    let report = assign_stream_ids(store, &config.columns.stream_id, reporter)?;
    store.save()?;
    Ok(report)
}

/// Cluster line endpoints into nodes and write the node dataset plus the
/// node/stream lookup tables.
pub fn get_node_network(
    store: &mut dyn FeatureStore,
    config: &RunConfig,
    outputs: &OutputStore,
    reporter: &Reporter,
) -> AppResult<NetworkSummary> {
    check_linear_unit(store.linear_unit())?;
    let ids = stream_ids(store, &config.columns.stream_id)?;

    reporter.msg("Creating nodes..");
    let mut builder = NodeGraphBuilder::new(config.tolerance);
    for (feature, id) in store.line_features().iter().zip(&ids) {
        builder.add_line(*id, &feature.vertices())?;
    }
    reporter.msg("Finding node intersections..");
    let graph = builder.build()?;

    if let Some(name) = &config.outputs.node_streams {
        let rows: Vec<NodeStreamsRow> = graph
            .nodes
            .iter()
            .map(|node| NodeStreamsRow::new(node.id, node.pending()))
            .collect();
        let path = outputs.write_table(name, &rows)?;
        reporter.nested().msg(format!("Wrote {}", path.display()));
    }
    if let Some(name) = &config.outputs.stream_nodes {
        let rows: Vec<StreamNodesRow> = graph
            .stream_ids()
            .iter()
            .map(|&id| StreamNodesRow::new(id, graph.stream_nodes.nodes_of(id)))
            .collect();
        let path = outputs.write_table(name, &rows)?;
        reporter.nested().msg(format!("Wrote {}", path.display()));
    }

    let mut features = Vec::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        let coord = node.coord.ok_or_else(|| {
            AppError::InvalidInput(format!("clustered node {} has no coordinate", node.id))
        })?;
        features.push(NodeFeatureDef {
            node: i64::from(node.id.get()),
            x: coord.x,
            y: coord.y,
            stream_ids: join_ids(node.pending()),
            end_point: node.incident_count() <= 1,
            drainage: false,
        });
    }
    let summary = NetworkSummary {
        segments: ids.len(),
        nodes: features.len(),
        end_points: features.iter().filter(|f| f.end_point).count(),
    };
    store.replace_nodes(features);
    store.save()?;
    Ok(summary)
}

/// Write FROM/TO/BRAIDED for every segment of `network`.
fn write_directions(
    store: &mut dyn FeatureStore,
    config: &RunConfig,
    network: &Network,
) -> AppResult<()> {
    let columns = &config.columns;
    let mut from = BTreeMap::new();
    let mut to = BTreeMap::new();
    let mut braided = BTreeMap::new();
    for segment in network.segments() {
        from.insert(segment.id, AttrValue::from(segment.from_node()));
        to.insert(segment.id, AttrValue::from(segment.to_node()));
        braided.insert(segment.id, AttrValue::from(segment.braided));
    }
    store.write_by_stream_id(&columns.stream_id, &columns.from_node, &from)?;
    store.write_by_stream_id(&columns.stream_id, &columns.to_node, &to)?;
    store.write_by_stream_id(&columns.stream_id, &columns.braided, &braided)?;
    Ok(())
}

fn write_flow_table(
    config: &RunConfig,
    outputs: &OutputStore,
    network: &Network,
    reporter: &Reporter,
) -> AppResult<()> {
    let Some(name) = &config.outputs.flow else {
        return Ok(());
    };
    let rows: Vec<FlowRow> = network
        .segments()
        .map(|s| FlowRow::new(s.id, s.from_node(), s.to_node(), s.braided))
        .collect();
    let path = outputs.write_table(name, &rows)?;
    reporter.nested().msg(format!("Wrote {}", path.display()));
    Ok(())
}

/// Resolve flow direction outward from the drainage nodes.
pub fn calculate_flow(
    store: &mut dyn FeatureStore,
    config: &RunConfig,
    outputs: &OutputStore,
    reporter: &Reporter,
) -> AppResult<FlowReport> {
    let (mut network, drainage) = pending_network(store, config, outputs)?;
    let report = resolve_flow(&mut network, &drainage, reporter)?;

    write_directions(store, config, &network)?;
    if !store.node_features().is_empty() {
        let nodes = store
            .node_features()
            .iter()
            .map(|feature| NodeFeatureDef {
                drainage: drainage.iter().any(|d| i64::from(d.get()) == feature.node),
                ..feature.clone()
            })
            .collect();
        store.replace_nodes(nodes);
    }
    write_flow_table(config, outputs, &network, reporter)?;

    report
        .advisories()
        .report(reporter, &config.columns.stream_id);
    store.save()?;
    Ok(report)
}

/// Trace braided sub-networks, optionally orienting segments by elevation
/// first.
pub fn complete_braided_streams(
    store: &mut dyn FeatureStore,
    config: &RunConfig,
    outputs: &OutputStore,
    elevation: Option<&ElevationGrid>,
    reporter: &Reporter,
) -> AppResult<BraidReport> {
    let mut network = resolved_network(store, config)?;
    let sampler = elevation.map(|grid| grid as &dyn ElevationSampler);
    let report = complete_braids(&mut network, sampler, reporter)?;
    if report.braided.is_empty() && report.reversed.is_empty() {
        return Ok(report);
    }

    write_directions(store, config, &network)?;
    write_flow_table(config, outputs, &network, reporter)?;
    report
        .advisories()
        .report(reporter, &config.columns.stream_id);
    store.save()?;
    Ok(report)
}

/// Strahler order for every connected segment reached from a headwater.
pub fn calculate_stream_order(
    store: &mut dyn FeatureStore,
    config: &RunConfig,
    outputs: &OutputStore,
    reporter: &Reporter,
) -> AppResult<OrderReport> {
    let mut network = resolved_network(store, config)?;
    let report = classify_stream_order(&mut network, reporter)?;

    let orders: BTreeMap<SegmentId, AttrValue> = network
        .segments()
        .map(|s| (s.id, AttrValue::Int(i64::from(s.order))))
        .collect();
    store.write_by_stream_id(
        &config.columns.stream_id,
        &config.columns.stream_order,
        &orders,
    )?;

    if let Some(name) = &config.outputs.stream_order {
        let rows: Vec<OrderRow> = network
            .segments()
            .map(|s| OrderRow {
                stream_id: s.id.get(),
                order: s.order,
            })
            .collect();
        let path = outputs.write_table(name, &rows)?;
        reporter.nested().msg(format!("Wrote {}", path.display()));
    }

    report
        .advisories()
        .report(reporter, &config.columns.stream_id);
    store.save()?;
    Ok(report)
}

/// Advisories of one stage, for the run summary.
pub(crate) enum StageOutcome {
    Prepared(PrepareReport),
    Network(NetworkSummary),
    Flow(FlowReport),
    Braids(BraidReport),
    Order(OrderReport),
}

impl StageOutcome {
    pub(crate) fn advisories(&self) -> Advisories {
        match self {
            StageOutcome::Prepared(_) | StageOutcome::Network(_) => Advisories::default(),
            StageOutcome::Flow(report) => report.advisories(),
            StageOutcome::Braids(report) => report.advisories(),
            StageOutcome::Order(report) => report.advisories(),
        }
    }

    pub(crate) fn message(&self) -> String {
        match self {
            StageOutcome::Prepared(report) => {
                format!("{} stream ids assigned", report.assigned.len())
            }
            StageOutcome::Network(summary) => format!(
                "{} nodes for {} streams ({} end points)",
                summary.nodes, summary.segments, summary.end_points
            ),
            StageOutcome::Flow(report) => format!(
                "{} headwaters, {} unconnected",
                report.headwaters.len(),
                report.unconnected.len()
            ),
            StageOutcome::Braids(report) => format!(
                "{} braided segments, {} reversed",
                report.braided.len(),
                report.reversed.len()
            ),
            StageOutcome::Order(report) => format!(
                "{} passes, {} unordered",
                report.passes,
                report.unordered.len()
            ),
        }
    }
}
