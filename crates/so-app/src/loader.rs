//! Rebuilding in-memory networks from stored attributes.
//!
//! Flow resolution starts from pending incidences (node dataset or the
//! `NODE, STREAM_IDS` table). Braid completion and stream order start from
//! the FROM/TO/BRAIDED columns a previous flow run wrote.

use so_core::{Id, NodeId, SegmentId, parse_id_list};
use so_graph::{Network, Node, Segment};
use so_project::{AttrValue, FeatureStore, NodeFeatureDef, ProjectError, RunConfig};
use so_results::{OutputStore, read_node_streams};

use crate::error::{AppError, AppResult};

fn invalid_attribute(column: &str, feature: usize, value: &AttrValue) -> ProjectError {
    ProjectError::InvalidAttribute {
        column: column.to_string(),
        feature,
        value: value.to_string(),
    }
}

/// Stream id of every line feature, in dataset order.
pub fn stream_ids(store: &dyn FeatureStore, column: &str) -> AppResult<Vec<SegmentId>> {
    store.require_column(column)?;
    let mut ids = Vec::with_capacity(store.line_features().len());
    for (index, feature) in store.line_features().iter().enumerate() {
        let value = feature.attr(column).unwrap_or(&AttrValue::Null);
        let id = value
            .as_i64()
            .and_then(|raw| Id::from_attr("stream id", raw).ok())
            .ok_or_else(|| invalid_attribute(column, index, value))?;
        ids.push(id);
    }
    Ok(ids)
}

fn node_id(feature: &NodeFeatureDef, index: usize) -> AppResult<NodeId> {
    Id::from_attr("node id", feature.node).map_err(|_| {
        AppError::from(ProjectError::InvalidAttribute {
            column: "node".to_string(),
            feature: index,
            value: feature.node.to_string(),
        })
    })
}

/// Null, zero and negative node references mean "not set".
fn end_id(value: Option<&AttrValue>, column: &str, index: usize) -> AppResult<Option<NodeId>> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    match value.as_i64() {
        Some(raw) if raw <= 0 => Ok(None),
        Some(raw) => Id::from_attr("node id", raw)
            .map(Some)
            .map_err(|_| invalid_attribute(column, index, value).into()),
        None => Err(invalid_attribute(column, index, value).into()),
    }
}

/// Network with every incidence pending, plus the drainage nodes to start
/// from.
///
/// Configured drainage ids take precedence over drainage flags stored on
/// node features. Reading nodes from the table requires configured
/// drainage ids since the table carries no flags.
pub fn pending_network(
    store: &dyn FeatureStore,
    config: &RunConfig,
    outputs: &OutputStore,
) -> AppResult<(Network, Vec<NodeId>)> {
    let segments = stream_ids(store, &config.columns.stream_id)?;

    let mut flagged = Vec::new();
    let nodes: Vec<Node> = if config.nodes_from_table {
        if config.drainage.is_empty() {
            return Err(ProjectError::DrainageRequired.into());
        }
        let name = config.outputs.node_streams.as_deref().ok_or_else(|| {
            AppError::Config("nodes_from_table needs the node_streams output".to_string())
        })?;
        read_node_streams(&outputs.path_of(name))?
            .into_iter()
            .map(|(id, streams)| Node::with_pending(id, None, streams))
            .collect()
    } else {
        let mut nodes = Vec::with_capacity(store.node_features().len());
        for (index, feature) in store.node_features().iter().enumerate() {
            let id = node_id(feature, index)?;
            let streams = parse_id_list("stream ids", &feature.stream_ids)?;
            if feature.drainage {
                flagged.push(id);
            }
            nodes.push(Node::with_pending(id, Some(feature.coord()), streams));
        }
        nodes
    };

    let drainage = if config.drainage.is_empty() {
        flagged
    } else {
        config.drainage.clone()
    };
    let network = Network::from_parts(segments.into_iter().map(Segment::new), nodes)?;
    Ok((network, drainage))
}

/// Network with directions taken from the FROM/TO/BRAIDED columns.
///
/// When the node dataset is populated every referenced node must exist in
/// it and keeps its coordinate. Otherwise nodes are created from the ids
/// the segments mention and carry no coordinate.
pub fn resolved_network(store: &dyn FeatureStore, config: &RunConfig) -> AppResult<Network> {
    let columns = &config.columns;
    let ids = stream_ids(store, &columns.stream_id)?;
    for column in [&columns.from_node, &columns.to_node, &columns.braided] {
        store.require_column(column)?;
    }

    let mut segments = Vec::with_capacity(ids.len());
    for (index, (feature, id)) in store.line_features().iter().zip(ids).enumerate() {
        let from = end_id(feature.attr(&columns.from_node), &columns.from_node, index)?;
        let to = end_id(feature.attr(&columns.to_node), &columns.to_node, index)?;
        let mut segment = Segment::directed(id, from, to);
        segment.braided = feature.attr(&columns.braided).is_some_and(AttrValue::as_flag);
        segments.push(segment);
    }

    if store.node_features().is_empty() {
        return Ok(Network::from_directed(segments)?);
    }

    let mut nodes = Vec::with_capacity(store.node_features().len());
    for (index, feature) in store.node_features().iter().enumerate() {
        let mut node = Node::new(node_id(feature, index)?);
        node.coord = Some(feature.coord());
        nodes.push(node);
    }
    let ends: Vec<(SegmentId, Option<NodeId>, Option<NodeId>)> = segments
        .iter()
        .map(|s| (s.id, s.from_node(), s.to_node()))
        .collect();
    let undirected = segments.into_iter().map(|s| {
        let mut segment = Segment::new(s.id);
        segment.braided = s.braided;
        segment
    });
    let mut network = Network::from_parts(undirected, nodes)?;
    for (id, from, to) in ends {
        network.link(id, from, to)?;
    }
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use so_project::{DatasetStore, LineFeatureDef, NodeDataset, StreamDataset};

    fn id(raw: u32) -> Id {
        Id::new(raw).unwrap()
    }

    fn line(stream: i64, from: AttrValue, to: AttrValue) -> LineFeatureDef {
        LineFeatureDef::new(vec![[0.0, 0.0], [1.0, 0.0]])
            .with_attr("STREAM_ID", stream)
            .with_attr("FROM_NODE", from)
            .with_attr("TO_NODE", to)
            .with_attr("BRAIDED", 0_i64)
    }

    fn streams(features: Vec<LineFeatureDef>) -> StreamDataset {
        let mut dataset = StreamDataset::new("s");
        dataset.columns = ["STREAM_ID", "FROM_NODE", "TO_NODE", "BRAIDED"]
            .map(String::from)
            .to_vec();
        dataset.features = features;
        dataset
    }

    #[test]
    fn null_and_non_positive_ends_are_unset() {
        let store = DatasetStore::in_memory(
            streams(vec![
                line(1, AttrValue::Int(2), AttrValue::Int(1)),
                line(2, AttrValue::Null, AttrValue::Int(2)),
                line(3, AttrValue::Int(-1), AttrValue::Int(0)),
            ]),
            NodeDataset::new("n"),
        );
        let config = RunConfig::new("s.yaml");
        let network = resolved_network(&store, &config).unwrap();

        let s2 = network.segment(id(2)).unwrap();
        assert_eq!((s2.from_node(), s2.to_node()), (None, Some(id(2))));
        assert!(!network.segment(id(3)).unwrap().is_connected());
        assert_eq!(network.upstream_segments(id(2)), vec![id(2)]);
    }

    #[test]
    fn text_node_reference_is_rejected() {
        let store = DatasetStore::in_memory(
            streams(vec![line(1, AttrValue::Text("x".into()), AttrValue::Int(1))]),
            NodeDataset::new("n"),
        );
        let err = resolved_network(&store, &RunConfig::new("s.yaml")).unwrap_err();
        assert!(matches!(err, AppError::Project(_)));
    }

    #[test]
    fn populated_node_dataset_must_cover_references() {
        let mut nodes = NodeDataset::new("n");
        nodes.nodes.push(NodeFeatureDef {
            node: 1,
            x: 0.0,
            y: 0.0,
            stream_ids: "1".to_string(),
            end_point: true,
            drainage: true,
        });
        let store = DatasetStore::in_memory(
            streams(vec![line(1, AttrValue::Int(2), AttrValue::Int(1))]),
            nodes,
        );
        let err = resolved_network(&store, &RunConfig::new("s.yaml")).unwrap_err();
        assert!(matches!(err, AppError::Graph(_)));
    }

    #[test]
    fn table_source_needs_configured_drainage() {
        let store = DatasetStore::in_memory(streams(Vec::new()), NodeDataset::new("n"));
        let mut config = RunConfig::new("s.yaml");
        config.nodes_from_table = true;
        let outputs = OutputStore::new(std::env::temp_dir().join("so_app_loader")).unwrap();
        let err = pending_network(&store, &config, &outputs).unwrap_err();
        assert!(matches!(err, AppError::Project(_)));
    }

    #[test]
    fn configured_drainage_overrides_flags() {
        let mut nodes = NodeDataset::new("n");
        for (node, drainage) in [(1, true), (2, false)] {
            nodes.nodes.push(NodeFeatureDef {
                node,
                x: node as f64,
                y: 0.0,
                stream_ids: "1".to_string(),
                end_point: true,
                drainage,
            });
        }
        let store = DatasetStore::in_memory(
            streams(vec![line(1, AttrValue::Null, AttrValue::Null)]),
            nodes,
        );
        let outputs = OutputStore::new(std::env::temp_dir().join("so_app_loader")).unwrap();
        let mut config = RunConfig::new("s.yaml");

        let (_, drainage) = pending_network(&store, &config, &outputs).unwrap();
        assert_eq!(drainage, vec![id(1)]);

        config.drainage = vec![id(2)];
        let (network, drainage) = pending_network(&store, &config, &outputs).unwrap();
        assert_eq!(drainage, vec![id(2)]);
        assert_eq!(network.node(id(2)).unwrap().pending(), &[id(1)]);
    }
}
