use std::path::{Path, PathBuf};

use so_app::*;
use so_core::{Id, Reporter};
use so_project::{NodeDataset, RunConfig, StreamDataset, load_document};
use so_results::{FlowRow, OrderRow, OutputStore};

fn id(raw: u32) -> Id {
    Id::new(raw).unwrap()
}

fn workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// Nodes are numbered in endpoint order: (0,0)=1, (1,1)=2, (2,0)=3, (2,2)=4.
const CONFLUENCE: &str = "\
version: 1
name: confluence
linear_unit: meters
columns: [STREAM_ID]
features:
  - attributes: { STREAM_ID: 1 }
    points: [[0.0, 0.0], [1.0, 1.0]]
  - attributes: { STREAM_ID: 1 }
    points: [[1.0, 1.0], [2.0, 0.0]]
  - attributes: {}
    points: [[1.0, 1.0], [2.0, 2.0]]
";

// Nodes: (0,0)=1, (1,0)=2, (2,0)=3, (3,0)=4.
const DIAMOND: &str = "\
version: 1
name: diamond
columns: [STREAM_ID]
features:
  - attributes: { STREAM_ID: 1 }
    points: [[0.0, 0.0], [1.0, 0.0]]
  - attributes: { STREAM_ID: 2 }
    points: [[1.0, 0.0], [1.5, 0.5], [2.0, 0.0]]
  - attributes: { STREAM_ID: 3 }
    points: [[1.0, 0.0], [1.5, -0.5], [2.0, 0.0]]
  - attributes: { STREAM_ID: 4 }
    points: [[2.0, 0.0], [3.0, 0.0]]
";

fn setup(name: &str, streams: &str, config: &str) -> PathBuf {
    let dir = workspace(name);
    std::fs::write(dir.join("streams.yaml"), streams).unwrap();
    let config_path = dir.join("run.yaml");
    std::fs::write(&config_path, config).unwrap();
    config_path
}

fn column(streams: &Path, column: &str) -> Vec<Option<i64>> {
    let dataset: StreamDataset = load_document(streams).unwrap();
    dataset
        .features
        .iter()
        .map(|f| f.attr(column).and_then(|v| v.as_i64()))
        .collect()
}

#[test]
fn confluence_pipeline_writes_tables_and_summary() {
    let config_path = setup(
        "so_app_confluence",
        CONFLUENCE,
        "name: confluence\nstreams: streams.yaml\ndrainage: [3]\ntolerance: 0.01\n",
    );
    let config = load_config(&config_path).unwrap();

    let mut events = Vec::new();
    let response = run_pipeline_with_progress(
        &config,
        &Reporter::new(),
        Some(&mut |event: StageEvent| events.push(event.stage)),
    )
    .unwrap();

    assert_eq!(events.first(), Some(&RunStage::PrepareStream));
    assert_eq!(events.last(), Some(&RunStage::Completed));
    assert!(response.advisories.is_empty());
    assert_eq!(response.summary.stages.len(), 5);
    assert_eq!((response.summary.segments, response.summary.nodes), (3, 4));

    assert_eq!(column(&config.streams, "STREAM_ID"), vec![Some(1), Some(2), Some(3)]);
    assert_eq!(column(&config.streams, "STRAHLER"), vec![Some(1), Some(2), Some(1)]);

    let nodes_text = std::fs::read_to_string(config.nodes_path()).unwrap();
    let nodes: NodeDataset = serde_yaml::from_str(&nodes_text).unwrap();
    let outlet = nodes.nodes.iter().find(|n| n.node == 3).unwrap();
    assert_eq!((outlet.x, outlet.y), (2.0, 0.0));
    assert!(outlet.drainage && outlet.end_point);
    assert_eq!(nodes.nodes[1].stream_ids, "1,2,3");

    let outputs = OutputStore::new(config.output_dir.clone()).unwrap();
    let flow: Vec<FlowRow> = outputs.read_table("flow.csv").unwrap();
    assert_eq!(
        flow,
        vec![
            FlowRow::new(id(1), Some(id(1)), Some(id(2)), false),
            FlowRow::new(id(2), Some(id(2)), Some(id(3)), false),
            FlowRow::new(id(3), Some(id(4)), Some(id(2)), false),
        ]
    );
    let orders: Vec<OrderRow> = outputs.read_table("stream_order.csv").unwrap();
    assert_eq!(orders.iter().map(|r| r.order).collect::<Vec<_>>(), vec![1, 2, 1]);

    let summary = outputs.load_summary().unwrap();
    assert_eq!(summary, response.summary);
    assert_eq!(summary.stages[2].stage, "calculate_flow");
}

#[test]
fn diamond_braid_flagged_and_ordered() {
    let config_path = setup(
        "so_app_diamond",
        DIAMOND,
        "streams: streams.yaml\ndrainage: [4]\ntolerance: 0.01\nelevation: dem.yaml\n",
    );
    // Elevation falls with x across the whole network.
    std::fs::write(
        config_path.with_file_name("dem.yaml"),
        "transform: [-0.5, 1.0, 0.0, 1.5, 0.0, -1.0]\nrows: 3\ncols: 5\n\
         values: [10, 9, 8, 7, 6, 10, 9, 8, 7, 6, 10, 9, 8, 7, 6]\n",
    )
    .unwrap();
    let config = load_config(&config_path).unwrap();
    let response = run_pipeline(&config, &Reporter::new()).unwrap();

    assert!(response.advisories.elevation_skipped.is_empty());
    assert!(response.advisories.unconnected.is_empty());
    assert_eq!(
        column(&config.streams, "BRAIDED"),
        vec![Some(0), Some(1), Some(1), Some(0)]
    );
    assert_eq!(column(&config.streams, "FROM_NODE")[1], Some(2));
    assert_eq!(column(&config.streams, "STRAHLER"), vec![Some(1); 4]);
}

#[test]
fn flow_can_read_nodes_from_table() {
    let config_path = setup(
        "so_app_table_nodes",
        CONFLUENCE,
        "streams: streams.yaml\ntolerance: 0.01\n",
    );
    let mut config = load_config(&config_path).unwrap();
    let reporter = Reporter::new();
    run_stage(&config, RunStage::PrepareStream, &reporter).unwrap();
    run_stage(&config, RunStage::GetNodeNetwork, &reporter).unwrap();

    config.nodes_from_table = true;
    let err = run_stage(&config, RunStage::CalculateFlow, &reporter).unwrap_err();
    assert!(err.to_string().contains("drainage node ids"));

    config.drainage = vec![id(3)];
    let response = run_stage(&config, RunStage::CalculateFlow, &reporter).unwrap();
    assert!(response.advisories.unconnected.is_empty());
    assert_eq!(column(&config.streams, "TO_NODE"), vec![Some(2), Some(3), Some(2)]);
}

#[test]
fn order_before_flow_reports_missing_column() {
    let config_path = setup(
        "so_app_order_first",
        DIAMOND,
        "streams: streams.yaml\n",
    );
    let config = load_config(&config_path).unwrap();
    let err = run_stage(&config, RunStage::CalculateStreamOrder, &Reporter::new()).unwrap_err();
    assert!(matches!(err, AppError::Project(_)));
    assert!(err.to_string().contains("FROM_NODE"));
}

#[test]
fn unknown_linear_unit_stops_node_stage() {
    let streams = CONFLUENCE.replace("meters", "degree");
    let config_path = setup("so_app_bad_unit", &streams, "streams: streams.yaml\n");
    let config = load_config(&config_path).unwrap();
    let err = run_stage(&config, RunStage::GetNodeNetwork, &Reporter::new()).unwrap_err();
    assert!(err.to_string().contains("degree"));
}

#[test]
fn missing_config_file_is_reported() {
    let err = load_config(Path::new("/nonexistent/so_app/run.yaml")).unwrap_err();
    assert!(matches!(err, AppError::ConfigFileRead { .. }));

    let mut config = RunConfig::new("streams.yaml");
    config.tolerance = -1.0;
    assert!(matches!(
        run_pipeline(&config, &Reporter::new()),
        Err(AppError::Config(_))
    ));
}
