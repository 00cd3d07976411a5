use so_core::Id;
use so_results::*;

fn store(name: &str) -> OutputStore {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    OutputStore::new(dir).unwrap()
}

#[test]
fn summary_round_trip() {
    let store = store("so_results_summary");
    assert!(matches!(
        store.load_summary(),
        Err(ResultsError::SummaryNotFound { .. })
    ));

    let mut summary = RunSummary::now("creek");
    summary.stages.push(StageRecord {
        stage: "calculate_flow".to_string(),
        elapsed_s: 0.25,
    });
    summary.advisories.unconnected = vec![7, 8];
    store.save_summary(&summary).unwrap();

    let loaded = store.load_summary().unwrap();
    assert_eq!(loaded, summary);
    assert!(chrono::DateTime::parse_from_rfc3339(&loaded.timestamp).is_ok());

    let text = std::fs::read_to_string(store.path_of("summary.json")).unwrap();
    assert!(!text.contains("auto_braided"));
}

#[test]
fn tables_land_under_root() {
    let store = store("so_results_tables_root");
    let rows = vec![
        OrderRow {
            stream_id: 1,
            order: 1,
        },
        OrderRow {
            stream_id: 2,
            order: -1,
        },
    ];
    let path = store.write_table("order.csv", &rows).unwrap();
    assert_eq!(path, store.root_dir().join("order.csv"));
    assert_eq!(store.read_table::<OrderRow>("order.csv").unwrap(), rows);

    let stream_nodes = vec![StreamNodesRow::new(
        Id::new(3).unwrap(),
        &[Id::new(1).unwrap(), Id::new(2).unwrap()],
    )];
    store.write_table("stream_nodes.csv", &stream_nodes).unwrap();
    assert_eq!(
        store.read_table::<StreamNodesRow>("stream_nodes.csv").unwrap()[0].nodes,
        "1,2"
    );
}
