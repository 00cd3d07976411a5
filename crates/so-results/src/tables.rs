//! CSV tables with fixed headers.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use so_core::{NodeId, SegmentId, parse_id_list};

use crate::types::{FlowRow, NodeStreamsRow, OrderRow, StreamNodesRow};
use crate::{ResultsError, ResultsResult};

/// A row type with a fixed header line.
pub trait TableRow: Serialize + DeserializeOwned {
    const HEADERS: &'static [&'static str];
}

impl TableRow for NodeStreamsRow {
    const HEADERS: &'static [&'static str] = &["NODE", "STREAM_IDS"];
}

impl TableRow for StreamNodesRow {
    const HEADERS: &'static [&'static str] = &["STREAM_ID", "NODES"];
}

impl TableRow for FlowRow {
    const HEADERS: &'static [&'static str] = &["STREAM_ID", "FROM_NODE", "TO_NODE", "BRAIDED"];
}

impl TableRow for OrderRow {
    const HEADERS: &'static [&'static str] = &["STREAM_ID", "STRAHLER_STREAM_ORDER"];
}

/// Write the header line, then one line per row. An empty table still gets
/// its header.
pub fn write_table<T: TableRow>(path: &Path, rows: &[T]) -> ResultsResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_table<T: TableRow>(path: &Path) -> ResultsResult<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    if headers.iter().ne(T::HEADERS.iter().copied()) {
        return Err(ResultsError::InvalidRow {
            table: path.display().to_string(),
            row: 0,
            what: format!("expected header {}", T::HEADERS.join(",")),
        });
    }
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Read a `NODE, STREAM_IDS` table back into ids. Rows with an empty node
/// cell are skipped.
pub fn read_node_streams(path: &Path) -> ResultsResult<Vec<(NodeId, Vec<SegmentId>)>> {
    let table = path.display().to_string();
    let invalid = |row: usize, what: String| ResultsError::InvalidRow {
        table: table.clone(),
        row,
        what,
    };

    let mut reader = csv::Reader::from_path(path)?;
    let mut nodes = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let node_cell = record.get(0).unwrap_or("").trim();
        if node_cell.is_empty() {
            continue;
        }
        let node = node_cell
            .parse::<u32>()
            .ok()
            .and_then(NodeId::new)
            .ok_or_else(|| invalid(row, format!("bad node id {node_cell:?}")))?;
        let streams = parse_id_list("stream ids", record.get(1).unwrap_or(""))
            .map_err(|e| invalid(row, e.to_string()))?;
        nodes.push((node, streams));
    }
    Ok(nodes)
}
