//! Result data types.

use serde::{Deserialize, Serialize};
use so_core::{NodeId, SegmentId, join_ids};

/// `NODE, STREAM_IDS`: the streams meeting at each node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeStreamsRow {
    #[serde(rename = "NODE")]
    pub node: u32,
    #[serde(rename = "STREAM_IDS")]
    pub stream_ids: String,
}

impl NodeStreamsRow {
    pub fn new(node: NodeId, streams: &[SegmentId]) -> Self {
        Self {
            node: node.get(),
            stream_ids: join_ids(streams),
        }
    }
}

/// `STREAM_ID, NODES`: the nodes at each stream's ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamNodesRow {
    #[serde(rename = "STREAM_ID")]
    pub stream_id: u32,
    #[serde(rename = "NODES")]
    pub nodes: String,
}

impl StreamNodesRow {
    pub fn new(stream: SegmentId, nodes: &[NodeId]) -> Self {
        Self {
            stream_id: stream.get(),
            nodes: join_ids(nodes),
        }
    }
}

/// `STREAM_ID, FROM_NODE, TO_NODE, BRAIDED`; unset nodes are empty cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowRow {
    #[serde(rename = "STREAM_ID")]
    pub stream_id: u32,
    #[serde(rename = "FROM_NODE")]
    pub from_node: Option<u32>,
    #[serde(rename = "TO_NODE")]
    pub to_node: Option<u32>,
    #[serde(rename = "BRAIDED")]
    pub braided: u8,
}

impl FlowRow {
    pub fn new(
        stream: SegmentId,
        from: Option<NodeId>,
        to: Option<NodeId>,
        braided: bool,
    ) -> Self {
        Self {
            stream_id: stream.get(),
            from_node: from.map(NodeId::get),
            to_node: to.map(NodeId::get),
            braided: u8::from(braided),
        }
    }
}

/// `STREAM_ID, STRAHLER_STREAM_ORDER`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRow {
    #[serde(rename = "STREAM_ID")]
    pub stream_id: u32,
    #[serde(rename = "STRAHLER_STREAM_ORDER")]
    pub order: i32,
}

/// Timing of one executed stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageRecord {
    pub stage: String,
    pub elapsed_s: f64,
}

/// Non-fatal findings of a run, as raw stream ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvisorySummary {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unconnected: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_braided: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unordered: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elevation_skipped: Vec<u32>,
}

/// `summary.json`, written at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub name: String,
    /// RFC 3339 completion time.
    pub timestamp: String,
    pub tool_version: String,
    #[serde(default)]
    pub stages: Vec<StageRecord>,
    #[serde(default)]
    pub segments: usize,
    #[serde(default)]
    pub nodes: usize,
    #[serde(default)]
    pub advisories: AdvisorySummary,
}

impl RunSummary {
    /// Summary stamped with the current time.
    pub fn now(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            stages: Vec::new(),
            segments: 0,
            nodes: 0,
            advisories: AdvisorySummary::default(),
        }
    }
}
