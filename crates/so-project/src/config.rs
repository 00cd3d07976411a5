//! Run configuration document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use so_core::NodeId;

use crate::ProjectResult;

fn default_name() -> String {
    "streamorder".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_tolerance() -> f64 {
    1.0
}

fn enabled() -> bool {
    true
}

/// Everything one batch run needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Stream line dataset (`.yaml`/`.yml`/`.json`).
    pub streams: PathBuf,
    /// Node dataset; defaults to `<streams stem>_nodes.<ext>` next to the
    /// streams dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<PathBuf>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(default)]
    pub outputs: OutputNames,
    /// Drainage outlet node ids. Overrides flags stored on the node dataset.
    #[serde(default)]
    pub drainage: Vec<NodeId>,
    /// Optional elevation grid used to orient braided segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<PathBuf>,
    /// Endpoint clustering distance, in dataset units.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Read flow-stage nodes from the node/stream table instead of the node
    /// dataset.
    #[serde(default)]
    pub nodes_from_table: bool,
    #[serde(default)]
    pub stages: StageFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnNames {
    pub stream_id: String,
    pub from_node: String,
    pub to_node: String,
    pub braided: String,
    pub stream_order: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            stream_id: "STREAM_ID".to_string(),
            from_node: "FROM_NODE".to_string(),
            to_node: "TO_NODE".to_string(),
            braided: "BRAIDED".to_string(),
            stream_order: "STRAHLER".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn all(&self) -> [&str; 5] {
        [
            self.stream_id.as_str(),
            self.from_node.as_str(),
            self.to_node.as_str(),
            self.braided.as_str(),
            self.stream_order.as_str(),
        ]
    }
}

/// Table file names under the output directory. `None` skips the table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputNames {
    pub node_streams: Option<String>,
    pub stream_nodes: Option<String>,
    pub flow: Option<String>,
    pub stream_order: Option<String>,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            node_streams: Some("node_streams.csv".to_string()),
            stream_nodes: Some("stream_nodes.csv".to_string()),
            flow: Some("flow.csv".to_string()),
            stream_order: Some("stream_order.csv".to_string()),
        }
    }
}

impl OutputNames {
    pub fn all(&self) -> [Option<&str>; 4] {
        [
            self.node_streams.as_deref(),
            self.stream_nodes.as_deref(),
            self.flow.as_deref(),
            self.stream_order.as_deref(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageFlags {
    #[serde(default = "enabled")]
    pub prepare_stream: bool,
    #[serde(default = "enabled")]
    pub get_node_network: bool,
    #[serde(default = "enabled")]
    pub calculate_flow: bool,
    #[serde(default = "enabled")]
    pub complete_braided_streams: bool,
    #[serde(default = "enabled")]
    pub calculate_stream_order: bool,
}

impl Default for StageFlags {
    fn default() -> Self {
        Self {
            prepare_stream: true,
            get_node_network: true,
            calculate_flow: true,
            complete_braided_streams: true,
            calculate_stream_order: true,
        }
    }
}

impl RunConfig {
    /// Minimal config over a streams dataset, everything else defaulted.
    pub fn new(streams: impl Into<PathBuf>) -> Self {
        Self {
            name: default_name(),
            streams: streams.into(),
            nodes: None,
            output_dir: default_output_dir(),
            columns: ColumnNames::default(),
            outputs: OutputNames::default(),
            drainage: Vec::new(),
            elevation: None,
            tolerance: default_tolerance(),
            nodes_from_table: false,
            stages: StageFlags::default(),
        }
    }

    /// Load and validate a config, resolving relative paths against the
    /// config file's directory.
    pub fn load(path: &Path) -> ProjectResult<Self> {
        let mut config: RunConfig = crate::load_document(path)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        crate::validate::validate_config(&config)?;
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        join(&mut self.streams);
        join(&mut self.output_dir);
        if let Some(nodes) = &mut self.nodes {
            join(nodes);
        }
        if let Some(elevation) = &mut self.elevation {
            join(elevation);
        }
    }

    pub fn nodes_path(&self) -> PathBuf {
        if let Some(nodes) = &self.nodes {
            return nodes.clone();
        }
        let stem = self
            .streams
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("streams");
        let ext = self
            .streams
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("yaml");
        self.streams.with_file_name(format!("{stem}_nodes.{ext}"))
    }
}
