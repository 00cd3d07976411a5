//! Feature storage seam and its YAML/JSON document implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use so_core::SegmentId;

use crate::schema::{AttrValue, LineFeatureDef, NodeDataset, NodeFeatureDef, StreamDataset};
use crate::{ProjectError, ProjectResult, load_document, save_document};

/// Everything the pipeline stages need from a stream/node dataset pair.
pub trait FeatureStore {
    /// Declared linear unit of the stream dataset, if any.
    fn linear_unit(&self) -> Option<&str>;

    fn columns(&self) -> &[String];

    /// Add a column when absent. Returns true when it was created.
    fn ensure_column(&mut self, column: &str) -> bool;

    fn line_features(&self) -> &[LineFeatureDef];

    /// Set one attribute of the feature at `index`.
    fn set_attribute(&mut self, index: usize, column: &str, value: AttrValue) -> ProjectResult<()>;

    fn node_features(&self) -> &[NodeFeatureDef];

    fn replace_nodes(&mut self, nodes: Vec<NodeFeatureDef>);

    /// Persist pending changes.
    fn save(&self) -> ProjectResult<()>;

    fn has_column(&self, column: &str) -> bool {
        self.columns().iter().any(|c| c == column)
    }

    fn require_column(&self, column: &str) -> ProjectResult<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(ProjectError::ColumnNotFound {
                column: column.to_string(),
            })
        }
    }

    /// Write `values` into `column` of every feature whose `id_column`
    /// holds a matching stream id. Returns the number of features written.
    fn write_by_stream_id(
        &mut self,
        id_column: &str,
        column: &str,
        values: &BTreeMap<SegmentId, AttrValue>,
    ) -> ProjectResult<usize> {
        self.require_column(id_column)?;
        self.ensure_column(column);

        let targets: Vec<(usize, AttrValue)> = self
            .line_features()
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| {
                let raw = feature.attr(id_column)?.as_i64()?;
                let id = u32::try_from(raw).ok().and_then(SegmentId::new)?;
                values.get(&id).map(|v| (index, v.clone()))
            })
            .collect();

        let written = targets.len();
        for (index, value) in targets {
            self.set_attribute(index, column, value)?;
        }
        Ok(written)
    }
}

/// Stream and node datasets held in memory, optionally backed by files.
///
/// Files ending in `.json` are read and written as JSON, anything else as
/// YAML.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    streams: StreamDataset,
    nodes: NodeDataset,
    streams_path: Option<PathBuf>,
    nodes_path: Option<PathBuf>,
}

impl DatasetStore {
    /// Store that never touches disk.
    pub fn in_memory(streams: StreamDataset, nodes: NodeDataset) -> Self {
        Self {
            streams,
            nodes,
            streams_path: None,
            nodes_path: None,
        }
    }

    /// Open the stream dataset and, when it exists, the node dataset.
    pub fn open(streams_path: &Path, nodes_path: &Path) -> ProjectResult<Self> {
        let streams: StreamDataset = load_document(streams_path)?;
        crate::validate::validate_streams(&streams)?;
        let nodes = if nodes_path.exists() {
            load_document(nodes_path)?
        } else {
            NodeDataset::new(format!("{}_nodes", streams.name))
        };
        if nodes.version > crate::schema::LATEST_VERSION {
            return Err(ProjectError::UnsupportedVersion {
                version: nodes.version,
            });
        }
        Ok(Self {
            streams,
            nodes,
            streams_path: Some(streams_path.to_path_buf()),
            nodes_path: Some(nodes_path.to_path_buf()),
        })
    }

    pub fn streams(&self) -> &StreamDataset {
        &self.streams
    }

    pub fn nodes(&self) -> &NodeDataset {
        &self.nodes
    }
}

impl FeatureStore for DatasetStore {
    fn linear_unit(&self) -> Option<&str> {
        self.streams.linear_unit.as_deref()
    }

    fn columns(&self) -> &[String] {
        &self.streams.columns
    }

    fn ensure_column(&mut self, column: &str) -> bool {
        if self.has_column(column) {
            return false;
        }
        self.streams.columns.push(column.to_string());
        true
    }

    fn line_features(&self) -> &[LineFeatureDef] {
        &self.streams.features
    }

    fn set_attribute(&mut self, index: usize, column: &str, value: AttrValue) -> ProjectResult<()> {
        self.require_column(column)?;
        let count = self.streams.features.len();
        let feature = self
            .streams
            .features
            .get_mut(index)
            .ok_or(ProjectError::FeatureOutOfRange { index, count })?;
        feature.attributes.insert(column.to_string(), value);
        Ok(())
    }

    fn node_features(&self) -> &[NodeFeatureDef] {
        &self.nodes.nodes
    }

    fn replace_nodes(&mut self, nodes: Vec<NodeFeatureDef>) {
        self.nodes.nodes = nodes;
    }

    fn save(&self) -> ProjectResult<()> {
        if let Some(path) = &self.streams_path {
            save_document(path, &self.streams)?;
            tracing::debug!(path = %path.display(), features = self.streams.features.len(), "saved streams");
        }
        if let Some(path) = &self.nodes_path {
            save_document(path, &self.nodes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use so_core::Id;

    fn store() -> DatasetStore {
        let mut streams = StreamDataset::new("streams");
        streams.columns.push("STREAM_ID".to_string());
        streams.features = vec![
            LineFeatureDef::new(vec![[0.0, 0.0], [1.0, 0.0]]).with_attr("STREAM_ID", 5_i64),
            LineFeatureDef::new(vec![[1.0, 0.0], [2.0, 0.0]]).with_attr("STREAM_ID", 6_i64),
            LineFeatureDef::new(vec![[2.0, 0.0], [3.0, 0.0]]),
        ];
        DatasetStore::in_memory(streams, NodeDataset::new("nodes"))
    }

    #[test]
    fn missing_column_is_reported() {
        let s = store();
        assert!(matches!(
            s.require_column("FROM_NODE"),
            Err(ProjectError::ColumnNotFound { column }) if column == "FROM_NODE"
        ));
    }

    #[test]
    fn write_by_stream_id_creates_column() {
        let mut s = store();
        let mut values = BTreeMap::new();
        values.insert(Id::new(6).unwrap(), AttrValue::Int(2));
        values.insert(Id::new(99).unwrap(), AttrValue::Int(7));

        let written = s.write_by_stream_id("STREAM_ID", "STRAHLER", &values).unwrap();
        assert_eq!(written, 1);
        assert!(s.has_column("STRAHLER"));
        assert_eq!(s.line_features()[1].attr("STRAHLER"), Some(&AttrValue::Int(2)));
        assert_eq!(s.line_features()[0].attr("STRAHLER"), None);
    }

    #[test]
    fn set_attribute_checks_bounds_and_columns() {
        let mut s = store();
        assert!(matches!(
            s.set_attribute(9, "STREAM_ID", AttrValue::Int(1)),
            Err(ProjectError::FeatureOutOfRange { index: 9, count: 3 })
        ));
        assert!(matches!(
            s.set_attribute(0, "NOPE", AttrValue::Int(1)),
            Err(ProjectError::ColumnNotFound { .. })
        ));
        assert!(s.ensure_column("NOPE"));
        assert!(!s.ensure_column("NOPE"));
        s.set_attribute(0, "NOPE", AttrValue::Int(1)).unwrap();
    }

    #[test]
    fn files_round_trip_by_extension() {
        let dir = std::env::temp_dir().join("so_project_store_round_trip");
        std::fs::create_dir_all(&dir).unwrap();
        let streams_path = dir.join("streams.yaml");
        let nodes_path = dir.join("nodes.json");
        let _ = std::fs::remove_file(&nodes_path);

        let seeded = store();
        crate::save_yaml(&streams_path, seeded.streams()).unwrap();

        let mut opened = DatasetStore::open(&streams_path, &nodes_path).unwrap();
        assert_eq!(opened.streams(), seeded.streams());
        assert!(opened.node_features().is_empty());

        opened.replace_nodes(vec![NodeFeatureDef {
            node: 1,
            x: 0.0,
            y: 0.0,
            stream_ids: "5".to_string(),
            end_point: true,
            drainage: false,
        }]);
        opened.save().unwrap();

        let text = std::fs::read_to_string(&nodes_path).unwrap();
        assert!(text.trim_start().starts_with('{'));
        let reopened = DatasetStore::open(&streams_path, &nodes_path).unwrap();
        assert_eq!(reopened.node_features().len(), 1);
    }
}
