//! so-project: dataset documents, run configuration and the feature store.

pub mod config;
pub mod elevation;
pub mod prepare;
pub mod schema;
pub mod store;
pub mod validate;

pub use config::{ColumnNames, OutputNames, RunConfig, StageFlags};
pub use elevation::ElevationGrid;
pub use prepare::{PrepareReport, assign_stream_ids};
pub use schema::*;
pub use store::{DatasetStore, FeatureStore};
pub use validate::{check_linear_unit, validate_config, validate_streams};

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Could not find column ({column})")]
    ColumnNotFound { column: String },

    #[error("Dataset units ({unit}) not recognized as valid linear unit")]
    UnsupportedUnits { unit: String },

    #[error("If node network table provided, drainage node ids must be manually supplied")]
    DrainageRequired,

    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Invalid value in column {column} of feature {feature}: {value}")]
    InvalidAttribute {
        column: String,
        feature: usize,
        value: String,
    },

    #[error("Feature index {index} out of range ({count} features)")]
    FeatureOutOfRange { index: usize, count: usize },

    #[error("Unsupported dataset version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Core error: {0}")]
    Core(#[from] so_core::SoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> ProjectResult<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

pub fn save_yaml<T: Serialize>(path: &Path, value: &T) -> ProjectResult<()> {
    let content = serde_yaml::to_string(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> ProjectResult<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> ProjectResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Load a document as JSON when the extension says so, YAML otherwise.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> ProjectResult<T> {
    if is_json(path) {
        load_json(path)
    } else {
        load_yaml(path)
    }
}

pub fn save_document<T: Serialize>(path: &Path, value: &T) -> ProjectResult<()> {
    if is_json(path) {
        save_json(path, value)
    } else {
        save_yaml(path, value)
    }
}
