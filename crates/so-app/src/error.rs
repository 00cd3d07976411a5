//! Error types for the so-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives the CLI one error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Dataset error: {0}")]
    Project(String),

    #[error("Network error: {0}")]
    Graph(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for so-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<so_project::ProjectError> for AppError {
    fn from(err: so_project::ProjectError) -> Self {
        match err {
            so_project::ProjectError::InvalidConfig { what } => AppError::Config(what),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<so_graph::GraphError> for AppError {
    fn from(err: so_graph::GraphError) -> Self {
        AppError::Graph(err.to_string())
    }
}

impl From<so_topology::TopologyError> for AppError {
    fn from(err: so_topology::TopologyError) -> Self {
        AppError::Topology(err.to_string())
    }
}

impl From<so_results::ResultsError> for AppError {
    fn from(err: so_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

impl From<so_core::SoError> for AppError {
    fn from(err: so_core::SoError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}
