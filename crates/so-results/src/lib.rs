//! so-results: output tables and run summaries.

pub mod store;
pub mod tables;
pub mod types;

pub use store::OutputStore;
pub use tables::{TableRow, read_node_streams, read_table, write_table};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid row {row} in {table}: {what}")]
    InvalidRow {
        table: String,
        row: usize,
        what: String,
    },

    #[error("Run summary not found: {path}")]
    SummaryNotFound { path: String },
}
