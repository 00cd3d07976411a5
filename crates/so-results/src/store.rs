//! Output directory API.

use crate::tables::{TableRow, read_table, write_table};
use crate::types::RunSummary;
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const SUMMARY_FILE: &str = "summary.json";

/// Directory receiving the tables and summary of a run.
#[derive(Debug, Clone)]
pub struct OutputStore {
    root_dir: PathBuf,
}

impl OutputStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root_dir.join(name)
    }

    pub fn write_table<T: TableRow>(&self, name: &str, rows: &[T]) -> ResultsResult<PathBuf> {
        let path = self.path_of(name);
        write_table(&path, rows)?;
        Ok(path)
    }

    pub fn read_table<T: TableRow>(&self, name: &str) -> ResultsResult<Vec<T>> {
        read_table(&self.path_of(name))
    }

    pub fn save_summary(&self, summary: &RunSummary) -> ResultsResult<PathBuf> {
        let path = self.path_of(SUMMARY_FILE);
        fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        Ok(path)
    }

    pub fn load_summary(&self) -> ResultsResult<RunSummary> {
        let path = self.path_of(SUMMARY_FILE);
        if !path.exists() {
            return Err(ResultsError::SummaryNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
