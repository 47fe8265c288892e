//! Error types for the hn-app service layer.

use std::path::PathBuf;

use hn_analysis::AnalysisError;
use hn_graph::GraphError;
use hn_results::ResultsError;
use hn_storage::StorageError;

/// Unified error for every front-end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Network error: {0}")]
    Graph(#[from] GraphError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for hn-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Analysis(err) if err.is_cancelled())
    }
}
