use hn_graph::GraphError;
use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Analysis worker failed: {reason}")]
    WorkerFailed { reason: String },

    #[error("Could not start analysis worker: {reason}")]
    WorkerSpawn { reason: String },
}

impl AnalysisError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AnalysisError::Cancelled)
    }
}
