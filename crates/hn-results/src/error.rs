use hn_core::CoreError;
use hn_storage::StorageError;
use thiserror::Error;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("Invalid results metadata: {reason}")]
    InvalidMetadata { reason: String },

    #[error("Timestep {index} out of range [0, {count})")]
    TimestepOutOfRange { index: usize, count: usize },

    #[error("Could not read {length} bytes at {offset} from {key}")]
    SliceUnavailable {
        key: &'static str,
        offset: u64,
        length: u64,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Buffer error: {0}")]
    Buffer(#[from] CoreError),
}
