use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Malformed column {what}: {len} bytes is not a multiple of {elem_size}")]
    MisalignedColumn {
        what: &'static str,
        len: usize,
        elem_size: usize,
    },

    #[error("Column {what} not fully written: {written} of {expected} elements")]
    IncompleteColumn {
        what: &'static str,
        written: usize,
        expected: usize,
    },

    #[error("Byte range out of bounds: {what} (offset={offset}, size={size}, len={len})")]
    RangeOob {
        what: &'static str,
        offset: usize,
        size: usize,
        len: usize,
    },
}
