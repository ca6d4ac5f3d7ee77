//! The crate's error taxonomy. Every fallible entry point returns one of
//! these four variants; there is no recoverable in-place state — on error
//! the caller's handle should be dropped.

use std::fmt;

#[derive(Debug)]
pub enum GraphError {
    /// Rejected configuration: k out of range, an unsupported
    /// (seq_format, copy_mode) combination, or similarly malformed params.
    BadParam(&'static str),
    /// An operation was applied to a handle in the wrong lifecycle state.
    InvalidState(&'static str),
    /// A buffer (sequence, link table, k-mer expansion, bucket array)
    /// could not grow to the size an operation needed.
    OutOfMemory(&'static str),
    /// The external key-sort step failed.
    SortFailure(&'static str),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::BadParam(msg) => write!(f, "bad parameter: {}", msg),
            GraphError::InvalidState(msg) => write!(f, "invalid lifecycle state: {}", msg),
            GraphError::OutOfMemory(msg) => write!(f, "out of memory: {}", msg),
            GraphError::SortFailure(msg) => write!(f, "sort failed: {}", msg),
        }
    }
}

impl std::error::Error for GraphError {}

pub type GraphResult<T> = Result<T, GraphError>;
