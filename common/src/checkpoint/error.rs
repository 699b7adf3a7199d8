// Checkpoint - Error Codes
//
// Error Code Ranges:
// - 0x0400-0x040F: Sequence errors
// - 0x0410-0x041F: Lookup errors
// - 0x0420-0x042F: Snapshot errors
// - 0x04F0-0x04FF: System errors

use thiserror::Error;

use crate::storage::StorageError;

/// Checkpoint operation result type
pub type CheckpointResult<T> = Result<T, CheckpointError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointError {
    #[error("sequence {attempted} is before the last recorded sequence {last}")]
    NonMonotonicSequence { last: u64, attempted: u64 },

    #[error("sequence {requested} not yet reached (current is {current})")]
    FutureQuery { requested: u64, current: u64 },

    #[error("no checkpoint at index {index}, series has {count}")]
    NotFound { index: u32, count: u32 },

    #[error("id is 0")]
    InvalidSnapshotId,

    #[error("nonexistent id {id}")]
    NonexistentSnapshot { id: u64 },

    #[error("sequence overflow")]
    Overflow,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CheckpointError {
    pub fn code(&self) -> u64 {
        match self {
            Self::NonMonotonicSequence { .. } => 0x0400,
            Self::FutureQuery { .. } => 0x0401,
            Self::NotFound { .. } => 0x0410,
            Self::InvalidSnapshotId => 0x0420,
            Self::NonexistentSnapshot { .. } => 0x0421,
            Self::Overflow => 0x04F0,
            Self::Storage(_) => 0x04F1,
        }
    }
}
