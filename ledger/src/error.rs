use thiserror::Error;
use trc_common::{
    access_control::AccessControlError, checkpoint::CheckpointError, storage::StorageError,
    token::TokenError,
};

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    AccessControl(#[from] AccessControlError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LedgerError {
    /// Numeric code of the underlying domain error, 0 for host-side failures
    pub fn code(&self) -> u64 {
        match self {
            Self::AccessControl(e) => e.code(),
            Self::Checkpoint(e) => e.code(),
            Self::Token(e) => e.code(),
            Self::Storage(_) => 0x0F00,
            _ => 0,
        }
    }
}
