//! Storage plumbing shared by every backend.
//!
//! The storage traits themselves live next to the operations that use
//! them (`AccessControlStorage`, `CheckpointStorage`, `TokenStorage`).

mod memory;

pub use memory::MemoryStorage;

use thiserror::Error;

use crate::access_control::AccessControlStorage;
use crate::checkpoint::CheckpointStorage;
use crate::serializer::ReaderError;
use crate::token::TokenStorage;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupted value for key {key}: {error}")]
    Corrupted { key: String, error: ReaderError },

    #[error("counter overflow")]
    CountOverflow,
}

impl StorageError {
    pub fn corrupted(key: &[u8], error: ReaderError) -> Self {
        Self::Corrupted {
            key: hex::encode(key),
            error,
        }
    }
}

/// Everything a votes token needs from a single store
pub trait LedgerStorage: AccessControlStorage + CheckpointStorage + TokenStorage {}

impl<T: AccessControlStorage + CheckpointStorage + TokenStorage + ?Sized> LedgerStorage for T {}
