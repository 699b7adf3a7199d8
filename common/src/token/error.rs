// Votes Token - Error Codes
//
// Error Code Ranges:
// - 0x0500-0x050F: Balance errors
// - 0x05F0: Arithmetic errors
// - Wrapped errors keep the code of their own module

use thiserror::Error;

use crate::access_control::AccessControlError;
use crate::checkpoint::CheckpointError;
use crate::storage::StorageError;

/// Token operation result type
pub type TokenResult<T> = Result<T, TokenError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("transfer involving the zero address")]
    ZeroAddress,

    #[error("insufficient balance: has {balance}, needs {required}")]
    InsufficientBalance { balance: u64, required: u64 },

    #[error("total supply would exceed the cap of {cap}")]
    SupplyCapExceeded { cap: u64 },

    #[error("arithmetic overflow")]
    Overflow,

    #[error(transparent)]
    AccessControl(#[from] AccessControlError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TokenError {
    pub fn code(&self) -> u64 {
        match self {
            Self::ZeroAddress => 0x0500,
            Self::InsufficientBalance { .. } => 0x0501,
            Self::SupplyCapExceeded { .. } => 0x0502,
            Self::Overflow => 0x05F0,
            Self::AccessControl(e) => e.code(),
            Self::Checkpoint(e) => e.code(),
            Self::Storage(_) => 0x05F1,
        }
    }
}
