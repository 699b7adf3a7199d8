// Access Control - Error Codes
//
// Error Code Ranges:
// - 0x0300-0x030F: Authorization errors
// - 0x0310-0x031F: Enumeration errors
// - 0x0320-0x032F: Lifecycle errors
// - 0x03F0: Storage errors

use thiserror::Error;

use super::RoleId;
use crate::crypto::Address;
use crate::storage::StorageError;

/// Access control operation result type
pub type AccessControlResult<T> = Result<T, AccessControlError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessControlError {
    #[error("account {account} is missing role 0x{}", hex::encode(.role))]
    Unauthorized { account: Address, role: RoleId },

    #[error("can only renounce roles for self")]
    SelfOnly,

    #[error("the default admin role always administers itself")]
    DefaultAdminLocked,

    #[error("index {index} out of range, role has {count} members")]
    IndexOutOfRange { index: u32, count: u32 },

    #[error("no member stored at index {index}")]
    NotFound { index: u32 },

    #[error("registry is already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AccessControlError {
    /// Stable numeric code for hosts mapping failures onto abort codes
    pub fn code(&self) -> u64 {
        match self {
            Self::Unauthorized { .. } => 0x0300,
            Self::SelfOnly => 0x0301,
            Self::DefaultAdminLocked => 0x0303,
            Self::IndexOutOfRange { .. } => 0x0310,
            Self::NotFound { .. } => 0x0311,
            Self::AlreadyInitialized => 0x0320,
            Self::Storage(_) => 0x03F0,
        }
    }
}
