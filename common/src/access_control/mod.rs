// Access Control Module
//
// Hierarchical role-based permissions:
// - Every role has exactly one admin role (DEFAULT_ADMIN_ROLE unless changed)
// - Holders of a role's admin role may grant and revoke it
// - Anyone may renounce a role they hold, but only for themselves
//
// Operations are runtime-agnostic free functions over `AccessControlStorage`.

mod error;
mod operations;
mod roles;

pub use error::*;
pub use operations::*;
pub use roles::*;

use crate::crypto::Address;
use crate::storage::StorageResult;

// ========================================
// Storage Trait (for dependency injection)
// ========================================

/// Abstract storage interface for role records
///
/// Members form an enumerable set: insertion order is kept until a removal,
/// which moves the last member into the freed slot.
pub trait AccessControlStorage {
    // Admin hierarchy
    fn get_role_admin(&self, role: &RoleId) -> StorageResult<Option<RoleId>>;
    fn set_role_admin(&mut self, role: &RoleId, admin_role: &RoleId) -> StorageResult<()>;

    // Membership
    fn has_role_member(&self, role: &RoleId, account: &Address) -> StorageResult<bool>;
    fn role_member_count(&self, role: &RoleId) -> StorageResult<u32>;
    fn role_member_at(&self, role: &RoleId, index: u32) -> StorageResult<Option<Address>>;

    /// Insert a member, returns false if it was already present
    fn add_role_member(&mut self, role: &RoleId, account: &Address) -> StorageResult<bool>;

    /// Remove a member, returns false if it was not present
    fn remove_role_member(&mut self, role: &RoleId, account: &Address) -> StorageResult<bool>;

    // Bootstrap marker
    fn is_initialized(&self) -> StorageResult<bool>;
    fn set_initialized(&mut self) -> StorageResult<()>;
}
