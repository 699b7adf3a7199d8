//! Host-facing access-control registry.
//!
//! Owns its store and event sink. Every mutation takes `&mut self`, so a
//! single owner applies mutations one at a time; wrap it in
//! [`Shared`](crate::shared::Shared) to share it between threads.

use trc_common::{
    access_control::{self, AccessControlResult, AccessControlStorage, RoleId},
    context::IdentityProvider,
    crypto::Address,
    event::EventSink,
};

pub struct AccessControlRegistry<S, E> {
    storage: S,
    events: E,
}

impl<S: AccessControlStorage, E: EventSink> AccessControlRegistry<S, E> {
    /// Create a registry and grant the default admin role to `admin`
    ///
    /// # Returns
    /// * `Err(AccessControlError::AlreadyInitialized)` if the store was bootstrapped before
    pub fn new(mut storage: S, mut events: E, admin: &Address) -> AccessControlResult<Self> {
        access_control::initialize(&mut storage, &mut events, admin)?;
        Ok(Self { storage, events })
    }

    /// Wrap a store without bootstrapping it (e.g. reopening a database)
    pub fn open(storage: S, events: E) -> Self {
        Self { storage, events }
    }

    pub fn is_initialized(&self) -> AccessControlResult<bool> {
        Ok(self.storage.is_initialized()?)
    }

    // ===== Queries =====

    pub fn has_role(&self, role: &RoleId, account: &Address) -> AccessControlResult<bool> {
        access_control::has_role(&self.storage, role, account)
    }

    pub fn get_role_admin(&self, role: &RoleId) -> AccessControlResult<RoleId> {
        access_control::get_role_admin(&self.storage, role)
    }

    /// Fails with `Unauthorized` unless `account` holds `role`
    pub fn check_role(&self, role: &RoleId, account: &Address) -> AccessControlResult<()> {
        access_control::check_role(&self.storage, role, account)
    }

    pub fn get_role_member_count(&self, role: &RoleId) -> AccessControlResult<u32> {
        access_control::get_role_member_count(&self.storage, role)
    }

    pub fn get_role_member(&self, role: &RoleId, index: u32) -> AccessControlResult<Address> {
        access_control::get_role_member(&self.storage, role, index)
    }

    pub fn get_role_members(&self, role: &RoleId) -> AccessControlResult<Vec<Address>> {
        access_control::get_role_members(&self.storage, role)
    }

    // ===== Mutations =====

    /// Returns false when `account` already held `role`
    pub fn grant_role<I: IdentityProvider + ?Sized>(
        &mut self,
        role: &RoleId,
        account: &Address,
        caller: &I,
    ) -> AccessControlResult<bool> {
        let sender = caller.current_caller();
        access_control::grant_role(&mut self.storage, &mut self.events, &sender, role, account)
    }

    /// Returns false when `account` did not hold `role`
    pub fn revoke_role<I: IdentityProvider + ?Sized>(
        &mut self,
        role: &RoleId,
        account: &Address,
        caller: &I,
    ) -> AccessControlResult<bool> {
        let sender = caller.current_caller();
        access_control::revoke_role(&mut self.storage, &mut self.events, &sender, role, account)
    }

    pub fn renounce_role<I: IdentityProvider + ?Sized>(
        &mut self,
        role: &RoleId,
        account: &Address,
        caller: &I,
    ) -> AccessControlResult<bool> {
        let sender = caller.current_caller();
        access_control::renounce_role(&mut self.storage, &mut self.events, &sender, role, account)
    }

    /// Privileged: the host decides who may reach this. Returns the previous admin role.
    pub fn set_role_admin(&mut self, role: &RoleId, admin_role: &RoleId) -> AccessControlResult<RoleId> {
        access_control::set_role_admin(&mut self.storage, &mut self.events, role, admin_role)
    }

    // ===== Accessors =====

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn into_parts(self) -> (S, E) {
        (self.storage, self.events)
    }
}
