// Access Control Operations
//
// Queries never fail for unknown roles: a role nobody referenced yet has
// no members and is administered by DEFAULT_ADMIN_ROLE.
//
// Mutations validate everything before touching storage and emit exactly
// one event per effective change, after the change is stored.

use log::debug;

use super::{
    display_role, AccessControlError, AccessControlResult, AccessControlStorage, RoleId,
    DEFAULT_ADMIN_ROLE,
};
use crate::crypto::Address;
use crate::event::{Event, EventSink};

// ========================================
// Queries
// ========================================

/// Returns true if `account` has been granted `role`
pub fn has_role<S: AccessControlStorage + ?Sized>(
    storage: &S,
    role: &RoleId,
    account: &Address,
) -> AccessControlResult<bool> {
    Ok(storage.has_role_member(role, account)?)
}

/// Returns the admin role that controls `role`
pub fn get_role_admin<S: AccessControlStorage + ?Sized>(
    storage: &S,
    role: &RoleId,
) -> AccessControlResult<RoleId> {
    Ok(storage.get_role_admin(role)?.unwrap_or(DEFAULT_ADMIN_ROLE))
}

/// Guard for privileged operations
///
/// # Returns
/// * `Ok(())` if `account` holds `role`
/// * `Err(AccessControlError::Unauthorized)` otherwise
pub fn check_role<S: AccessControlStorage + ?Sized>(
    storage: &S,
    role: &RoleId,
    account: &Address,
) -> AccessControlResult<()> {
    if !has_role(storage, role, account)? {
        return Err(AccessControlError::Unauthorized {
            account: *account,
            role: *role,
        });
    }
    Ok(())
}

/// Number of accounts currently holding `role`
pub fn get_role_member_count<S: AccessControlStorage + ?Sized>(
    storage: &S,
    role: &RoleId,
) -> AccessControlResult<u32> {
    Ok(storage.role_member_count(role)?)
}

/// Member of `role` at `index`
///
/// # Returns
/// * `Ok(address)` on success
/// * `Err(AccessControlError::IndexOutOfRange)` if `index >= count`
/// * `Err(AccessControlError::NotFound)` if the backend lost the entry
pub fn get_role_member<S: AccessControlStorage + ?Sized>(
    storage: &S,
    role: &RoleId,
    index: u32,
) -> AccessControlResult<Address> {
    let count = storage.role_member_count(role)?;
    if index >= count {
        return Err(AccessControlError::IndexOutOfRange { index, count });
    }

    storage
        .role_member_at(role, index)?
        .ok_or(AccessControlError::NotFound { index })
}

/// Every member of `role`, in enumeration order
pub fn get_role_members<S: AccessControlStorage + ?Sized>(
    storage: &S,
    role: &RoleId,
) -> AccessControlResult<Vec<Address>> {
    let count = storage.role_member_count(role)?;
    let mut members = Vec::with_capacity(count as usize);
    for index in 0..count {
        members.push(get_role_member(storage, role, index)?);
    }
    Ok(members)
}

// ========================================
// Mutations
// ========================================

/// Grant `role` to `account`
///
/// # Arguments
/// * `storage` - Storage backend
/// * `events` - Event sink
/// * `sender` - Caller, must hold the admin role of `role`
/// * `role` - Role to grant
/// * `account` - Receiving account
///
/// # Returns
/// * `Ok(true)` if the role was granted, `Ok(false)` if already held
/// * `Err(AccessControlError::Unauthorized)` if sender is not an admin of `role`
pub fn grant_role<S, E>(
    storage: &mut S,
    events: &mut E,
    sender: &Address,
    role: &RoleId,
    account: &Address,
) -> AccessControlResult<bool>
where
    S: AccessControlStorage + ?Sized,
    E: EventSink + ?Sized,
{
    // 1. Sender must hold the admin role
    let admin_role = get_role_admin(storage, role)?;
    check_role(storage, &admin_role, sender)?;

    // 2. Apply
    grant_role_unchecked(storage, events, sender, role, account)
}

/// Revoke `role` from `account`
///
/// # Returns
/// * `Ok(true)` if the role was revoked, `Ok(false)` if it was not held
/// * `Err(AccessControlError::Unauthorized)` if sender is not an admin of `role`
pub fn revoke_role<S, E>(
    storage: &mut S,
    events: &mut E,
    sender: &Address,
    role: &RoleId,
    account: &Address,
) -> AccessControlResult<bool>
where
    S: AccessControlStorage + ?Sized,
    E: EventSink + ?Sized,
{
    let admin_role = get_role_admin(storage, role)?;
    check_role(storage, &admin_role, sender)?;

    revoke_role_unchecked(storage, events, sender, role, account)
}

/// Give up `role` held by `account`
///
/// # Returns
/// * `Ok(true)` if the role was dropped, `Ok(false)` if it was not held
/// * `Err(AccessControlError::SelfOnly)` if `sender != account`
pub fn renounce_role<S, E>(
    storage: &mut S,
    events: &mut E,
    sender: &Address,
    role: &RoleId,
    account: &Address,
) -> AccessControlResult<bool>
where
    S: AccessControlStorage + ?Sized,
    E: EventSink + ?Sized,
{
    if sender != account {
        return Err(AccessControlError::SelfOnly);
    }

    revoke_role_unchecked(storage, events, sender, role, account)
}

/// Change the admin role of `role`
///
/// Internal operation: the host decides who may call it. The switch is a
/// single storage write, so there is no point where both or neither admin
/// role are accepted.
///
/// # Returns
/// * `Ok(previous_admin_role)` on success
/// * `Err(AccessControlError::DefaultAdminLocked)` when targeting `DEFAULT_ADMIN_ROLE`
pub fn set_role_admin<S, E>(
    storage: &mut S,
    events: &mut E,
    role: &RoleId,
    admin_role: &RoleId,
) -> AccessControlResult<RoleId>
where
    S: AccessControlStorage + ?Sized,
    E: EventSink + ?Sized,
{
    if *role == DEFAULT_ADMIN_ROLE && *admin_role != DEFAULT_ADMIN_ROLE {
        return Err(AccessControlError::DefaultAdminLocked);
    }

    let previous_admin_role = get_role_admin(storage, role)?;
    storage.set_role_admin(role, admin_role)?;

    debug!(
        "admin of role {} changed from {} to {}",
        display_role(role),
        display_role(&previous_admin_role),
        display_role(admin_role)
    );

    events.emit(Event::RoleAdminChanged {
        role: *role,
        previous_admin_role,
        new_admin_role: *admin_role,
    });

    Ok(previous_admin_role)
}

/// Establish the first default admin
///
/// Equivalent to an unchecked grant, allowed exactly once per store.
pub fn initialize<S, E>(storage: &mut S, events: &mut E, admin: &Address) -> AccessControlResult<()>
where
    S: AccessControlStorage + ?Sized,
    E: EventSink + ?Sized,
{
    if storage.is_initialized()? {
        return Err(AccessControlError::AlreadyInitialized);
    }
    // The marker goes last: a failed grant leaves the store open for another bootstrap
    grant_role_unchecked(storage, events, admin, &DEFAULT_ADMIN_ROLE, admin)?;
    storage.set_initialized()?;
    Ok(())
}

/// Grant without the admin check, for bootstrap and host-internal setup
pub fn grant_role_unchecked<S, E>(
    storage: &mut S,
    events: &mut E,
    sender: &Address,
    role: &RoleId,
    account: &Address,
) -> AccessControlResult<bool>
where
    S: AccessControlStorage + ?Sized,
    E: EventSink + ?Sized,
{
    if !storage.add_role_member(role, account)? {
        return Ok(false);
    }

    debug!("role {} granted to {} by {}", display_role(role), account, sender);

    events.emit(Event::RoleGranted {
        role: *role,
        account: *account,
        sender: *sender,
    });
    Ok(true)
}

/// Revoke without the admin check
pub fn revoke_role_unchecked<S, E>(
    storage: &mut S,
    events: &mut E,
    sender: &Address,
    role: &RoleId,
    account: &Address,
) -> AccessControlResult<bool>
where
    S: AccessControlStorage + ?Sized,
    E: EventSink + ?Sized,
{
    if !storage.remove_role_member(role, account)? {
        return Ok(false);
    }

    debug!("role {} revoked from {} by {}", display_role(role), account, sender);

    events.emit(Event::RoleRevoked {
        role: *role,
        account: *account,
        sender: *sender,
    });
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::{role_id_from_name, MINTER_ROLE};
    use crate::storage::{MemoryStorage, StorageError, StorageResult};

    fn addr(name: &str) -> Address {
        Address::from_name(name)
    }

    fn setup() -> (MemoryStorage, Vec<Event>, Address) {
        let mut storage = MemoryStorage::new();
        let mut events: Vec<Event> = Vec::new();
        let admin = addr("admin");
        initialize(&mut storage, &mut events, &admin).unwrap();
        events.clear();
        (storage, events, admin)
    }

    #[test]
    fn test_initialize_grants_default_admin() {
        let mut storage = MemoryStorage::new();
        let mut events: Vec<Event> = Vec::new();
        let admin = addr("admin");

        initialize(&mut storage, &mut events, &admin).unwrap();

        assert!(has_role(&storage, &DEFAULT_ADMIN_ROLE, &admin).unwrap());
        assert_eq!(
            events,
            vec![Event::RoleGranted {
                role: DEFAULT_ADMIN_ROLE,
                account: admin,
                sender: admin,
            }]
        );
    }

    #[test]
    fn test_initialize_twice_fails() {
        let (mut storage, mut events, _) = setup();
        let result = initialize(&mut storage, &mut events, &addr("other"));
        assert_eq!(result, Err(AccessControlError::AlreadyInitialized));
        assert!(!has_role(&storage, &DEFAULT_ADMIN_ROLE, &addr("other")).unwrap());
    }

    #[test]
    fn test_default_admin_is_its_own_admin() {
        let (storage, _, _) = setup();
        assert_eq!(
            get_role_admin(&storage, &DEFAULT_ADMIN_ROLE).unwrap(),
            DEFAULT_ADMIN_ROLE
        );
        assert_eq!(
            get_role_admin(&storage, &role_id_from_name("NEVER_SEEN")).unwrap(),
            DEFAULT_ADMIN_ROLE
        );
    }

    #[test]
    fn test_grant_is_idempotent() {
        let (mut storage, mut events, admin) = setup();
        let bob = addr("bob");

        assert!(grant_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &bob).unwrap());
        assert!(!grant_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &bob).unwrap());

        assert_eq!(get_role_member_count(&storage, &MINTER_ROLE).unwrap(), 1);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_grant_requires_admin_role() {
        let (mut storage, mut events, _) = setup();
        let mallory = addr("mallory");

        let result = grant_role(&mut storage, &mut events, &mallory, &MINTER_ROLE, &mallory);
        assert_eq!(
            result,
            Err(AccessControlError::Unauthorized {
                account: mallory,
                role: DEFAULT_ADMIN_ROLE,
            })
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_zero_address_is_an_ordinary_account() {
        let (mut storage, mut events, admin) = setup();

        let result = grant_role(&mut storage, &mut events, &addr("x"), &MINTER_ROLE, &Address::ZERO);
        assert!(matches!(result, Err(AccessControlError::Unauthorized { .. })));

        assert!(grant_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &Address::ZERO).unwrap());
        assert!(has_role(&storage, &MINTER_ROLE, &Address::ZERO).unwrap());
        assert_eq!(
            events,
            vec![Event::RoleGranted {
                role: *MINTER_ROLE,
                account: Address::ZERO,
                sender: admin,
            }]
        );
    }

    #[test]
    fn test_full_enumeration_of_large_role() {
        let (mut storage, mut events, admin) = setup();
        for i in 0..1100 {
            let account = addr(&format!("member{}", i));
            grant_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &account).unwrap();
        }

        let members = get_role_members(&storage, &MINTER_ROLE).unwrap();
        assert_eq!(get_role_member_count(&storage, &MINTER_ROLE).unwrap(), 1100);
        assert_eq!(members.len(), 1100);
        assert_eq!(members[1099], addr("member1099"));
    }

    // Store whose member inserts always fail
    struct BrokenMembers(MemoryStorage);

    impl AccessControlStorage for BrokenMembers {
        fn get_role_admin(&self, role: &RoleId) -> StorageResult<Option<RoleId>> {
            self.0.get_role_admin(role)
        }

        fn set_role_admin(&mut self, role: &RoleId, admin_role: &RoleId) -> StorageResult<()> {
            self.0.set_role_admin(role, admin_role)
        }

        fn has_role_member(&self, role: &RoleId, account: &Address) -> StorageResult<bool> {
            self.0.has_role_member(role, account)
        }

        fn role_member_count(&self, role: &RoleId) -> StorageResult<u32> {
            self.0.role_member_count(role)
        }

        fn role_member_at(&self, role: &RoleId, index: u32) -> StorageResult<Option<Address>> {
            self.0.role_member_at(role, index)
        }

        fn add_role_member(&mut self, _: &RoleId, _: &Address) -> StorageResult<bool> {
            Err(StorageError::Backend("disk full".to_string()))
        }

        fn remove_role_member(&mut self, role: &RoleId, account: &Address) -> StorageResult<bool> {
            self.0.remove_role_member(role, account)
        }

        fn is_initialized(&self) -> StorageResult<bool> {
            self.0.is_initialized()
        }

        fn set_initialized(&mut self) -> StorageResult<()> {
            self.0.set_initialized()
        }
    }

    #[test]
    fn test_failed_bootstrap_leaves_store_uninitialized() {
        let mut storage = BrokenMembers(MemoryStorage::new());
        let mut events: Vec<Event> = Vec::new();

        let result = initialize(&mut storage, &mut events, &addr("admin"));
        assert!(matches!(result, Err(AccessControlError::Storage(_))));
        assert!(!storage.is_initialized().unwrap());
        assert!(events.is_empty());

        // a healthy retry on the same data still bootstraps
        let mut storage = storage.0;
        initialize(&mut storage, &mut events, &addr("admin")).unwrap();
        assert!(storage.is_initialized().unwrap());
        assert!(has_role(&storage, &DEFAULT_ADMIN_ROLE, &addr("admin")).unwrap());
    }

    #[test]
    fn test_revoke_unheld_is_silent() {
        let (mut storage, mut events, admin) = setup();
        assert!(!revoke_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &addr("bob")).unwrap());
        assert!(events.is_empty());
    }

    #[test]
    fn test_renounce_only_for_self() {
        let (mut storage, mut events, admin) = setup();
        let bob = addr("bob");
        grant_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &bob).unwrap();

        let result = renounce_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &bob);
        assert_eq!(result, Err(AccessControlError::SelfOnly));

        assert!(renounce_role(&mut storage, &mut events, &bob, &MINTER_ROLE, &bob).unwrap());
        assert!(!renounce_role(&mut storage, &mut events, &bob, &MINTER_ROLE, &bob).unwrap());
        assert!(!has_role(&storage, &MINTER_ROLE, &bob).unwrap());
        assert_eq!(
            events.last(),
            Some(&Event::RoleRevoked {
                role: *MINTER_ROLE,
                account: bob,
                sender: bob,
            })
        );
    }

    #[test]
    fn test_set_role_admin_switches_authority() {
        let (mut storage, mut events, admin) = setup();
        let other_admin = role_id_from_name("OTHER_ADMIN");
        let carol = addr("carol");

        let previous = set_role_admin(&mut storage, &mut events, &MINTER_ROLE, &other_admin).unwrap();
        assert_eq!(previous, DEFAULT_ADMIN_ROLE);
        grant_role(&mut storage, &mut events, &admin, &other_admin, &carol).unwrap();

        let result = grant_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &admin);
        assert!(matches!(result, Err(AccessControlError::Unauthorized { .. })));
        assert!(grant_role(&mut storage, &mut events, &carol, &MINTER_ROLE, &carol).unwrap());
    }

    #[test]
    fn test_set_role_admin_event() {
        let (mut storage, mut events, _) = setup();
        let other_admin = role_id_from_name("OTHER_ADMIN");

        set_role_admin(&mut storage, &mut events, &MINTER_ROLE, &other_admin).unwrap();
        assert_eq!(
            events,
            vec![Event::RoleAdminChanged {
                role: *MINTER_ROLE,
                previous_admin_role: DEFAULT_ADMIN_ROLE,
                new_admin_role: other_admin,
            }]
        );
    }

    #[test]
    fn test_default_admin_cannot_be_reassigned() {
        let (mut storage, mut events, _) = setup();
        let result = set_role_admin(&mut storage, &mut events, &DEFAULT_ADMIN_ROLE, &MINTER_ROLE);
        assert_eq!(result, Err(AccessControlError::DefaultAdminLocked));
        assert!(events.is_empty());
    }

    #[test]
    fn test_enumeration_out_of_range() {
        let (mut storage, mut events, admin) = setup();
        grant_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &addr("x")).unwrap();

        assert_eq!(get_role_member(&storage, &MINTER_ROLE, 0).unwrap(), addr("x"));
        assert_eq!(
            get_role_member(&storage, &MINTER_ROLE, 1),
            Err(AccessControlError::IndexOutOfRange { index: 1, count: 1 })
        );
    }

    #[test]
    fn test_enumeration_after_revoke() {
        let (mut storage, mut events, admin) = setup();
        for name in ["x", "y", "z"] {
            grant_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &addr(name)).unwrap();
        }
        revoke_role(&mut storage, &mut events, &admin, &MINTER_ROLE, &addr("y")).unwrap();

        let mut members = get_role_members(&storage, &MINTER_ROLE).unwrap();
        members.sort();
        let mut expected = vec![addr("x"), addr("z")];
        expected.sort();
        assert_eq!(members, expected);
    }
}
