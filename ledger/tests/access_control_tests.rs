//! Access Control Registry Tests
//!
//! Test groups:
//! - Idempotence of grant / revoke / renounce (one event per real change)
//! - Admin hierarchy and admin transfer
//! - Self-only renounce
//! - Enumeration, including after renounce
//! - Zero address treated as an ordinary account
//! - Event delivery through a channel

use trc_common::{
    access_control::{role_id_from_name, AccessControlError, RoleId, DEFAULT_ADMIN_ROLE},
    crypto::Address,
    event::Event,
    storage::MemoryStorage,
};
use trc_ledger::AccessControlRegistry;

type Registry = AccessControlRegistry<MemoryStorage, Vec<Event>>;

fn addr(name: &str) -> Address {
    Address::from_name(name)
}

fn role(name: &str) -> RoleId {
    role_id_from_name(name)
}

fn registry(admin: &Address) -> Registry {
    let mut registry = AccessControlRegistry::new(MemoryStorage::new(), Vec::new(), admin)
        .expect("Should bootstrap registry");
    registry.events_mut().clear();
    registry
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_grant_twice_emits_once() {
    let a = addr("A");
    let b = addr("B");
    let r = role("R");
    let mut registry = registry(&a);

    assert!(registry.grant_role(&r, &b, &a).unwrap());
    assert!(!registry.grant_role(&r, &b, &a).unwrap());

    assert!(registry.has_role(&r, &b).unwrap());
    assert_eq!(
        registry.events(),
        &vec![Event::RoleGranted {
            role: r,
            account: b,
            sender: a,
        }]
    );
}

#[test]
fn test_revoke_and_renounce_unheld_emit_nothing() {
    let a = addr("A");
    let b = addr("B");
    let r = role("R");
    let mut registry = registry(&a);

    assert!(!registry.revoke_role(&r, &b, &a).unwrap());
    assert!(!registry.renounce_role(&r, &b, &b).unwrap());

    registry.grant_role(&r, &b, &a).unwrap();
    assert!(registry.revoke_role(&r, &b, &a).unwrap());
    assert!(!registry.revoke_role(&r, &b, &a).unwrap());

    let revoked = registry
        .events()
        .iter()
        .filter(|e| matches!(e, Event::RoleRevoked { .. }))
        .count();
    assert_eq!(revoked, 1);
}

// ============================================================================
// Admin hierarchy
// ============================================================================

#[test]
fn test_non_admin_cannot_grant_any_account() {
    let a = addr("A");
    let outsider = addr("outsider");
    let r = role("R");
    let mut registry = registry(&a);

    for target in [addr("x"), addr("y"), outsider, Address::ZERO] {
        let result = registry.grant_role(&r, &target, &outsider);
        assert_eq!(
            result,
            Err(AccessControlError::Unauthorized {
                account: outsider,
                role: DEFAULT_ADMIN_ROLE,
            })
        );
    }
    assert_eq!(registry.get_role_member_count(&r).unwrap(), 0);
    assert!(registry.events().is_empty());
}

#[test]
fn test_non_admin_cannot_revoke() {
    let a = addr("A");
    let b = addr("B");
    let r = role("R");
    let mut registry = registry(&a);
    registry.grant_role(&r, &b, &a).unwrap();

    let result = registry.revoke_role(&r, &b, &b);
    assert!(matches!(result, Err(AccessControlError::Unauthorized { .. })));
    assert!(registry.has_role(&r, &b).unwrap());
}

#[test]
fn test_admin_transfer_is_immediate() {
    let a = addr("A");
    let c = addr("C");
    let r = role("R");
    let r2 = role("R2");
    let mut registry = registry(&a);

    registry.grant_role(&r2, &c, &a).unwrap();
    assert_eq!(registry.get_role_admin(&r).unwrap(), DEFAULT_ADMIN_ROLE);
    assert_eq!(registry.set_role_admin(&r, &r2).unwrap(), DEFAULT_ADMIN_ROLE);
    assert_eq!(registry.get_role_admin(&r).unwrap(), r2);

    assert!(matches!(
        registry.grant_role(&r, &addr("x"), &a),
        Err(AccessControlError::Unauthorized { .. })
    ));
    assert!(registry.grant_role(&r, &addr("x"), &c).unwrap());
    assert!(registry.revoke_role(&r, &addr("x"), &c).unwrap());
}

#[test]
fn test_end_to_end_scenario() {
    let a = addr("A");
    let b = addr("B");
    let c = addr("C");
    let d = addr("D");
    let r = role("R");
    let r2 = role("R2");

    let mut registry = AccessControlRegistry::new(MemoryStorage::new(), Vec::<Event>::new(), &a)
        .expect("Should bootstrap registry");
    registry.grant_role(&r, &b, &a).unwrap();
    registry.set_role_admin(&r, &r2).unwrap();
    registry.grant_role(&r2, &c, &a).unwrap();

    assert!(registry.grant_role(&r, &d, &c).unwrap());
    assert_eq!(
        registry.grant_role(&r, &addr("E"), &a),
        Err(AccessControlError::Unauthorized {
            account: a,
            role: r2,
        })
    );

    let kinds: Vec<&str> = registry.events().iter().map(Event::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "RoleGranted",
            "RoleGranted",
            "RoleAdminChanged",
            "RoleGranted",
            "RoleGranted",
        ]
    );
}

#[test]
fn test_second_bootstrap_rejected() {
    let a = addr("A");
    let (storage, events) = registry(&a).into_parts();
    let result = AccessControlRegistry::new(storage, events, &addr("B"));
    assert!(matches!(result, Err(AccessControlError::AlreadyInitialized)));
}

// ============================================================================
// Renounce
// ============================================================================

#[test]
fn test_renounce_for_other_fails() {
    let a = addr("A");
    let b = addr("B");
    let r = role("R");
    let mut registry = registry(&a);
    registry.grant_role(&r, &b, &a).unwrap();

    // even the admin cannot renounce on someone's behalf
    assert_eq!(registry.renounce_role(&r, &b, &a), Err(AccessControlError::SelfOnly));
    assert!(registry.renounce_role(&r, &b, &b).unwrap());
    assert!(!registry.has_role(&r, &b).unwrap());
}

#[test]
fn test_admin_can_renounce_default_admin() {
    let a = addr("A");
    let mut registry = registry(&a);
    assert!(registry.renounce_role(&DEFAULT_ADMIN_ROLE, &a, &a).unwrap());
    assert!(matches!(
        registry.grant_role(&role("R"), &a, &a),
        Err(AccessControlError::Unauthorized { .. })
    ));
}

// ============================================================================
// Enumeration
// ============================================================================

#[test]
fn test_enumeration_after_revoke() {
    let a = addr("A");
    let r = role("R");
    let mut registry = registry(&a);
    for name in ["X", "Y", "Z"] {
        registry.grant_role(&r, &addr(name), &a).unwrap();
    }
    registry.revoke_role(&r, &addr("Y"), &a).unwrap();

    assert_eq!(registry.get_role_member_count(&r).unwrap(), 2);
    let members: Vec<Address> = (0..2)
        .map(|i| registry.get_role_member(&r, i).unwrap())
        .collect();
    assert!(members.contains(&addr("X")));
    assert!(members.contains(&addr("Z")));
    assert_eq!(
        registry.get_role_member(&r, 2),
        Err(AccessControlError::IndexOutOfRange { index: 2, count: 2 })
    );
}

#[test]
fn test_enumeration_follows_renounce() {
    let a = addr("A");
    let r = role("R");
    let mut registry = registry(&a);

    registry.grant_role(&r, &a, &a).unwrap();
    assert_eq!(registry.get_role_member_count(&r).unwrap(), 1);
    assert!(registry.renounce_role(&r, &a, &a).unwrap());
    assert_eq!(registry.get_role_member_count(&r).unwrap(), 0);
    assert_eq!(
        registry.get_role_member(&r, 0),
        Err(AccessControlError::IndexOutOfRange { index: 0, count: 0 })
    );

    // Renouncing from the middle moves the last member into the freed slot
    for name in ["X", "Y", "Z"] {
        registry.grant_role(&r, &addr(name), &a).unwrap();
    }
    registry.renounce_role(&r, &addr("X"), &addr("X")).unwrap();
    assert_eq!(registry.get_role_members(&r).unwrap(), vec![addr("Z"), addr("Y")]);
    assert!(!registry.has_role(&r, &addr("X")).unwrap());
}

#[test]
fn test_zero_address_can_hold_and_lose_roles() {
    let a = addr("A");
    let r = role("R");
    let mut registry = registry(&a);

    assert!(registry.grant_role(&r, &Address::ZERO, &a).unwrap());
    assert!(registry.has_role(&r, &Address::ZERO).unwrap());
    assert_eq!(registry.get_role_members(&r).unwrap(), vec![Address::ZERO]);
    assert!(registry.revoke_role(&r, &Address::ZERO, &a).unwrap());
    assert_eq!(registry.get_role_member_count(&r).unwrap(), 0);
    assert_eq!(
        registry.events(),
        &vec![
            Event::RoleGranted {
                role: r,
                account: Address::ZERO,
                sender: a,
            },
            Event::RoleRevoked {
                role: r,
                account: Address::ZERO,
                sender: a,
            },
        ]
    );
}

#[test]
fn test_enumeration_keeps_insertion_order() {
    let a = addr("A");
    let r = role("R");
    let mut registry = registry(&a);
    let names = ["X", "Y", "Z"];
    for name in names {
        registry.grant_role(&r, &addr(name), &a).unwrap();
    }
    let expected: Vec<Address> = names.iter().map(|n| addr(n)).collect();
    assert_eq!(registry.get_role_members(&r).unwrap(), expected);
}

#[test]
fn test_check_role_guard() {
    let a = addr("A");
    let registry = registry(&a);
    assert!(registry.check_role(&DEFAULT_ADMIN_ROLE, &a).is_ok());
    let err = registry
        .check_role(&DEFAULT_ADMIN_ROLE, &addr("B"))
        .unwrap_err();
    assert!(err.to_string().contains("is missing role 0x"));
}

// ============================================================================
// Event delivery
// ============================================================================

#[tokio::test]
async fn test_events_delivered_in_order_through_channel() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let a = addr("A");
    let b = addr("B");
    let r = role("R");

    let mut registry = AccessControlRegistry::new(MemoryStorage::new(), tx, &a)
        .expect("Should bootstrap registry");
    registry.grant_role(&r, &b, &a).unwrap();
    registry.grant_role(&r, &b, &a).unwrap();
    registry.revoke_role(&r, &b, &a).unwrap();
    drop(registry);

    let mut received = Vec::new();
    while let Some(event) = rx.recv().await {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            Event::RoleGranted {
                role: DEFAULT_ADMIN_ROLE,
                account: a,
                sender: a,
            },
            Event::RoleGranted {
                role: r,
                account: b,
                sender: a,
            },
            Event::RoleRevoked {
                role: r,
                account: b,
                sender: a,
            },
        ]
    );
}
