//! Sled Storage Tests
//!
//! Test groups:
//! - Registry state survives reopening the database
//! - Enumeration stays in sync after renounce
//! - Checkpoint series and snapshot ids survive reopening
//! - Token opened from configuration, redeploy avoided on reopen

use tempdir::TempDir;
use trc_common::{
    access_control::{role_id_from_name, MINTER_ROLE},
    checkpoint::CheckpointKey,
    context::ManualClock,
    crypto::Address,
    event::{Event, NullSink},
};
use trc_ledger::{
    open_token, AccessControlRegistry, CheckpointLedger, LedgerConfig, SledStorage,
    StorageBackend,
};

fn addr(name: &str) -> Address {
    Address::from_name(name)
}

#[test]
fn test_registry_persists_roles() -> anyhow::Result<()> {
    let dir = TempDir::new("trc_registry")?;
    let a = addr("A");
    let r = role_id_from_name("R");
    let r2 = role_id_from_name("R2");

    {
        let storage = SledStorage::open(dir.path(), true)?;
        let mut registry = AccessControlRegistry::new(storage, NullSink, &a)?;
        for name in ["X", "Y", "Z"] {
            registry.grant_role(&r, &addr(name), &a)?;
        }
        registry.revoke_role(&r, &addr("X"), &a)?;
        registry.set_role_admin(&r, &r2)?;
    }

    let storage = SledStorage::open(dir.path(), false)?;
    let mut registry = AccessControlRegistry::open(storage, Vec::<Event>::new());
    assert!(registry.is_initialized()?);
    assert_eq!(registry.get_role_admin(&r)?, r2);
    assert_eq!(registry.get_role_member_count(&r)?, 2);
    let mut members = registry.get_role_members(&r)?;
    members.sort();
    let mut expected = vec![addr("Y"), addr("Z")];
    expected.sort();
    assert_eq!(members, expected);

    // A lost power over R when its admin changed
    assert!(registry.grant_role(&r, &addr("W"), &a).is_err());
    Ok(())
}

#[test]
fn test_enumeration_follows_renounce() -> anyhow::Result<()> {
    let dir = TempDir::new("trc_renounce")?;
    let a = addr("A");
    let r = role_id_from_name("R");

    {
        let storage = SledStorage::open(dir.path(), true)?;
        let mut registry = AccessControlRegistry::new(storage, Vec::<Event>::new(), &a)?;
        registry.grant_role(&r, &a, &a)?;
        assert_eq!(registry.get_role_member_count(&r)?, 1);
        assert!(registry.renounce_role(&r, &a, &a)?);
        assert_eq!(registry.get_role_member_count(&r)?, 0);
        assert!(registry.get_role_member(&r, 0).is_err());

        for name in ["X", "Y", "Z"] {
            registry.grant_role(&r, &addr(name), &a)?;
        }
        registry.renounce_role(&r, &addr("X"), &addr("X"))?;
    }

    let storage = SledStorage::open(dir.path(), false)?;
    let registry = AccessControlRegistry::open(storage, Vec::<Event>::new());
    assert_eq!(registry.get_role_member_count(&r)?, 2);
    assert_eq!(registry.get_role_members(&r)?, vec![addr("Z"), addr("Y")]);
    assert!(!registry.has_role(&r, &addr("X"))?);
    assert!(!registry.has_role(&r, &a)?);
    Ok(())
}

#[test]
fn test_reopened_registry_cannot_bootstrap_again() -> anyhow::Result<()> {
    let dir = TempDir::new("trc_bootstrap")?;
    {
        let storage = SledStorage::open(dir.path(), true)?;
        AccessControlRegistry::new(storage, NullSink, &addr("A"))?;
    }
    let storage = SledStorage::open(dir.path(), false)?;
    assert!(AccessControlRegistry::new(storage, NullSink, &addr("B")).is_err());
    Ok(())
}

#[test]
fn test_checkpoints_persist() -> anyhow::Result<()> {
    let dir = TempDir::new("trc_checkpoints")?;
    let key = CheckpointKey::Account(addr("alice"));

    {
        let storage = SledStorage::open(dir.path(), false)?;
        let mut ledger = CheckpointLedger::new(storage, ManualClock::new(5));
        for (sequence, value) in [(1, 100), (2, 90), (2, 80), (4, 100)] {
            ledger.record_value(&key, sequence, value)?;
        }
        ledger.create_snapshot()?;
        ledger.into_storage().flush()?;
    }

    let storage = SledStorage::open(dir.path(), false)?;
    let ledger = CheckpointLedger::new(storage, ManualClock::new(5));
    assert_eq!(ledger.num_checkpoints(&key)?, 3);
    assert_eq!(ledger.value_at(&key, 2)?, 80);
    assert_eq!(ledger.value_at(&key, 3)?, 80);
    assert_eq!(ledger.value_at(&key, 0)?, 0);
    assert_eq!(ledger.current_snapshot_id()?, 1);
    Ok(())
}

#[test]
fn test_open_token_from_config() -> anyhow::Result<()> {
    let dir = TempDir::new("trc_token")?;
    let owner = addr("owner");
    let bob = addr("bob");

    let mut config = LedgerConfig::default();
    config.storage = StorageBackend::Sled {
        path: dir.path().join("db"),
        flush_on_write: true,
    };
    config.token.symbol = "GOV".to_string();

    {
        let mut token = open_token(&config, Vec::<Event>::new(), ManualClock::new(1), &owner)?;
        token.mint(&owner, 500, &owner)?;
        token.delegate(&owner, &owner)?;
        token.snapshot(&owner)?;
        token.transfer(&bob, 200, &owner)?;
        let kinds: Vec<&str> = token.events().iter().map(Event::kind).collect();
        assert_eq!(
            kinds,
            vec![
                // deployment: default admin, minter, burner, snapshot
                "RoleGranted",
                "RoleGranted",
                "RoleGranted",
                "RoleGranted",
                "Transfer",
                "DelegateChanged",
                "DelegateVotesChanged",
                "Snapshot",
                "Transfer",
                "DelegateVotesChanged",
            ]
        );
    }

    // deployer argument is ignored for an existing store
    let token = open_token(&config, Vec::<Event>::new(), ManualClock::new(3), &bob)?;
    assert!(token.is_admin(&owner)?);
    assert!(!token.is_admin(&bob)?);
    assert!(token.has_role(&MINTER_ROLE, &owner)?);
    assert_eq!(token.symbol(), "GOV");
    assert_eq!(token.balance_of(&owner)?, 300);
    assert_eq!(token.balance_of_at(&owner, 1)?, 500);
    assert_eq!(token.balance_of_at(&bob, 1)?, 0);
    assert_eq!(token.get_past_votes(&owner, 1)?, 300);
    assert_eq!(token.get_past_total_supply(2)?, 500);
    Ok(())
}

#[test]
fn test_open_token_in_memory() -> anyhow::Result<()> {
    let owner = addr("owner");
    let mut token = open_token(&LedgerConfig::default(), NullSink, ManualClock::new(1), &owner)?;
    token.mint(&owner, 1, &owner)?;
    assert_eq!(token.total_supply()?, 1);
    Ok(())
}
