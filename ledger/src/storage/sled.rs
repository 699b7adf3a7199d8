//! Sled implementation of the ledger storage traits
//!
//! Layout (one tree per concern, 4-byte key prefixes):
//! - roles: role configs, member slots and member positions
//! - checkpoints: series counts and entries
//! - token: balances, supply and delegates
//! - extra: singletons (snapshot counter, init marker)
//!
//! Writes touching several keys go through one `sled::Batch` on a single
//! tree, so a crash never leaves a half-applied member swap or append.

use std::path::Path;

use log::{debug, trace};
use sled::{Batch, Db, Tree};
use trc_common::{
    access_control::{AccessControlStorage, RoleConfig, RoleId},
    checkpoint::{Checkpoint, CheckpointKey, CheckpointStorage, Namespace},
    config::{
        BALANCE_PREFIX, CHECKPOINT_COUNT_PREFIX, CHECKPOINT_PREFIX, DELEGATE_PREFIX,
        INITIALIZED_KEY, ROLE_CONFIG_PREFIX, ROLE_MEMBER_PREFIX, ROLE_POSITION_PREFIX,
        SNAPSHOT_COUNTER_KEY, TOTAL_SUPPLY_KEY,
    },
    crypto::Address,
    serializer::Serializer,
    storage::{StorageError, StorageResult},
    token::TokenStorage,
};

use crate::error::LedgerResult;

const ROLES_TREE: &str = "roles";
const CHECKPOINTS_TREE: &str = "checkpoints";
const TOKEN_TREE: &str = "token";
const EXTRA_TREE: &str = "extra";

pub struct SledStorage {
    db: Db,
    roles: Tree,
    checkpoints: Tree,
    token: Tree,
    extra: Tree,
    flush_on_write: bool,
}

// sled errors cannot be converted with `?` outside this crate
fn backend(err: sled::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

impl SledStorage {
    /// Open (or create) a database directory
    pub fn open<P: AsRef<Path>>(path: P, flush_on_write: bool) -> LedgerResult<Self> {
        debug!("opening sled storage at {}", path.as_ref().display());
        let db = sled::open(path)?;
        Self::from_db(db, flush_on_write)
    }

    /// Database removed on drop, for tests
    pub fn temporary() -> LedgerResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db, false)
    }

    fn from_db(db: Db, flush_on_write: bool) -> LedgerResult<Self> {
        Ok(Self {
            roles: db.open_tree(ROLES_TREE)?,
            checkpoints: db.open_tree(CHECKPOINTS_TREE)?,
            token: db.open_tree(TOKEN_TREE)?,
            extra: db.open_tree(EXTRA_TREE)?,
            db,
            flush_on_write,
        })
    }

    /// Force everything written so far to disk
    pub fn flush(&self) -> LedgerResult<usize> {
        Ok(self.db.flush()?)
    }

    fn after_write(&self) -> StorageResult<()> {
        if self.flush_on_write {
            self.db.flush().map_err(backend)?;
        }
        Ok(())
    }

    fn load_optional_from_disk<T: Serializer>(tree: &Tree, key: &[u8]) -> StorageResult<Option<T>> {
        match tree.get(key).map_err(backend)? {
            Some(bytes) => T::from_bytes(&bytes)
                .map(Some)
                .map_err(|e| StorageError::corrupted(key, e)),
            None => Ok(None),
        }
    }

    fn insert_into_disk<T: Serializer>(&self, tree: &Tree, key: &[u8], value: &T) -> StorageResult<()> {
        tree.insert(key, value.to_bytes()).map_err(backend)?;
        self.after_write()
    }

    fn apply_batch(&self, tree: &Tree, batch: Batch) -> StorageResult<()> {
        tree.apply_batch(batch).map_err(backend)?;
        self.after_write()
    }

    // ===== Key builders =====

    fn role_config_key(role: &RoleId) -> Vec<u8> {
        let mut key = Vec::with_capacity(ROLE_CONFIG_PREFIX.len() + 32);
        key.extend_from_slice(ROLE_CONFIG_PREFIX);
        key.extend_from_slice(role);
        key
    }

    fn role_member_key(role: &RoleId, index: u32) -> Vec<u8> {
        let mut key = Vec::with_capacity(ROLE_MEMBER_PREFIX.len() + 32 + 4);
        key.extend_from_slice(ROLE_MEMBER_PREFIX);
        key.extend_from_slice(role);
        key.extend_from_slice(&index.to_be_bytes());
        key
    }

    fn role_position_key(role: &RoleId, account: &Address) -> Vec<u8> {
        let mut key = Vec::with_capacity(ROLE_POSITION_PREFIX.len() + 32 + 32);
        key.extend_from_slice(ROLE_POSITION_PREFIX);
        key.extend_from_slice(role);
        key.extend_from_slice(account.as_bytes());
        key
    }

    fn checkpoint_count_key(namespace: Namespace, series: &CheckpointKey) -> Vec<u8> {
        let mut key = Vec::with_capacity(CHECKPOINT_COUNT_PREFIX.len() + 1 + series.size());
        key.extend_from_slice(CHECKPOINT_COUNT_PREFIX);
        key.push(namespace.to_byte());
        key.extend_from_slice(&series.to_bytes());
        key
    }

    fn checkpoint_key(namespace: Namespace, series: &CheckpointKey, index: u32) -> Vec<u8> {
        let mut key = Vec::with_capacity(CHECKPOINT_PREFIX.len() + 1 + series.size() + 4);
        key.extend_from_slice(CHECKPOINT_PREFIX);
        key.push(namespace.to_byte());
        key.extend_from_slice(&series.to_bytes());
        key.extend_from_slice(&index.to_be_bytes());
        key
    }

    fn account_key(prefix: &[u8], account: &Address) -> Vec<u8> {
        let mut key = Vec::with_capacity(prefix.len() + 32);
        key.extend_from_slice(prefix);
        key.extend_from_slice(account.as_bytes());
        key
    }

    fn load_role_config(&self, role: &RoleId) -> StorageResult<Option<RoleConfig>> {
        Self::load_optional_from_disk(&self.roles, &Self::role_config_key(role))
    }
}

impl AccessControlStorage for SledStorage {
    fn get_role_admin(&self, role: &RoleId) -> StorageResult<Option<RoleId>> {
        Ok(self.load_role_config(role)?.map(|config| config.admin_role))
    }

    fn set_role_admin(&mut self, role: &RoleId, admin_role: &RoleId) -> StorageResult<()> {
        if log::log_enabled!(log::Level::Trace) {
            trace!(
                "set role admin {} -> {}",
                hex::encode(role),
                hex::encode(admin_role)
            );
        }

        let mut config = self.load_role_config(role)?.unwrap_or_default();
        config.admin_role = *admin_role;
        self.insert_into_disk(&self.roles, &Self::role_config_key(role), &config)
    }

    fn has_role_member(&self, role: &RoleId, account: &Address) -> StorageResult<bool> {
        self.roles
            .contains_key(Self::role_position_key(role, account))
            .map_err(backend)
    }

    fn role_member_count(&self, role: &RoleId) -> StorageResult<u32> {
        Ok(self
            .load_role_config(role)?
            .map(|config| config.member_count)
            .unwrap_or(0))
    }

    fn role_member_at(&self, role: &RoleId, index: u32) -> StorageResult<Option<Address>> {
        Self::load_optional_from_disk(&self.roles, &Self::role_member_key(role, index))
    }

    fn add_role_member(&mut self, role: &RoleId, account: &Address) -> StorageResult<bool> {
        if self.has_role_member(role, account)? {
            return Ok(false);
        }

        let mut config = self.load_role_config(role)?.unwrap_or_default();
        let index = config.member_count;
        config.member_count = index.checked_add(1).ok_or(StorageError::CountOverflow)?;

        if log::log_enabled!(log::Level::Trace) {
            trace!("add member {} to role {} at {}", account, hex::encode(role), index);
        }

        let mut batch = Batch::default();
        batch.insert(Self::role_member_key(role, index), account.as_bytes().to_vec());
        batch.insert(Self::role_position_key(role, account), index.to_bytes());
        batch.insert(Self::role_config_key(role), config.to_bytes());
        self.apply_batch(&self.roles, batch)?;
        Ok(true)
    }

    fn remove_role_member(&mut self, role: &RoleId, account: &Address) -> StorageResult<bool> {
        let position_key = Self::role_position_key(role, account);
        let Some(index) = Self::load_optional_from_disk::<u32>(&self.roles, &position_key)? else {
            return Ok(false);
        };

        let mut config = self.load_role_config(role)?.unwrap_or_default();
        let last = config
            .member_count
            .checked_sub(1)
            .ok_or_else(|| StorageError::Backend(format!("role {} has no members", hex::encode(role))))?;

        if log::log_enabled!(log::Level::Trace) {
            trace!("remove member {} from role {} at {}", account, hex::encode(role), index);
        }

        let mut batch = Batch::default();
        // Move the last member into the freed slot
        if index != last {
            let moved: Address = Self::load_optional_from_disk(&self.roles, &Self::role_member_key(role, last))?
                .ok_or_else(|| StorageError::Backend(format!("missing member slot {}", last)))?;
            batch.insert(Self::role_member_key(role, index), moved.as_bytes().to_vec());
            batch.insert(Self::role_position_key(role, &moved), index.to_bytes());
        }
        batch.remove(Self::role_member_key(role, last));
        batch.remove(position_key);
        config.member_count = last;
        batch.insert(Self::role_config_key(role), config.to_bytes());

        self.apply_batch(&self.roles, batch)?;
        Ok(true)
    }

    fn is_initialized(&self) -> StorageResult<bool> {
        Ok(Self::load_optional_from_disk::<bool>(&self.extra, INITIALIZED_KEY)?.unwrap_or(false))
    }

    fn set_initialized(&mut self) -> StorageResult<()> {
        self.insert_into_disk(&self.extra, INITIALIZED_KEY, &true)
    }
}

impl CheckpointStorage for SledStorage {
    fn get_checkpoint_count(&self, namespace: Namespace, key: &CheckpointKey) -> StorageResult<u32> {
        Ok(Self::load_optional_from_disk(
            &self.checkpoints,
            &Self::checkpoint_count_key(namespace, key),
        )?
        .unwrap_or(0))
    }

    fn get_checkpoint(
        &self,
        namespace: Namespace,
        key: &CheckpointKey,
        index: u32,
    ) -> StorageResult<Option<Checkpoint>> {
        Self::load_optional_from_disk(&self.checkpoints, &Self::checkpoint_key(namespace, key, index))
    }

    fn push_checkpoint(
        &mut self,
        namespace: Namespace,
        key: &CheckpointKey,
        checkpoint: &Checkpoint,
    ) -> StorageResult<u32> {
        let index = self.get_checkpoint_count(namespace, key)?;
        let count = index.checked_add(1).ok_or(StorageError::CountOverflow)?;

        if log::log_enabled!(log::Level::Trace) {
            trace!(
                "push checkpoint {:?}/{:?} #{}: seq={} value={}",
                namespace,
                key,
                index,
                checkpoint.sequence,
                checkpoint.value
            );
        }

        let mut batch = Batch::default();
        batch.insert(Self::checkpoint_key(namespace, key, index), checkpoint.to_bytes());
        batch.insert(Self::checkpoint_count_key(namespace, key), count.to_bytes());
        self.apply_batch(&self.checkpoints, batch)?;
        Ok(count)
    }

    fn set_checkpoint(
        &mut self,
        namespace: Namespace,
        key: &CheckpointKey,
        index: u32,
        checkpoint: &Checkpoint,
    ) -> StorageResult<()> {
        if index >= self.get_checkpoint_count(namespace, key)? {
            return Err(StorageError::Backend(format!("no checkpoint at index {}", index)));
        }
        self.insert_into_disk(
            &self.checkpoints,
            &Self::checkpoint_key(namespace, key, index),
            checkpoint,
        )
    }

    fn get_snapshot_id(&self) -> StorageResult<u64> {
        Ok(Self::load_optional_from_disk(&self.extra, SNAPSHOT_COUNTER_KEY)?.unwrap_or(0))
    }

    fn set_snapshot_id(&mut self, id: u64) -> StorageResult<()> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("set snapshot id {}", id);
        }
        self.insert_into_disk(&self.extra, SNAPSHOT_COUNTER_KEY, &id)
    }
}

impl TokenStorage for SledStorage {
    fn get_balance(&self, account: &Address) -> StorageResult<u64> {
        Ok(Self::load_optional_from_disk(&self.token, &Self::account_key(BALANCE_PREFIX, account))?
            .unwrap_or(0))
    }

    fn set_balance(&mut self, account: &Address, balance: u64) -> StorageResult<()> {
        self.insert_into_disk(&self.token, &Self::account_key(BALANCE_PREFIX, account), &balance)
    }

    fn get_total_supply(&self) -> StorageResult<u64> {
        Ok(Self::load_optional_from_disk(&self.token, TOTAL_SUPPLY_KEY)?.unwrap_or(0))
    }

    fn set_total_supply(&mut self, supply: u64) -> StorageResult<()> {
        self.insert_into_disk(&self.token, TOTAL_SUPPLY_KEY, &supply)
    }

    fn get_delegate(&self, account: &Address) -> StorageResult<Option<Address>> {
        Self::load_optional_from_disk(&self.token, &Self::account_key(DELEGATE_PREFIX, account))
    }

    fn set_delegate(&mut self, account: &Address, delegate: &Address) -> StorageResult<()> {
        self.insert_into_disk(&self.token, &Self::account_key(DELEGATE_PREFIX, account), delegate)
    }
}
