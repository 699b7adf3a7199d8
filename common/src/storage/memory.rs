use std::collections::HashMap;

use indexmap::IndexSet;
use log::trace;

use super::{StorageError, StorageResult};
use crate::access_control::{AccessControlStorage, RoleId};
use crate::checkpoint::{Checkpoint, CheckpointKey, CheckpointStorage, Namespace};
use crate::crypto::Address;
use crate::token::TokenStorage;

#[derive(Debug, Default, Clone)]
struct RoleRecord {
    admin_role: Option<RoleId>,
    members: IndexSet<Address>,
}

/// Volatile store for tests and short-lived hosts
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    roles: HashMap<RoleId, RoleRecord>,
    initialized: bool,
    series: HashMap<(Namespace, CheckpointKey), Vec<Checkpoint>>,
    snapshot_id: u64,
    balances: HashMap<Address, u64>,
    total_supply: u64,
    delegates: HashMap<Address, Address>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn series(&self, namespace: Namespace, key: &CheckpointKey) -> Option<&Vec<Checkpoint>> {
        self.series.get(&(namespace, *key))
    }
}

impl AccessControlStorage for MemoryStorage {
    fn get_role_admin(&self, role: &RoleId) -> StorageResult<Option<RoleId>> {
        Ok(self.roles.get(role).and_then(|record| record.admin_role))
    }

    fn set_role_admin(&mut self, role: &RoleId, admin_role: &RoleId) -> StorageResult<()> {
        self.roles.entry(*role).or_default().admin_role = Some(*admin_role);
        Ok(())
    }

    fn has_role_member(&self, role: &RoleId, account: &Address) -> StorageResult<bool> {
        Ok(self
            .roles
            .get(role)
            .is_some_and(|record| record.members.contains(account)))
    }

    fn role_member_count(&self, role: &RoleId) -> StorageResult<u32> {
        let count = self.roles.get(role).map_or(0, |record| record.members.len());
        u32::try_from(count).map_err(|_| StorageError::CountOverflow)
    }

    fn role_member_at(&self, role: &RoleId, index: u32) -> StorageResult<Option<Address>> {
        Ok(self
            .roles
            .get(role)
            .and_then(|record| record.members.get_index(index as usize))
            .copied())
    }

    fn add_role_member(&mut self, role: &RoleId, account: &Address) -> StorageResult<bool> {
        let record = self.roles.entry(*role).or_default();
        if record.members.contains(account) {
            return Ok(false);
        }
        if record.members.len() >= u32::MAX as usize {
            return Err(StorageError::CountOverflow);
        }
        Ok(record.members.insert(*account))
    }

    fn remove_role_member(&mut self, role: &RoleId, account: &Address) -> StorageResult<bool> {
        Ok(self
            .roles
            .get_mut(role)
            .is_some_and(|record| record.members.swap_remove(account)))
    }

    fn is_initialized(&self) -> StorageResult<bool> {
        Ok(self.initialized)
    }

    fn set_initialized(&mut self) -> StorageResult<()> {
        self.initialized = true;
        Ok(())
    }
}

impl CheckpointStorage for MemoryStorage {
    fn get_checkpoint_count(&self, namespace: Namespace, key: &CheckpointKey) -> StorageResult<u32> {
        let count = self.series(namespace, key).map_or(0, Vec::len);
        u32::try_from(count).map_err(|_| StorageError::CountOverflow)
    }

    fn get_checkpoint(
        &self,
        namespace: Namespace,
        key: &CheckpointKey,
        index: u32,
    ) -> StorageResult<Option<Checkpoint>> {
        Ok(self
            .series(namespace, key)
            .and_then(|series| series.get(index as usize))
            .copied())
    }

    fn push_checkpoint(
        &mut self,
        namespace: Namespace,
        key: &CheckpointKey,
        checkpoint: &Checkpoint,
    ) -> StorageResult<u32> {
        let series = self.series.entry((namespace, *key)).or_default();
        let count = u32::try_from(series.len())
            .ok()
            .and_then(|len| len.checked_add(1))
            .ok_or(StorageError::CountOverflow)?;
        series.push(*checkpoint);
        Ok(count)
    }

    fn set_checkpoint(
        &mut self,
        namespace: Namespace,
        key: &CheckpointKey,
        index: u32,
        checkpoint: &Checkpoint,
    ) -> StorageResult<()> {
        let slot = self
            .series
            .get_mut(&(namespace, *key))
            .and_then(|series| series.get_mut(index as usize))
            .ok_or_else(|| StorageError::Backend(format!("no checkpoint at index {}", index)))?;
        *slot = *checkpoint;
        Ok(())
    }

    fn get_snapshot_id(&self) -> StorageResult<u64> {
        Ok(self.snapshot_id)
    }

    fn set_snapshot_id(&mut self, id: u64) -> StorageResult<()> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("snapshot id {} -> {}", self.snapshot_id, id);
        }
        self.snapshot_id = id;
        Ok(())
    }
}

impl TokenStorage for MemoryStorage {
    fn get_balance(&self, account: &Address) -> StorageResult<u64> {
        Ok(self.balances.get(account).copied().unwrap_or(0))
    }

    fn set_balance(&mut self, account: &Address, balance: u64) -> StorageResult<()> {
        if balance == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, balance);
        }
        Ok(())
    }

    fn get_total_supply(&self) -> StorageResult<u64> {
        Ok(self.total_supply)
    }

    fn set_total_supply(&mut self, supply: u64) -> StorageResult<()> {
        self.total_supply = supply;
        Ok(())
    }

    fn get_delegate(&self, account: &Address) -> StorageResult<Option<Address>> {
        Ok(self.delegates.get(account).copied())
    }

    fn set_delegate(&mut self, account: &Address, delegate: &Address) -> StorageResult<()> {
        self.delegates.insert(*account, *delegate);
        Ok(())
    }
}
