mod sled;

pub use self::sled::SledStorage;
pub use trc_common::storage::{LedgerStorage, MemoryStorage, StorageError, StorageResult};

use log::info;
use trc_common::{
    access_control::{AccessControlStorage, RoleId},
    checkpoint::{Checkpoint, CheckpointKey, CheckpointStorage, Namespace},
    crypto::Address,
    token::TokenStorage,
};

use crate::{config::StorageBackend, error::LedgerResult};

/// Storage selected at runtime from the configuration
pub enum Backend {
    Memory(MemoryStorage),
    Sled(SledStorage),
}

impl Backend {
    pub fn open(config: &StorageBackend) -> LedgerResult<Self> {
        match config {
            StorageBackend::Memory => {
                info!("Using in-memory storage");
                Ok(Backend::Memory(MemoryStorage::new()))
            }
            StorageBackend::Sled {
                path,
                flush_on_write,
            } => {
                info!("Using sled storage at {}", path.display());
                Ok(Backend::Sled(SledStorage::open(path, *flush_on_write)?))
            }
        }
    }

    /// Flush pending writes, a no-op for memory storage
    pub fn flush(&self) -> LedgerResult<()> {
        if let Backend::Sled(storage) = self {
            storage.flush()?;
        }
        Ok(())
    }
}

macro_rules! dispatch {
    ($self:ident, $storage:ident => $body:expr) => {
        match $self {
            Backend::Memory($storage) => $body,
            Backend::Sled($storage) => $body,
        }
    };
}

impl AccessControlStorage for Backend {
    fn get_role_admin(&self, role: &RoleId) -> StorageResult<Option<RoleId>> {
        dispatch!(self, s => s.get_role_admin(role))
    }

    fn set_role_admin(&mut self, role: &RoleId, admin_role: &RoleId) -> StorageResult<()> {
        dispatch!(self, s => s.set_role_admin(role, admin_role))
    }

    fn has_role_member(&self, role: &RoleId, account: &Address) -> StorageResult<bool> {
        dispatch!(self, s => s.has_role_member(role, account))
    }

    fn role_member_count(&self, role: &RoleId) -> StorageResult<u32> {
        dispatch!(self, s => s.role_member_count(role))
    }

    fn role_member_at(&self, role: &RoleId, index: u32) -> StorageResult<Option<Address>> {
        dispatch!(self, s => s.role_member_at(role, index))
    }

    fn add_role_member(&mut self, role: &RoleId, account: &Address) -> StorageResult<bool> {
        dispatch!(self, s => s.add_role_member(role, account))
    }

    fn remove_role_member(&mut self, role: &RoleId, account: &Address) -> StorageResult<bool> {
        dispatch!(self, s => s.remove_role_member(role, account))
    }

    fn is_initialized(&self) -> StorageResult<bool> {
        dispatch!(self, s => s.is_initialized())
    }

    fn set_initialized(&mut self) -> StorageResult<()> {
        dispatch!(self, s => s.set_initialized())
    }
}

impl CheckpointStorage for Backend {
    fn get_checkpoint_count(&self, namespace: Namespace, key: &CheckpointKey) -> StorageResult<u32> {
        dispatch!(self, s => s.get_checkpoint_count(namespace, key))
    }

    fn get_checkpoint(
        &self,
        namespace: Namespace,
        key: &CheckpointKey,
        index: u32,
    ) -> StorageResult<Option<Checkpoint>> {
        dispatch!(self, s => s.get_checkpoint(namespace, key, index))
    }

    fn push_checkpoint(
        &mut self,
        namespace: Namespace,
        key: &CheckpointKey,
        checkpoint: &Checkpoint,
    ) -> StorageResult<u32> {
        dispatch!(self, s => s.push_checkpoint(namespace, key, checkpoint))
    }

    fn set_checkpoint(
        &mut self,
        namespace: Namespace,
        key: &CheckpointKey,
        index: u32,
        checkpoint: &Checkpoint,
    ) -> StorageResult<()> {
        dispatch!(self, s => s.set_checkpoint(namespace, key, index, checkpoint))
    }

    fn get_snapshot_id(&self) -> StorageResult<u64> {
        dispatch!(self, s => s.get_snapshot_id())
    }

    fn set_snapshot_id(&mut self, id: u64) -> StorageResult<()> {
        dispatch!(self, s => s.set_snapshot_id(id))
    }
}

impl TokenStorage for Backend {
    fn get_balance(&self, account: &Address) -> StorageResult<u64> {
        dispatch!(self, s => s.get_balance(account))
    }

    fn set_balance(&mut self, account: &Address, balance: u64) -> StorageResult<()> {
        dispatch!(self, s => s.set_balance(account, balance))
    }

    fn get_total_supply(&self) -> StorageResult<u64> {
        dispatch!(self, s => s.get_total_supply())
    }

    fn set_total_supply(&mut self, supply: u64) -> StorageResult<()> {
        dispatch!(self, s => s.set_total_supply(supply))
    }

    fn get_delegate(&self, account: &Address) -> StorageResult<Option<Address>> {
        dispatch!(self, s => s.get_delegate(account))
    }

    fn set_delegate(&mut self, account: &Address, delegate: &Address) -> StorageResult<()> {
        dispatch!(self, s => s.set_delegate(account, delegate))
    }
}
