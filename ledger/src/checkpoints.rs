//! Host-facing checkpoint ledger over one namespace of a store.

use log::debug;
use trc_common::{
    checkpoint::{self, Checkpoint, CheckpointKey, CheckpointResult, CheckpointStorage, Namespace},
    context::SequenceProvider,
};

pub struct CheckpointLedger<S, C> {
    storage: S,
    clock: C,
    namespace: Namespace,
}

impl<S: CheckpointStorage, C: SequenceProvider> CheckpointLedger<S, C> {
    pub fn new(storage: S, clock: C) -> Self {
        Self::with_namespace(storage, clock, Namespace::Values)
    }

    pub fn with_namespace(storage: S, clock: C, namespace: Namespace) -> Self {
        Self {
            storage,
            clock,
            namespace,
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Sequence number supplied by the host right now
    pub fn current_sequence(&self) -> u64 {
        self.clock.current_sequence()
    }

    // ===== Recording =====

    /// Append or coalesce `value` at `sequence`
    ///
    /// # Returns
    /// * `Err(CheckpointError::NonMonotonicSequence)` if `sequence` is before the last entry
    pub fn record_value(&mut self, key: &CheckpointKey, sequence: u64, value: u64) -> CheckpointResult<()> {
        checkpoint::record_value(&mut self.storage, self.namespace, key, sequence, value)
    }

    /// `record_value` at the provider's current sequence
    pub fn record_current(&mut self, key: &CheckpointKey, value: u64) -> CheckpointResult<()> {
        let sequence = self.clock.current_sequence();
        self.record_value(key, sequence, value)
    }

    /// Record into the open snapshot epoch
    pub fn record_for_snapshot(&mut self, key: &CheckpointKey, value: u64) -> CheckpointResult<()> {
        checkpoint::record_for_snapshot(&mut self.storage, self.namespace, key, value)
    }

    // ===== Queries =====

    /// Value at a strictly past `sequence`
    ///
    /// # Returns
    /// * `Err(CheckpointError::FutureQuery)` if `sequence >= current_sequence()`
    pub fn value_at(&self, key: &CheckpointKey, sequence: u64) -> CheckpointResult<u64> {
        checkpoint::value_at(
            &self.storage,
            self.namespace,
            key,
            sequence,
            self.clock.current_sequence(),
        )
    }

    pub fn current_value(&self, key: &CheckpointKey) -> CheckpointResult<u64> {
        checkpoint::current_value(&self.storage, self.namespace, key)
    }

    pub fn num_checkpoints(&self, key: &CheckpointKey) -> CheckpointResult<u32> {
        checkpoint::num_checkpoints(&self.storage, self.namespace, key)
    }

    pub fn checkpoint_at(&self, key: &CheckpointKey, index: u32) -> CheckpointResult<Checkpoint> {
        checkpoint::checkpoint_at(&self.storage, self.namespace, key, index)
    }

    // ===== Snapshots =====

    pub fn create_snapshot(&mut self) -> CheckpointResult<u64> {
        let id = checkpoint::create_snapshot(&mut self.storage)?;
        debug!("created snapshot {}", id);
        Ok(id)
    }

    pub fn current_snapshot_id(&self) -> CheckpointResult<u64> {
        checkpoint::current_snapshot_id(&self.storage)
    }

    /// Value as of snapshot `id`, see `record_for_snapshot`
    pub fn value_at_snapshot(&self, key: &CheckpointKey, id: u64) -> CheckpointResult<u64> {
        checkpoint::value_at_snapshot(&self.storage, self.namespace, key, id)
    }

    // ===== Accessors =====

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
