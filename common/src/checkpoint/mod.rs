// Checkpoint Module
//
// Append-only per-key histories of (sequence, value) pairs:
// - Sequences never decrease within a series
// - Writes at the last recorded sequence overwrite that entry in place
// - Lookups binary-search for the latest entry at or before a sequence
//
// Snapshots reuse the same series with snapshot epochs as sequences.

mod error;
mod operations;
mod types;

pub use error::*;
pub use operations::*;
pub use types::*;

use crate::storage::StorageResult;

// ========================================
// Storage Trait (for dependency injection)
// ========================================

/// Abstract storage interface for checkpoint series
pub trait CheckpointStorage {
    fn get_checkpoint_count(&self, namespace: Namespace, key: &CheckpointKey) -> StorageResult<u32>;

    fn get_checkpoint(
        &self,
        namespace: Namespace,
        key: &CheckpointKey,
        index: u32,
    ) -> StorageResult<Option<Checkpoint>>;

    /// Append a new entry and bump the count
    fn push_checkpoint(
        &mut self,
        namespace: Namespace,
        key: &CheckpointKey,
        checkpoint: &Checkpoint,
    ) -> StorageResult<u32>;

    /// Overwrite the entry at `index` (used for same-sequence coalescing)
    fn set_checkpoint(
        &mut self,
        namespace: Namespace,
        key: &CheckpointKey,
        index: u32,
        checkpoint: &Checkpoint,
    ) -> StorageResult<()>;

    // Snapshot counter
    fn get_snapshot_id(&self) -> StorageResult<u64>;
    fn set_snapshot_id(&mut self, id: u64) -> StorageResult<()>;
}
