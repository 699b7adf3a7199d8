// Checkpoint Operations

use log::trace;

use super::{Checkpoint, CheckpointError, CheckpointKey, CheckpointResult, CheckpointStorage, Namespace};
use crate::config::FIRST_SNAPSHOT_ID;

// ========================================
// Recording
// ========================================

/// Ensure `sequence` may be recorded for `key` without writing anything
///
/// # Returns
/// * `Ok(())` if the series is empty or its last sequence is `<= sequence`
/// * `Err(CheckpointError::NonMonotonicSequence)` otherwise
pub fn ensure_recordable<S: CheckpointStorage + ?Sized>(
    storage: &S,
    namespace: Namespace,
    key: &CheckpointKey,
    sequence: u64,
) -> CheckpointResult<()> {
    if let Some(last) = latest_checkpoint(storage, namespace, key)? {
        if sequence < last.sequence {
            return Err(CheckpointError::NonMonotonicSequence {
                last: last.sequence,
                attempted: sequence,
            });
        }
    }
    Ok(())
}

/// Record `value` for `key` at `sequence`
///
/// # Arguments
/// * `storage` - Storage backend
/// * `namespace` - History the series belongs to
/// * `key` - Tracked key
/// * `sequence` - Sequence of the change, not below the last recorded one
/// * `value` - New value
///
/// # Returns
/// * `Ok(())` on success (appended, or coalesced into the last entry)
/// * `Err(CheckpointError::NonMonotonicSequence)` if `sequence` goes backwards
pub fn record_value<S: CheckpointStorage + ?Sized>(
    storage: &mut S,
    namespace: Namespace,
    key: &CheckpointKey,
    sequence: u64,
    value: u64,
) -> CheckpointResult<()> {
    // 1. Compare with the last entry only, series are never reordered
    let count = storage.get_checkpoint_count(namespace, key)?;
    if count > 0 {
        let last_index = count - 1;
        let last = storage
            .get_checkpoint(namespace, key, last_index)?
            .ok_or(CheckpointError::NotFound {
                index: last_index,
                count,
            })?;

        if sequence < last.sequence {
            return Err(CheckpointError::NonMonotonicSequence {
                last: last.sequence,
                attempted: sequence,
            });
        }

        // 2. Same tick: overwrite in place
        if sequence == last.sequence {
            if log::log_enabled!(log::Level::Trace) {
                trace!(
                    "coalesce checkpoint {:?}/{:?} at {}: {} -> {}",
                    namespace,
                    key,
                    sequence,
                    last.value,
                    value
                );
            }
            storage.set_checkpoint(namespace, key, last_index, &Checkpoint::new(sequence, value))?;
            return Ok(());
        }
    }

    // 3. Append
    if log::log_enabled!(log::Level::Trace) {
        trace!(
            "append checkpoint {:?}/{:?} #{} at {}: {}",
            namespace,
            key,
            count,
            sequence,
            value
        );
    }
    storage.push_checkpoint(namespace, key, &Checkpoint::new(sequence, value))?;
    Ok(())
}

// ========================================
// Queries
// ========================================

/// Number of checkpoints recorded for `key`
pub fn num_checkpoints<S: CheckpointStorage + ?Sized>(
    storage: &S,
    namespace: Namespace,
    key: &CheckpointKey,
) -> CheckpointResult<u32> {
    Ok(storage.get_checkpoint_count(namespace, key)?)
}

/// Checkpoint at `index`, `NotFound` when out of bounds
pub fn checkpoint_at<S: CheckpointStorage + ?Sized>(
    storage: &S,
    namespace: Namespace,
    key: &CheckpointKey,
    index: u32,
) -> CheckpointResult<Checkpoint> {
    let count = storage.get_checkpoint_count(namespace, key)?;
    if index >= count {
        return Err(CheckpointError::NotFound { index, count });
    }

    storage
        .get_checkpoint(namespace, key, index)?
        .ok_or(CheckpointError::NotFound { index, count })
}

/// Most recent checkpoint, if any
pub fn latest_checkpoint<S: CheckpointStorage + ?Sized>(
    storage: &S,
    namespace: Namespace,
    key: &CheckpointKey,
) -> CheckpointResult<Option<Checkpoint>> {
    let count = storage.get_checkpoint_count(namespace, key)?;
    if count == 0 {
        return Ok(None);
    }
    checkpoint_at(storage, namespace, key, count - 1).map(Some)
}

/// Most recently recorded value, zero if none
pub fn current_value<S: CheckpointStorage + ?Sized>(
    storage: &S,
    namespace: Namespace,
    key: &CheckpointKey,
) -> CheckpointResult<u64> {
    Ok(latest_checkpoint(storage, namespace, key)?
        .map(|cp| cp.value)
        .unwrap_or(0))
}

/// Value of the latest entry with `entry.sequence <= sequence`, zero if none
///
/// No "future" guard: callers decide what is queryable.
pub fn upper_lookup<S: CheckpointStorage + ?Sized>(
    storage: &S,
    namespace: Namespace,
    key: &CheckpointKey,
    sequence: u64,
) -> CheckpointResult<u64> {
    let count = storage.get_checkpoint_count(namespace, key)?;

    // Find the first entry strictly after `sequence`
    let mut low = 0u32;
    let mut high = count;
    while low < high {
        let mid = low + (high - low) / 2;
        let cp = storage
            .get_checkpoint(namespace, key, mid)?
            .ok_or(CheckpointError::NotFound { index: mid, count })?;

        if cp.sequence <= sequence {
            low = mid + 1;
        } else {
            high = mid;
        }
    }

    if low == 0 {
        return Ok(0);
    }

    checkpoint_at(storage, namespace, key, low - 1).map(|cp| cp.value)
}

/// Historical value of `key` at a strictly past `sequence`
///
/// # Returns
/// * `Ok(value)` of the latest entry at or before `sequence` (zero if none)
/// * `Err(CheckpointError::FutureQuery)` if `sequence >= current`
pub fn value_at<S: CheckpointStorage + ?Sized>(
    storage: &S,
    namespace: Namespace,
    key: &CheckpointKey,
    sequence: u64,
    current: u64,
) -> CheckpointResult<u64> {
    if sequence >= current {
        return Err(CheckpointError::FutureQuery {
            requested: sequence,
            current,
        });
    }
    upper_lookup(storage, namespace, key, sequence)
}

// ========================================
// Snapshots
// ========================================

/// Id of the most recent snapshot, 0 before the first one
pub fn current_snapshot_id<S: CheckpointStorage + ?Sized>(storage: &S) -> CheckpointResult<u64> {
    Ok(storage.get_snapshot_id()?)
}

/// Allocate the next snapshot id (1, 2, ...)
///
/// Nothing is copied: values are resolved lazily by `value_at_snapshot`.
pub fn create_snapshot<S: CheckpointStorage + ?Sized>(storage: &mut S) -> CheckpointResult<u64> {
    let current = storage.get_snapshot_id()?;
    let id = if current < FIRST_SNAPSHOT_ID {
        FIRST_SNAPSHOT_ID
    } else {
        current.checked_add(1).ok_or(CheckpointError::Overflow)?
    };
    storage.set_snapshot_id(id)?;
    Ok(id)
}

/// Epoch receiving writes right now: the one after the latest snapshot
pub fn open_snapshot_epoch<S: CheckpointStorage + ?Sized>(storage: &S) -> CheckpointResult<u64> {
    storage
        .get_snapshot_id()?
        .checked_add(1)
        .ok_or(CheckpointError::Overflow)
}

/// Record a value so that later snapshots see it but earlier ones do not
pub fn record_for_snapshot<S: CheckpointStorage + ?Sized>(
    storage: &mut S,
    namespace: Namespace,
    key: &CheckpointKey,
    value: u64,
) -> CheckpointResult<()> {
    let epoch = open_snapshot_epoch(storage)?;
    record_value(storage, namespace, key, epoch, value)
}

/// Value of `key` as it was when snapshot `id` was taken
///
/// # Returns
/// * `Ok(value)` on success
/// * `Err(CheckpointError::InvalidSnapshotId)` if `id == 0`
/// * `Err(CheckpointError::NonexistentSnapshot)` if `id` was not created yet
pub fn value_at_snapshot<S: CheckpointStorage + ?Sized>(
    storage: &S,
    namespace: Namespace,
    key: &CheckpointKey,
    id: u64,
) -> CheckpointResult<u64> {
    if id == 0 {
        return Err(CheckpointError::InvalidSnapshotId);
    }

    let current = storage.get_snapshot_id()?;
    if id > current {
        return Err(CheckpointError::NonexistentSnapshot { id });
    }

    upper_lookup(storage, namespace, key, id)
}
