// Votes Token Operations
//
// Every mutation runs in two phases: compute and validate all new values,
// then write. A failing operation leaves storage untouched.

use log::debug;

use super::{TokenError, TokenResult};
use crate::access_control::{check_role, has_role, BURNER_ROLE, MINTER_ROLE, SNAPSHOT_ROLE};
use crate::checkpoint::{
    self, create_snapshot, ensure_recordable, record_for_snapshot, record_value, value_at,
    value_at_snapshot, Checkpoint, CheckpointKey, Namespace,
};
use crate::context::RuntimeContext;
use crate::crypto::Address;
use crate::event::{Event, EventSink};
use crate::storage::LedgerStorage;

// ========================================
// Balance Queries
// ========================================

pub fn balance_of<S: LedgerStorage + ?Sized>(storage: &S, account: &Address) -> TokenResult<u64> {
    Ok(storage.get_balance(account)?)
}

pub fn total_supply<S: LedgerStorage + ?Sized>(storage: &S) -> TokenResult<u64> {
    Ok(storage.get_total_supply()?)
}

/// Balance of `account` when snapshot `id` was taken
pub fn balance_of_at<S: LedgerStorage + ?Sized>(
    storage: &S,
    account: &Address,
    id: u64,
) -> TokenResult<u64> {
    Ok(value_at_snapshot(
        storage,
        Namespace::SnapshotBalances,
        &CheckpointKey::Account(*account),
        id,
    )?)
}

/// Total supply when snapshot `id` was taken
pub fn total_supply_at<S: LedgerStorage + ?Sized>(storage: &S, id: u64) -> TokenResult<u64> {
    Ok(value_at_snapshot(
        storage,
        Namespace::SnapshotBalances,
        &CheckpointKey::Total,
        id,
    )?)
}

// ========================================
// Vote Queries
// ========================================

/// Current delegate of `account`, zero address when unset
pub fn delegates<S: LedgerStorage + ?Sized>(storage: &S, account: &Address) -> TokenResult<Address> {
    Ok(storage.get_delegate(account)?.unwrap_or(Address::ZERO))
}

pub fn get_votes<S: LedgerStorage + ?Sized>(storage: &S, account: &Address) -> TokenResult<u64> {
    Ok(checkpoint::current_value(
        storage,
        Namespace::Votes,
        &CheckpointKey::Account(*account),
    )?)
}

/// Votes of `account` at the end of a past block
///
/// # Returns
/// * `Err(CheckpointError::FutureQuery)` if `block >= current_block`
pub fn get_past_votes<S: LedgerStorage + ?Sized>(
    storage: &S,
    account: &Address,
    block: u64,
    current_block: u64,
) -> TokenResult<u64> {
    Ok(value_at(
        storage,
        Namespace::Votes,
        &CheckpointKey::Account(*account),
        block,
        current_block,
    )?)
}

/// Total supply at the end of a past block
pub fn get_past_total_supply<S: LedgerStorage + ?Sized>(
    storage: &S,
    block: u64,
    current_block: u64,
) -> TokenResult<u64> {
    Ok(value_at(
        storage,
        Namespace::Votes,
        &CheckpointKey::Total,
        block,
        current_block,
    )?)
}

pub fn num_checkpoints<S: LedgerStorage + ?Sized>(storage: &S, account: &Address) -> TokenResult<u32> {
    Ok(checkpoint::num_checkpoints(
        storage,
        Namespace::Votes,
        &CheckpointKey::Account(*account),
    )?)
}

pub fn checkpoints<S: LedgerStorage + ?Sized>(
    storage: &S,
    account: &Address,
    index: u32,
) -> TokenResult<Checkpoint> {
    Ok(checkpoint::checkpoint_at(
        storage,
        Namespace::Votes,
        &CheckpointKey::Account(*account),
        index,
    )?)
}

// ========================================
// Mutations
// ========================================

/// Create `amount` new tokens for `to`
///
/// # Arguments
/// * `storage` - Storage backend
/// * `events` - Event sink
/// * `ctx` - Runtime context (caller must hold MINTER_ROLE)
/// * `to` - Receiving account
/// * `amount` - Amount to create
/// * `max_supply` - Supply cap
///
/// # Returns
/// * `Ok(())` on success
/// * `Err(TokenError::AccessControl(Unauthorized))` if caller is not a minter
/// * `Err(TokenError::ZeroAddress)` if `to` is the zero address
/// * `Err(TokenError::SupplyCapExceeded)` if the new supply exceeds `max_supply`
pub fn mint<S, E>(
    storage: &mut S,
    events: &mut E,
    ctx: &RuntimeContext,
    to: &Address,
    amount: u64,
    max_supply: u64,
) -> TokenResult<()>
where
    S: LedgerStorage + ?Sized,
    E: EventSink + ?Sized,
{
    // 1. Verify caller is a minter
    check_role(storage, &MINTER_ROLE, &ctx.caller)?;

    // 2. Validate target and cap
    if to.is_zero() {
        return Err(TokenError::ZeroAddress);
    }
    let supply = storage.get_total_supply()?;
    match supply.checked_add(amount) {
        Some(new_supply) if new_supply <= max_supply => {}
        _ => return Err(TokenError::SupplyCapExceeded { cap: max_supply }),
    }

    // 3. Apply
    update(storage, events, ctx.sequence, &Address::ZERO, to, amount)
}

/// Destroy `amount` tokens held by `from`
///
/// # Returns
/// * `Err(TokenError::AccessControl(Unauthorized))` if caller is neither `from` nor a burner
/// * `Err(TokenError::InsufficientBalance)` if `from` holds less than `amount`
pub fn burn<S, E>(
    storage: &mut S,
    events: &mut E,
    ctx: &RuntimeContext,
    from: &Address,
    amount: u64,
) -> TokenResult<()>
where
    S: LedgerStorage + ?Sized,
    E: EventSink + ?Sized,
{
    if ctx.caller != *from {
        check_role(storage, &BURNER_ROLE, &ctx.caller)?;
    }
    if from.is_zero() {
        return Err(TokenError::ZeroAddress);
    }

    update(storage, events, ctx.sequence, from, &Address::ZERO, amount)
}

/// Move `amount` from the caller to `to`
pub fn transfer<S, E>(
    storage: &mut S,
    events: &mut E,
    ctx: &RuntimeContext,
    to: &Address,
    amount: u64,
) -> TokenResult<()>
where
    S: LedgerStorage + ?Sized,
    E: EventSink + ?Sized,
{
    if ctx.caller.is_zero() || to.is_zero() {
        return Err(TokenError::ZeroAddress);
    }

    update(storage, events, ctx.sequence, &ctx.caller, to, amount)
}

/// Freeze current balances under a new snapshot id
///
/// # Returns
/// * `Ok(id)` of the new snapshot
/// * `Err(TokenError::AccessControl(Unauthorized))` if caller lacks SNAPSHOT_ROLE
pub fn snapshot<S, E>(storage: &mut S, events: &mut E, ctx: &RuntimeContext) -> TokenResult<u64>
where
    S: LedgerStorage + ?Sized,
    E: EventSink + ?Sized,
{
    check_role(storage, &SNAPSHOT_ROLE, &ctx.caller)?;

    let id = create_snapshot(storage)?;
    debug!("snapshot {} taken by {}", id, ctx.caller);
    events.emit(Event::Snapshot { id });
    Ok(id)
}

/// Delegate the caller's voting power to `delegatee`
///
/// Delegating to the zero address withdraws the caller's votes.
pub fn delegate<S, E>(
    storage: &mut S,
    events: &mut E,
    ctx: &RuntimeContext,
    delegatee: &Address,
) -> TokenResult<()>
where
    S: LedgerStorage + ?Sized,
    E: EventSink + ?Sized,
{
    let delegator = ctx.caller;

    // 1. Plan the vote move before writing anything
    let current = delegates(storage, &delegator)?;
    let balance = storage.get_balance(&delegator)?;
    let changes = plan_vote_move(storage, ctx.sequence, &current, delegatee, balance)?;

    // 2. Apply
    storage.set_delegate(&delegator, delegatee)?;
    events.emit(Event::DelegateChanged {
        delegator,
        from_delegate: current,
        to_delegate: *delegatee,
    });
    apply_vote_move(storage, events, ctx.sequence, &changes)
}

/// Whether `account` may burn tokens owned by `from`
pub fn can_burn<S: LedgerStorage + ?Sized>(
    storage: &S,
    account: &Address,
    from: &Address,
) -> TokenResult<bool> {
    Ok(account == from || has_role(storage, &BURNER_ROLE, account)?)
}

// ========================================
// Internals
// ========================================

// Pending change to a delegate's voting power
struct VoteChange {
    delegate: Address,
    previous: u64,
    new: u64,
}

// Shared path of mint, burn and transfer; zero `from` mints, zero `to` burns
fn update<S, E>(
    storage: &mut S,
    events: &mut E,
    block: u64,
    from: &Address,
    to: &Address,
    amount: u64,
) -> TokenResult<()>
where
    S: LedgerStorage + ?Sized,
    E: EventSink + ?Sized,
{
    let minting = from.is_zero();
    let burning = to.is_zero();

    // 1. New balances
    let from_balance = if minting { 0 } else { storage.get_balance(from)? };
    if !minting && from_balance < amount {
        return Err(TokenError::InsufficientBalance {
            balance: from_balance,
            required: amount,
        });
    }
    let from_after = if minting { 0 } else { from_balance - amount };

    let to_before = if burning {
        0
    } else if to == from {
        from_after
    } else {
        storage.get_balance(to)?
    };
    let to_after = to_before.checked_add(amount).ok_or(TokenError::Overflow)?;

    // 2. New supply
    let supply = storage.get_total_supply()?;
    let new_supply = if minting {
        supply.checked_add(amount).ok_or(TokenError::Overflow)?
    } else if burning {
        supply.checked_sub(amount).ok_or(TokenError::Overflow)?
    } else {
        supply
    };
    if minting || burning {
        ensure_recordable(storage, Namespace::Votes, &CheckpointKey::Total, block)?;
    }

    // 3. Voting power
    let source = if minting { Address::ZERO } else { delegates(storage, from)? };
    let target = if burning { Address::ZERO } else { delegates(storage, to)? };
    let changes = plan_vote_move(storage, block, &source, &target, amount)?;

    // 4. Write balances and snapshot history
    if !minting {
        storage.set_balance(from, from_after)?;
        record_for_snapshot(
            storage,
            Namespace::SnapshotBalances,
            &CheckpointKey::Account(*from),
            from_after,
        )?;
    }
    if !burning {
        storage.set_balance(to, to_after)?;
        record_for_snapshot(
            storage,
            Namespace::SnapshotBalances,
            &CheckpointKey::Account(*to),
            to_after,
        )?;
    }
    if minting || burning {
        storage.set_total_supply(new_supply)?;
        record_for_snapshot(
            storage,
            Namespace::SnapshotBalances,
            &CheckpointKey::Total,
            new_supply,
        )?;
        record_value(storage, Namespace::Votes, &CheckpointKey::Total, block, new_supply)?;
    }

    debug!("transfer {} from {} to {} at block {}", amount, from, to, block);
    events.emit(Event::Transfer {
        from: *from,
        to: *to,
        value: amount,
    });

    // 5. Votes
    apply_vote_move(storage, events, block, &changes)
}

fn plan_vote_move<S: LedgerStorage + ?Sized>(
    storage: &S,
    block: u64,
    source: &Address,
    target: &Address,
    amount: u64,
) -> TokenResult<Vec<VoteChange>> {
    let mut changes = Vec::new();
    if source == target || amount == 0 {
        return Ok(changes);
    }

    if !source.is_zero() {
        let previous = get_votes(storage, source)?;
        let new = previous.checked_sub(amount).ok_or(TokenError::Overflow)?;
        ensure_recordable(storage, Namespace::Votes, &CheckpointKey::Account(*source), block)?;
        changes.push(VoteChange {
            delegate: *source,
            previous,
            new,
        });
    }

    if !target.is_zero() {
        let previous = get_votes(storage, target)?;
        let new = previous.checked_add(amount).ok_or(TokenError::Overflow)?;
        ensure_recordable(storage, Namespace::Votes, &CheckpointKey::Account(*target), block)?;
        changes.push(VoteChange {
            delegate: *target,
            previous,
            new,
        });
    }

    Ok(changes)
}

fn apply_vote_move<S, E>(
    storage: &mut S,
    events: &mut E,
    block: u64,
    changes: &[VoteChange],
) -> TokenResult<()>
where
    S: LedgerStorage + ?Sized,
    E: EventSink + ?Sized,
{
    for change in changes {
        record_value(
            storage,
            Namespace::Votes,
            &CheckpointKey::Account(change.delegate),
            block,
            change.new,
        )?;
        events.emit(Event::DelegateVotesChanged {
            delegate: change.delegate,
            previous_balance: change.previous,
            new_balance: change.new,
        });
    }
    Ok(())
}
