// Runtime Context
//
// The core never asks "who is calling" or "what time is it" on its own.
// Hosts supply both, either directly through a RuntimeContext or through
// the provider traits below.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::crypto::Address;

// ========================================
// Providers
// ========================================

/// Supplies the identity of the account driving the current mutation
pub trait IdentityProvider {
    fn current_caller(&self) -> Address;
}

/// Supplies the current logical sequence number (block height, tick, ...)
///
/// Historical queries must target a sequence strictly below this value.
pub trait SequenceProvider {
    fn current_sequence(&self) -> u64;
}

// An address driving its own call
impl IdentityProvider for Address {
    fn current_caller(&self) -> Address {
        *self
    }
}

impl<T: SequenceProvider + ?Sized> SequenceProvider for &T {
    fn current_sequence(&self) -> u64 {
        (**self).current_sequence()
    }
}

impl<T: SequenceProvider + ?Sized> SequenceProvider for std::sync::Arc<T> {
    fn current_sequence(&self) -> u64 {
        (**self).current_sequence()
    }
}

// ========================================
// Runtime Context
// ========================================

/// Runtime context providing caller and sequence information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeContext {
    /// Current caller (transaction signer)
    pub caller: Address,
    /// Current sequence number
    pub sequence: u64,
}

impl RuntimeContext {
    /// Create a new runtime context
    pub fn new(caller: Address, sequence: u64) -> Self {
        Self { caller, sequence }
    }

    /// Build a context from host providers
    pub fn from_providers<I, S>(identity: &I, sequence: &S) -> Self
    where
        I: IdentityProvider + ?Sized,
        S: SequenceProvider + ?Sized,
    {
        Self::new(identity.current_caller(), sequence.current_sequence())
    }
}

impl IdentityProvider for RuntimeContext {
    fn current_caller(&self) -> Address {
        self.caller
    }
}

impl SequenceProvider for RuntimeContext {
    fn current_sequence(&self) -> u64 {
        self.sequence
    }
}

// ========================================
// Manual Clock
// ========================================

/// Sequence provider advanced explicitly by the host, safe to share between threads
#[derive(Debug, Default)]
pub struct ManualClock {
    current: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            current: AtomicU64::new(start),
        }
    }

    /// Move forward by one tick and return the new value
    pub fn advance(&self) -> u64 {
        self.advance_by(1)
    }

    /// Move forward by `n` ticks, saturating at `u64::MAX`
    pub fn advance_by(&self, n: u64) -> u64 {
        let previous = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
                Some(v.saturating_add(n))
            })
            .unwrap_or_else(|v| v);
        previous.saturating_add(n)
    }

    /// Set the clock; moving it backwards is ignored
    pub fn set(&self, value: u64) {
        self.current.fetch_max(value, Ordering::SeqCst);
    }
}

impl SequenceProvider for ManualClock {
    fn current_sequence(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}
