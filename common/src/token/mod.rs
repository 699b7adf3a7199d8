// Votes Token Module
//
// Fungible balances wired to both cores:
// - Privileged mutations (mint, burn for others, snapshot) check roles
// - Every balance change is written to the snapshot history
// - Delegated voting power is checkpointed per block height
//
// Operations are free functions over `LedgerStorage`.

mod error;
mod operations;

pub use error::*;
pub use operations::*;

use crate::crypto::Address;
use crate::storage::StorageResult;

// ========================================
// Storage Trait (for dependency injection)
// ========================================

/// Abstract storage interface for balances and delegation
pub trait TokenStorage {
    // Balances
    fn get_balance(&self, account: &Address) -> StorageResult<u64>;
    fn set_balance(&mut self, account: &Address, balance: u64) -> StorageResult<()>;

    // Supply
    fn get_total_supply(&self) -> StorageResult<u64>;
    fn set_total_supply(&mut self, supply: u64) -> StorageResult<()>;

    // Delegation
    fn get_delegate(&self, account: &Address) -> StorageResult<Option<Address>>;
    fn set_delegate(&mut self, account: &Address, delegate: &Address) -> StorageResult<()>;
}
