//! Ledger Constants
//!
//! Defines limits, prefixes, and configuration constants.

// ===== Role Derivation =====

/// Domain separator mixed into every name-derived role identifier
pub const ROLE_DOMAIN: &[u8] = b"TRC_ACCESS_CONTROL_ROLE:";

// ===== Snapshot =====

/// First identifier returned by snapshot creation (0 is never a valid id)
pub const FIRST_SNAPSHOT_ID: u64 = 1;

// ===== Token Defaults =====

/// Default decimals for a votes token
pub const DEFAULT_DECIMALS: u8 = 6;

/// Largest total supply a votes token may ever reach
pub const MAX_VOTES_SUPPLY: u64 = u64::MAX;

// ===== Storage Key Prefixes (4-byte) =====

/// Role config prefix: [prefix][role] -> RoleConfig
pub const ROLE_CONFIG_PREFIX: &[u8] = b"acrc";

/// Role member index prefix: [prefix][role][index:u32] -> Address
pub const ROLE_MEMBER_PREFIX: &[u8] = b"acrm";

/// Role member position prefix: [prefix][role][account] -> index:u32
pub const ROLE_POSITION_PREFIX: &[u8] = b"acrp";

/// Checkpoint count prefix: [prefix][namespace][key] -> count:u32
pub const CHECKPOINT_COUNT_PREFIX: &[u8] = b"cpcn";

/// Checkpoint entry prefix: [prefix][namespace][key][index:u32] -> Checkpoint
pub const CHECKPOINT_PREFIX: &[u8] = b"cpck";

/// Snapshot counter key
pub const SNAPSHOT_COUNTER_KEY: &[u8] = b"cpsn";

/// Token balance prefix: [prefix][account] -> u64
pub const BALANCE_PREFIX: &[u8] = b"tkbl";

/// Token total supply key
pub const TOTAL_SUPPLY_KEY: &[u8] = b"tkts";

/// Delegation prefix: [prefix][account] -> Address
pub const DELEGATE_PREFIX: &[u8] = b"tkdg";

/// Registry initialization marker
pub const INITIALIZED_KEY: &[u8] = b"acin";
