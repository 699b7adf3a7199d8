//! Runtime configuration, loaded from JSON.
//!
//! ```json
//! {
//!   "storage": { "type": "sled", "path": "data/ledger", "flush_on_write": true },
//!   "log_level": "debug",
//!   "token": { "name": "Governance", "symbol": "GOV", "decimals": 6, "max_supply": 1000000000 }
//! }
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use trc_common::config::{DEFAULT_DECIMALS, MAX_VOTES_SUPPLY};

use crate::error::{LedgerError, LedgerResult};

/// Maximum length of token name (bytes)
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum length of token symbol (bytes)
pub const MAX_SYMBOL_LENGTH: usize = 12;

/// Maximum decimals for a token
pub const MAX_DECIMALS: u8 = 18;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    Sled {
        path: PathBuf,
        #[serde(default)]
        flush_on_write: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub max_supply: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "Votes Token".to_string(),
            symbol: "VOTE".to_string(),
            decimals: DEFAULT_DECIMALS,
            max_supply: MAX_VOTES_SUPPLY,
        }
    }
}

impl TokenConfig {
    pub fn validate(&self) -> LedgerResult<()> {
        if self.name.is_empty() || self.name.len() > MAX_NAME_LENGTH {
            return Err(LedgerError::Config(format!(
                "token name must be 1..={} bytes",
                MAX_NAME_LENGTH
            )));
        }
        if self.symbol.is_empty()
            || self.symbol.len() > MAX_SYMBOL_LENGTH
            || !self.symbol.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(LedgerError::Config(format!(
                "token symbol must be 1..={} ASCII alphanumeric characters",
                MAX_SYMBOL_LENGTH
            )));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(LedgerError::Config(format!(
                "decimals {} above maximum {}",
                self.decimals, MAX_DECIMALS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub storage: StorageBackend,
    pub log_level: String,
    pub token: TokenConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            log_level: "info".to_string(),
            token: TokenConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Read and validate a JSON config file
    pub fn load<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> LedgerResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LedgerResult<()> {
        self.level_filter()?;
        self.token.validate()
    }

    pub fn level_filter(&self) -> LedgerResult<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| LedgerError::Config(format!("unknown log level '{}'", self.log_level)))
    }

    /// Install the process logger at the configured level
    pub fn init_logger(&self) -> LedgerResult<bool> {
        Ok(crate::logger::init(self.level_filter()?))
    }
}
