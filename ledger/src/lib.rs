pub mod checkpoints;
pub mod config;
pub mod error;
pub mod logger;
pub mod registry;
pub mod shared;
pub mod storage;
pub mod token;

pub use checkpoints::CheckpointLedger;
pub use config::{LedgerConfig, StorageBackend, TokenConfig};
pub use error::{LedgerError, LedgerResult};
pub use registry::AccessControlRegistry;
pub use shared::Shared;
pub use storage::{Backend, SledStorage};
pub use token::VotesToken;

use log::info;
use trc_common::{
    access_control::AccessControlStorage, context::SequenceProvider, crypto::Address,
    event::EventSink,
};

/// Open the configured store and attach a token to it
///
/// A fresh store is deployed with `deployer` as admin; an existing one is
/// reopened as is.
pub fn open_token<E: EventSink, C: SequenceProvider>(
    config: &LedgerConfig,
    events: E,
    clock: C,
    deployer: &Address,
) -> LedgerResult<VotesToken<Backend, E, C>> {
    config.validate()?;
    let storage = Backend::open(&config.storage)?;

    if storage.is_initialized()? {
        info!("Reopening deployed token {}", config.token.symbol);
        return Ok(VotesToken::open(config.token.clone(), storage, events, clock));
    }

    Ok(VotesToken::new(
        config.token.clone(),
        storage,
        events,
        clock,
        deployer,
    )?)
}
