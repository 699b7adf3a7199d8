//! Votes token service: the registry and the ledger working together.
//!
//! Privileged calls are checked against roles held in the same store, and
//! each balance change writes snapshot and vote checkpoints. Block heights
//! come from the sequence provider.

use log::info;
use trc_common::{
    access_control::{self, AccessControlStorage, RoleId, BURNER_ROLE, DEFAULT_ADMIN_ROLE, MINTER_ROLE, SNAPSHOT_ROLE},
    checkpoint::Checkpoint,
    context::{IdentityProvider, RuntimeContext, SequenceProvider},
    crypto::Address,
    event::EventSink,
    storage::LedgerStorage,
    token::{self, TokenResult},
};

use crate::config::TokenConfig;

pub struct VotesToken<S, E, C> {
    config: TokenConfig,
    storage: S,
    events: E,
    clock: C,
}

impl<S: LedgerStorage, E: EventSink, C: SequenceProvider> VotesToken<S, E, C> {
    /// Deploy on a fresh store: `deployer` receives the admin, minter, burner and snapshot roles
    pub fn new(
        config: TokenConfig,
        mut storage: S,
        mut events: E,
        clock: C,
        deployer: &Address,
    ) -> TokenResult<Self> {
        access_control::initialize(&mut storage, &mut events, deployer)?;
        for role in [*MINTER_ROLE, *BURNER_ROLE, *SNAPSHOT_ROLE] {
            access_control::grant_role_unchecked(&mut storage, &mut events, deployer, &role, deployer)?;
        }

        info!("Deployed token {} ({}) for {}", config.name, config.symbol, deployer);
        Ok(Self {
            config,
            storage,
            events,
            clock,
        })
    }

    /// Attach to a store deployed earlier
    pub fn open(config: TokenConfig, storage: S, events: E, clock: C) -> Self {
        Self {
            config,
            storage,
            events,
            clock,
        }
    }

    fn context<I: IdentityProvider + ?Sized>(&self, caller: &I) -> RuntimeContext {
        RuntimeContext::from_providers(caller, &self.clock)
    }

    fn current_block(&self) -> u64 {
        self.clock.current_sequence()
    }

    // ===== Metadata =====

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn symbol(&self) -> &str {
        &self.config.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.config.decimals
    }

    pub fn max_supply(&self) -> u64 {
        self.config.max_supply
    }

    // ===== Balances =====

    pub fn balance_of(&self, account: &Address) -> TokenResult<u64> {
        token::balance_of(&self.storage, account)
    }

    pub fn total_supply(&self) -> TokenResult<u64> {
        token::total_supply(&self.storage)
    }

    pub fn mint<I: IdentityProvider + ?Sized>(&mut self, to: &Address, amount: u64, caller: &I) -> TokenResult<()> {
        let ctx = self.context(caller);
        let max_supply = self.config.max_supply;
        token::mint(&mut self.storage, &mut self.events, &ctx, to, amount, max_supply)
    }

    pub fn burn<I: IdentityProvider + ?Sized>(&mut self, from: &Address, amount: u64, caller: &I) -> TokenResult<()> {
        let ctx = self.context(caller);
        token::burn(&mut self.storage, &mut self.events, &ctx, from, amount)
    }

    pub fn transfer<I: IdentityProvider + ?Sized>(&mut self, to: &Address, amount: u64, caller: &I) -> TokenResult<()> {
        let ctx = self.context(caller);
        token::transfer(&mut self.storage, &mut self.events, &ctx, to, amount)
    }

    // ===== Snapshots =====

    pub fn snapshot<I: IdentityProvider + ?Sized>(&mut self, caller: &I) -> TokenResult<u64> {
        let ctx = self.context(caller);
        token::snapshot(&mut self.storage, &mut self.events, &ctx)
    }

    pub fn balance_of_at(&self, account: &Address, id: u64) -> TokenResult<u64> {
        token::balance_of_at(&self.storage, account, id)
    }

    pub fn total_supply_at(&self, id: u64) -> TokenResult<u64> {
        token::total_supply_at(&self.storage, id)
    }

    // ===== Votes =====

    pub fn delegate<I: IdentityProvider + ?Sized>(&mut self, delegatee: &Address, caller: &I) -> TokenResult<()> {
        let ctx = self.context(caller);
        token::delegate(&mut self.storage, &mut self.events, &ctx, delegatee)
    }

    pub fn delegates(&self, account: &Address) -> TokenResult<Address> {
        token::delegates(&self.storage, account)
    }

    pub fn get_votes(&self, account: &Address) -> TokenResult<u64> {
        token::get_votes(&self.storage, account)
    }

    /// # Returns
    /// * `Err(CheckpointError::FutureQuery)` if `block` is not yet mined
    pub fn get_past_votes(&self, account: &Address, block: u64) -> TokenResult<u64> {
        token::get_past_votes(&self.storage, account, block, self.current_block())
    }

    pub fn get_past_total_supply(&self, block: u64) -> TokenResult<u64> {
        token::get_past_total_supply(&self.storage, block, self.current_block())
    }

    pub fn num_checkpoints(&self, account: &Address) -> TokenResult<u32> {
        token::num_checkpoints(&self.storage, account)
    }

    pub fn checkpoints(&self, account: &Address, index: u32) -> TokenResult<Checkpoint> {
        token::checkpoints(&self.storage, account, index)
    }

    // ===== Roles =====

    pub fn has_role(&self, role: &RoleId, account: &Address) -> TokenResult<bool> {
        Ok(access_control::has_role(&self.storage, role, account)?)
    }

    pub fn is_admin(&self, account: &Address) -> TokenResult<bool> {
        self.has_role(&DEFAULT_ADMIN_ROLE, account)
    }

    pub fn grant_role<I: IdentityProvider + ?Sized>(
        &mut self,
        role: &RoleId,
        account: &Address,
        caller: &I,
    ) -> TokenResult<bool> {
        let sender = caller.current_caller();
        Ok(access_control::grant_role(&mut self.storage, &mut self.events, &sender, role, account)?)
    }

    pub fn revoke_role<I: IdentityProvider + ?Sized>(
        &mut self,
        role: &RoleId,
        account: &Address,
        caller: &I,
    ) -> TokenResult<bool> {
        let sender = caller.current_caller();
        Ok(access_control::revoke_role(&mut self.storage, &mut self.events, &sender, role, account)?)
    }

    pub fn renounce_role<I: IdentityProvider + ?Sized>(
        &mut self,
        role: &RoleId,
        account: &Address,
        caller: &I,
    ) -> TokenResult<bool> {
        let sender = caller.current_caller();
        Ok(access_control::renounce_role(&mut self.storage, &mut self.events, &sender, role, account)?)
    }

    // ===== Accessors =====

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

impl<S: AccessControlStorage, E, C> VotesToken<S, E, C> {
    pub fn is_deployed(&self) -> TokenResult<bool> {
        Ok(self.storage.is_initialized()?)
    }
}
