//! Run Context
//!
//! Everything one invocation needs, built once from the configuration and
//! passed explicitly to the components that use it.

use crate::{
    actions::{AllocationService, AllocationSource, DecimalsCache},
    batch::BatchOrchestrator,
    config::Config,
    relay::{AutoApprove, Confirmation, RelayClient, StdinPrompt, TransactionService},
    safe::{ChainReader, EthChain},
};
use std::sync::Arc;

pub struct RunContext {
    pub config: Config,
    pub chain: Arc<dyn ChainReader>,
    pub relay: Arc<dyn RelayClient>,
    pub confirmation: Arc<dyn Confirmation>,
    pub allocations: Arc<dyn AllocationSource>,
}

impl RunContext {
    /// Wire up the network-backed implementations
    ///
    /// `auto_approve` skips the interactive confirmation before each post.
    pub fn from_config(config: Config, auto_approve: bool) -> anyhow::Result<Self> {
        let chain = EthChain::new(&config.network.rpc_url, config.network.timeout_ms)?;
        let relay = TransactionService::new(&config.relay)?;
        let allocations = AllocationService::new(&config.airdrop)?;
        let confirmation: Arc<dyn Confirmation> = if auto_approve {
            Arc::new(AutoApprove)
        } else {
            Arc::new(StdinPrompt)
        };
        Ok(Self {
            config,
            chain: Arc::new(chain),
            relay: Arc::new(relay),
            confirmation,
            allocations: Arc::new(allocations),
        })
    }

    pub fn orchestrator(&self) -> BatchOrchestrator {
        BatchOrchestrator::new(
            self.relay.clone(),
            self.confirmation.clone(),
            self.config.batch.clone(),
            self.config.network.chain_id,
        )
    }

    /// Fresh decimals cache scoped to this run
    pub fn decimals_cache(&self) -> DecimalsCache {
        DecimalsCache::new(self.chain.clone())
    }
}
