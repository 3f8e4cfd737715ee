//! Actions Module
//!
//! Each supported command turns a Safe family into the calls every child
//! performs on behalf of its parent:
//! - owner: add an owner to every child
//! - airdrop: redeem or claim the Safe token airdrop
//! - delegate: set or clear Snapshot delegation to the parent
//!
//! Transfers are different: the parent itself pays out, so they produce
//! batch items directly instead of per-child calls.

mod airdrop;
mod delegate;
mod owner;
mod transfer;


pub use airdrop::{Allocation, AllocationService, AllocationSource, Claim, Redeem};
pub use delegate::{ClearDelegate, DelegationId, SetDelegate};
pub use owner::AddOwner;
pub use transfer::{
    DecimalsCache, ParsedTransfer, Token, Transfer, TransferRecord, resolve_transfers,
};

use crate::{
    ActionCall,
    config::DelegationConfig,
    error::ActionError,
    safe::{ChainReader, SafeFamily},
};
use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Produces the calls a single child should execute
#[async_trait]
pub trait ActionBuilder: Send + Sync {
    /// An empty list means the child has nothing to do and is skipped
    async fn build(&self, parent: Address, child: Address) -> Result<Vec<ActionCall>, ActionError>;
}

/// Commands executed on every child of a family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddOwner { new_owner: Address, threshold: U256 },
    Claim,
    Redeem,
    SetDelegate,
    ClearDelegate,
}

impl Action {
    /// Builder for this action
    pub fn builder(
        &self,
        allocations: Arc<dyn AllocationSource>,
        delegation: &DelegationConfig,
    ) -> Result<Box<dyn ActionBuilder>, ActionError> {
        let builder: Box<dyn ActionBuilder> = match *self {
            Action::AddOwner {
                new_owner,
                threshold,
            } => Box::new(AddOwner::new(new_owner, threshold)),
            Action::Claim => Box::new(Claim::new(allocations)),
            Action::Redeem => Box::new(Redeem::new(allocations)),
            Action::SetDelegate => Box::new(SetDelegate::new(
                delegation.registry,
                delegation.id.parse()?,
            )),
            Action::ClearDelegate => Box::new(ClearDelegate::new(
                delegation.registry,
                delegation.id.parse()?,
            )),
        };
        Ok(builder)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::AddOwner { .. } => write!(f, "addOwnerWithThreshold"),
            Action::Claim => write!(f, "claimVestedTokens"),
            Action::Redeem => write!(f, "redeem"),
            Action::SetDelegate => write!(f, "setDelegate"),
            Action::ClearDelegate => write!(f, "clearDelegate"),
        }
    }
}

/// `(child, call)` pairs for every child, in family order
pub async fn build_calls(
    family: &SafeFamily,
    builder: &dyn ActionBuilder,
) -> Result<Vec<(Address, ActionCall)>, ActionError> {
    let mut calls = Vec::new();
    for child in &family.children {
        for call in builder.build(family.parent, *child).await? {
            calls.push((*child, call));
        }
    }
    info!(
        "Built {} calls for {} child Safes",
        calls.len(),
        family.children.len()
    );
    Ok(calls)
}

/// Everything the children of `family` should execute for `action`
///
/// The builder is created first, so malformed inputs such as a bad
/// delegation id fail before the ownership lookups touch the chain.
pub async fn prepare_calls(
    action: &Action,
    family: &SafeFamily,
    chain: &dyn ChainReader,
    allocations: Arc<dyn AllocationSource>,
    delegation: &DelegationConfig,
) -> Result<Vec<(Address, ActionCall)>, ActionError> {
    let builder = action.builder(allocations, delegation)?;

    let unconfirmed = family.verify_ownership(chain).await;
    if !unconfirmed.is_empty() {
        warn!("{} child Safes are not owned by the parent", unconfirmed.len());
    }

    info!("Building {} for {} child Safes", action, family.children.len());
    build_calls(family, builder.as_ref()).await
}
