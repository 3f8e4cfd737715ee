//! Safe token airdrop: allocation lookup, `redeem` and `claimVestedTokens`

use crate::{
    ActionCall,
    abi::{self, CLAIM_VESTED_TOKENS, REDEEM},
    actions::ActionBuilder,
    config::AirdropConfig,
    error::{ActionError, AllocationError, EncodingError},
    parse_amount,
};
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::{Address, H256, U256};
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Error marker returned by the allocation bucket for unknown accounts
const NO_SUCH_KEY: &str = "NoSuchKey";

/// One vesting allocation as published by the allocation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub tag: String,
    pub account: Address,
    pub chain_id: u64,
    /// Airdrop contract holding this vesting
    pub contract: Address,
    pub vesting_id: H256,
    pub duration_weeks: u16,
    pub start_date: u64,
    /// uint128, published as a decimal string
    pub amount: String,
    pub curve: u8,
    pub proof: Vec<H256>,
}

impl Allocation {
    pub fn amount_value(&self) -> Result<U256, EncodingError> {
        let amount = parse_amount(&self.amount)?;
        if amount > U256::from(u128::MAX) {
            return Err(EncodingError::InvalidAmount(self.amount.clone()));
        }
        Ok(amount)
    }

    /// `redeem(curveType, durationWeeks, startDate, amount, proof)` on the airdrop contract
    pub fn redeem_call(&self) -> Result<ActionCall, EncodingError> {
        let proof = self
            .proof
            .iter()
            .map(|node| Token::FixedBytes(node.as_bytes().to_vec()))
            .collect();
        let data = abi::encode_call(
            REDEEM,
            &[
                Token::Uint(U256::from(self.curve)),
                Token::Uint(U256::from(self.duration_weeks)),
                Token::Uint(U256::from(self.start_date)),
                Token::Uint(self.amount_value()?),
                Token::Array(proof),
            ],
        );
        Ok(ActionCall::call(self.contract, data))
    }

    /// Claim everything vested so far, paid out to `beneficiary`
    pub fn claim_call(&self, beneficiary: Address) -> ActionCall {
        let data = abi::encode_call(
            CLAIM_VESTED_TOKENS,
            &[
                Token::FixedBytes(self.vesting_id.as_bytes().to_vec()),
                Token::Address(beneficiary),
                Token::Uint(U256::from(u128::MAX)),
            ],
        );
        ActionCall::call(self.contract, data)
    }
}

/// Where allocations come from
#[async_trait]
pub trait AllocationSource: Send + Sync {
    /// All allocations of `account`, or `NotEligible`
    async fn allocations(&self, account: Address) -> Result<Vec<Allocation>, AllocationError>;
}

/// `AllocationSource` reading the hosted allocation files
pub struct AllocationService {
    http: reqwest::Client,
    base_url: String,
    chain_id: u64,
}

impl AllocationService {
    pub fn new(config: &AirdropConfig) -> Result<Self, AllocationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AllocationError::Request(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.allocation_url.trim_end_matches('/').to_string(),
            chain_id: config.chain_id,
        })
    }

    fn url(&self, account: Address) -> String {
        format!(
            "{}/{}/{}.json",
            self.base_url,
            self.chain_id,
            to_checksum(&account, None)
        )
    }
}

#[async_trait]
impl AllocationSource for AllocationService {
    async fn allocations(&self, account: Address) -> Result<Vec<Allocation>, AllocationError> {
        let url = self.url(account);
        debug!("Fetching allocations from {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AllocationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(account, status.as_u16(), &body));
        }
        response
            .json()
            .await
            .map_err(|e| AllocationError::Request(e.to_string()))
    }
}

fn classify_failure(account: Address, status: u16, body: &str) -> AllocationError {
    if body.contains(NO_SUCH_KEY) {
        AllocationError::NotEligible(to_checksum(&account, None))
    } else {
        AllocationError::Request(format!("unhandled response {}: {}", status, body))
    }
}

/// Allocations of `child`, or `None` if it has nothing to claim
async fn eligible_allocations(
    source: &dyn AllocationSource,
    child: Address,
) -> Result<Option<Vec<Allocation>>, ActionError> {
    match source.allocations(child).await {
        Ok(list) if !list.is_empty() => Ok(Some(list)),
        Ok(_) => {
            info!("No allocations for {:?}, skipping", child);
            Ok(None)
        }
        Err(AllocationError::NotEligible(account)) => {
            info!("{} is not eligible for the airdrop, skipping", account);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Redeem the first ("user") allocation of each child
pub struct Redeem {
    source: Arc<dyn AllocationSource>,
}

impl Redeem {
    pub fn new(source: Arc<dyn AllocationSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ActionBuilder for Redeem {
    async fn build(&self, _parent: Address, child: Address) -> Result<Vec<ActionCall>, ActionError> {
        let Some(allocations) = eligible_allocations(self.source.as_ref(), child).await? else {
            return Ok(Vec::new());
        };
        if allocations.len() > 1 {
            // TODO: redeem the remaining allocations once nested redemption is supported
            info!(
                "Detected {} allocations for {:?}, taking the first",
                allocations.len(),
                child
            );
        }
        Ok(vec![allocations[0].redeem_call()?])
    }
}

/// Claim vested tokens from every allocation of each child into the parent
pub struct Claim {
    source: Arc<dyn AllocationSource>,
}

impl Claim {
    pub fn new(source: Arc<dyn AllocationSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ActionBuilder for Claim {
    async fn build(&self, parent: Address, child: Address) -> Result<Vec<ActionCall>, ActionError> {
        let Some(allocations) = eligible_allocations(self.source.as_ref(), child).await? else {
            return Ok(Vec::new());
        };
        debug!(
            "Claiming {} allocation(s) of {:?} with beneficiary {:?}",
            allocations.len(),
            child,
            parent
        );
        Ok(allocations
            .iter()
            .map(|allocation| allocation.claim_call(parent))
            .collect())
    }
}
