//! Safe family loading and read-only chain queries

use crate::{
    abi::{self, DECIMALS, IS_OWNER},
    error::{ChainError, EncodingError},
    parse_address,
};
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, U256};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read-only view of on-chain account state
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// `safe.isOwner(candidate)`
    async fn is_owner(&self, safe: Address, candidate: Address) -> Result<bool, ChainError>;

    /// `token.decimals()`
    async fn decimals(&self, token: Address) -> Result<u8, ChainError>;
}

/// `ChainReader` backed by a JSON-RPC node
pub struct EthChain {
    provider: Provider<Http>,
    timeout_ms: u64,
}

impl EthChain {
    pub fn new(rpc_url: &str, timeout_ms: u64) -> Result<Self, ChainError> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|_| ChainError::InvalidUrl(rpc_url.to_string()))?;
        Ok(Self {
            provider,
            timeout_ms,
        })
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        let call = self.provider.call(&tx, None);
        tokio::time::timeout(Duration::from_millis(self.timeout_ms), call)
            .await
            .map_err(|_| ChainError::Timeout(self.timeout_ms))?
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }
}

#[async_trait]
impl ChainReader for EthChain {
    async fn is_owner(&self, safe: Address, candidate: Address) -> Result<bool, ChainError> {
        let data = abi::encode_call(IS_OWNER, &[Token::Address(candidate)]);
        let out = self.call(safe, data).await?;
        decode_bool(&out)
    }

    async fn decimals(&self, token: Address) -> Result<u8, ChainError> {
        let out = self.call(token, abi::encode_call(DECIMALS, &[])).await?;
        decode_u8(&out)
    }
}

fn decode_bool(data: &[u8]) -> Result<bool, ChainError> {
    let value = abi::first_word(data)
        .ok_or_else(|| ChainError::Decode(format!("bool response too short: {} bytes", data.len())))?;
    Ok(!value.is_zero())
}

fn decode_u8(data: &[u8]) -> Result<u8, ChainError> {
    let value = abi::first_word(data)
        .ok_or_else(|| ChainError::Decode(format!("uint8 response too short: {} bytes", data.len())))?;
    if value > U256::from(u8::MAX) {
        return Err(ChainError::Decode(format!("{} does not fit in uint8", value)));
    }
    Ok(value.as_u32() as u8)
}

/// A controller Safe and the child Safes it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeFamily {
    pub parent: Address,
    pub children: Vec<Address>,
}

impl SafeFamily {
    pub fn new(parent: Address, children: Vec<Address>) -> Self {
        Self { parent, children }
    }

    pub fn parse<S: AsRef<str>>(parent: &str, children: &[S]) -> Result<Self, EncodingError> {
        let parent = parse_address(parent)?;
        let children = children
            .iter()
            .map(|child| parse_address(child.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(parent, children))
    }

    /// Check that the parent owns every child
    ///
    /// Missing ownership and failed lookups are only logged: transactions
    /// for such a child will revert on chain but the rest still go through.
    /// Returns the children that could not be confirmed.
    pub async fn verify_ownership(&self, chain: &dyn ChainReader) -> Vec<Address> {
        info!(
            "Checking ownership of {} child Safes by {:?}",
            self.children.len(),
            self.parent
        );
        let mut unconfirmed = Vec::new();
        for child in &self.children {
            match chain.is_owner(*child, self.parent).await {
                Ok(true) => debug!("{:?} owns {:?}", self.parent, child),
                Ok(false) => {
                    warn!(
                        "{:?} is not an owner of {:?}: transactions will fail!",
                        self.parent, child
                    );
                    unconfirmed.push(*child);
                }
                Err(e) => {
                    warn!("Could not verify ownership of {:?}: {}", child, e);
                    unconfirmed.push(*child);
                }
            }
        }
        info!(
            "Loaded parent {:?} along with {} child Safes",
            self.parent,
            self.children.len()
        );
        unconfirmed
    }
}
