//! Transaction Service Client
//!
//! Proposes signed Safe transactions to a Safe Transaction Service and reads
//! the current Safe nonce from it.

use crate::{SignedBatch, config::RelayConfig, error::RelayError};
use async_trait::async_trait;
use ethers::types::Address;
use ethers::utils::to_checksum;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Submission endpoint for signed batches
#[async_trait]
pub trait RelayClient: Send + Sync {
    /// Current nonce of `safe`
    async fn get_nonce(&self, safe: Address) -> Result<u64, RelayError>;

    /// Propose a signed batch
    async fn submit(&self, batch: &SignedBatch) -> Result<(), RelayError>;
}

/// `RelayClient` speaking the Safe Transaction Service REST API
pub struct TransactionService {
    http: reqwest::Client,
    base_url: String,
    origin: String,
    timeout_ms: u64,
}

/// Subset of `GET /api/v1/safes/{address}/`
#[derive(Debug, Deserialize)]
struct SafeInfo {
    nonce: NonceField,
}

/// Older service versions return the nonce as a number, newer as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NonceField {
    Number(u64),
    Text(String),
}

impl NonceField {
    fn value(&self) -> Result<u64, RelayError> {
        match self {
            NonceField::Number(n) => Ok(*n),
            NonceField::Text(s) => s
                .parse()
                .map_err(|_| RelayError::Decode(format!("invalid nonce {:?}", s))),
        }
    }
}

/// Body of `POST /api/v1/safes/{address}/multisig-transactions/`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProposeTransaction {
    safe: String,
    to: String,
    value: String,
    data: String,
    operation: u8,
    safe_tx_gas: String,
    base_gas: String,
    gas_price: String,
    gas_token: String,
    refund_receiver: String,
    nonce: u64,
    contract_transaction_hash: String,
    sender: String,
    signature: String,
    origin: String,
}

impl ProposeTransaction {
    fn from_batch(batch: &SignedBatch, origin: &str) -> Self {
        let tx = &batch.tx;
        Self {
            safe: to_checksum(&tx.safe, None),
            to: to_checksum(&tx.to, None),
            value: tx.value.to_string(),
            data: format!("0x{}", hex::encode(&tx.data)),
            operation: tx.operation.as_u8(),
            safe_tx_gas: tx.safe_tx_gas.to_string(),
            base_gas: tx.base_gas.to_string(),
            gas_price: tx.gas_price.to_string(),
            gas_token: to_checksum(&tx.gas_token, None),
            refund_receiver: to_checksum(&tx.refund_receiver, None),
            nonce: tx.nonce,
            contract_transaction_hash: format!("{:?}", batch.safe_tx_hash),
            sender: to_checksum(&batch.sender, None),
            signature: format!("0x{}", hex::encode(batch.signature_bytes())),
            origin: origin.to_string(),
        }
    }
}

impl TransactionService {
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            origin: config.origin.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    fn safe_url(&self, safe: Address) -> String {
        format!("{}/api/v1/safes/{}/", self.base_url, to_checksum(&safe, None))
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, RelayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .map_err(|e| RelayError::from_reqwest(e, self.timeout_ms))?;
        Err(RelayError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RelayClient for TransactionService {
    async fn get_nonce(&self, safe: Address) -> Result<u64, RelayError> {
        let url = self.safe_url(safe);
        debug!("Fetching nonce from {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| RelayError::from_reqwest(e, self.timeout_ms))?;
        let info: SafeInfo = self
            .check(response)
            .await?
            .json()
            .await
            .map_err(|e| RelayError::from_reqwest(e, self.timeout_ms))?;
        info.nonce.value()
    }

    async fn submit(&self, batch: &SignedBatch) -> Result<(), RelayError> {
        let url = format!("{}multisig-transactions/", self.safe_url(batch.controller()));
        let body = ProposeTransaction::from_batch(batch, &self.origin);
        debug!("Posting nonce {} to {}", batch.nonce(), url);
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::from_reqwest(e, self.timeout_ms))?;
        self.check(response).await.map(|_| ())
    }
}
