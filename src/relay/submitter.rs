//! Batch Submitter Module
//!
//! Posts one signed partition to the relay. Every post is gated by an
//! operator confirmation; declining halts the whole run, while relay
//! failures only mark the current partition as failed.

use crate::{
    FAILED_SUBMISSION, SignedBatch,
    error::SubmitError,
    relay::RelayClient,
};
use async_trait::async_trait;
use ethers::types::{Address, H256};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{error, info};

/// Operator approval for a single submission
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, safe_tx_hash: H256, target: Address) -> bool;
}

/// Approves everything (`--yes`)
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

#[async_trait]
impl Confirmation for AutoApprove {
    async fn confirm(&self, _safe_tx_hash: H256, _target: Address) -> bool {
        true
    }
}

/// Asks on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

#[async_trait]
impl Confirmation for StdinPrompt {
    async fn confirm(&self, safe_tx_hash: H256, target: Address) -> bool {
        // Terminal reads block, keep them off the runtime workers
        tokio::task::spawn_blocking(move || ask(safe_tx_hash, target))
            .await
            .unwrap_or(false)
    }
}

fn ask(safe_tx_hash: H256, target: Address) -> bool {
    let mut stderr = io::stderr();
    let _ = write!(
        stderr,
        "Post transaction with hash {:?} to {:?}? [y/N] ",
        safe_tx_hash, target
    );
    let _ = stderr.flush();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_affirmative(&answer),
        Err(_) => false,
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub struct Submitter {
    relay: Arc<dyn RelayClient>,
    confirmation: Arc<dyn Confirmation>,
}

impl Submitter {
    pub fn new(relay: Arc<dyn RelayClient>, confirmation: Arc<dyn Confirmation>) -> Self {
        Self {
            relay,
            confirmation,
        }
    }

    /// Submit `batch`, returning its nonce or `FAILED_SUBMISSION`
    ///
    /// # Returns
    /// * `Ok(nonce)` if the relay accepted the batch
    /// * `Ok(-1)` if the relay rejected it or could not be reached, or the
    ///   nonce does not fit the result type
    /// * `Err(AbortedByUser)` if the operator declined
    pub async fn submit(&self, batch: &SignedBatch) -> Result<i64, SubmitError> {
        info!(
            "Posting transaction with hash {:?} to {:?}",
            batch.safe_tx_hash,
            batch.controller()
        );
        if !self
            .confirmation
            .confirm(batch.safe_tx_hash, batch.controller())
            .await
        {
            return Err(SubmitError::AbortedByUser {
                safe_tx_hash: batch.safe_tx_hash,
                nonce: batch.nonce(),
            });
        }

        match self.relay.submit(batch).await {
            Ok(()) => match i64::try_from(batch.nonce()) {
                Ok(nonce) => {
                    info!("Transaction with nonce {} posted", nonce);
                    Ok(nonce)
                }
                Err(_) => {
                    error!(
                        "Transaction posted but nonce {} can't be reported. Recording {} for this batch",
                        batch.nonce(),
                        FAILED_SUBMISSION
                    );
                    Ok(FAILED_SUBMISSION)
                }
            },
            Err(e) => {
                error!(
                    "Transaction with nonce {} NOT posted: {}. Recording {} for this batch",
                    batch.nonce(),
                    e,
                    FAILED_SUBMISSION
                );
                Ok(FAILED_SUBMISSION)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RelayError,
        safe::{SafeSigner, SafeTx},
    };
    use ethers::types::Bytes;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// Relay that accepts every submission
    struct AcceptAll;

    #[async_trait]
    impl RelayClient for AcceptAll {
        async fn get_nonce(&self, _safe: Address) -> Result<u64, RelayError> {
            Ok(0)
        }

        async fn submit(&self, _batch: &SignedBatch) -> Result<(), RelayError> {
            Ok(())
        }
    }

    fn signed(nonce: u64) -> SignedBatch {
        let signer = SafeSigner::from_hex(TEST_KEY).unwrap();
        let tx = SafeTx::multisend(Address::repeat_byte(0xc0), Address::zero(), Bytes::new(), nonce);
        let safe_tx_hash = tx.hash(1);
        SignedBatch {
            tx,
            safe_tx_hash,
            signature: signer.sign(safe_tx_hash).unwrap(),
            sender: signer.address(),
        }
    }

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative("\n"));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[tokio::test]
    async fn test_auto_approve() {
        assert!(AutoApprove.confirm(H256::zero(), Address::zero()).await);
    }

    #[tokio::test]
    async fn test_accepted_batch_reports_its_nonce() {
        let submitter = Submitter::new(Arc::new(AcceptAll), Arc::new(AutoApprove));
        assert_eq!(submitter.submit(&signed(7)).await, Ok(7));
    }

    #[tokio::test]
    async fn test_oversized_nonce_is_not_reported_as_wrapped() {
        let submitter = Submitter::new(Arc::new(AcceptAll), Arc::new(AutoApprove));
        let result = submitter.submit(&signed(u64::MAX)).await;
        assert_eq!(result, Ok(FAILED_SUBMISSION));

        let result = submitter.submit(&signed(i64::MAX as u64 + 1)).await;
        assert_eq!(result, Ok(FAILED_SUBMISSION));
    }
}
