//! Batch Orchestrator Module
//!
//! Connects all batch-related components into the multi-exec pipeline.
//!
//! # Architecture Flow
//! 1. Wrap every child action in an exec envelope (`ExecEnvelope`)
//! 2. Split the resulting items into partitions of at most `max_batch_size`
//! 3. Read the controller nonce once and assign `base + i` to partition `i`
//! 4. For each partition, in order: encode the MultiSend payload, hash and
//!    sign the controller's Safe transaction, then hand it to the `Submitter`
//! 5. Collect one result per partition (nonce, or -1 for a failed post)

use crate::{
    ActionCall, BatchItem, SignedBatch,
    batch::{encode_batch, nonce, partition},
    config::BatchConfig,
    error::RunError,
    relay::{Confirmation, RelayClient, Submitter},
    safe::{ExecEnvelope, SafeSigner, SafeTx},
};
use ethers::types::Address;
use std::sync::Arc;
use tracing::{debug, info};

/// Batch orchestrator
///
/// Drives one controller's partitions through signing and submission,
/// strictly one after the other so that submission order equals nonce order.
pub struct BatchOrchestrator {
    /// Nonce source and submission endpoint
    relay: Arc<dyn RelayClient>,
    submitter: Submitter,
    /// Batch configuration (partition size, MultiSend contract)
    config: BatchConfig,
    /// Chain the controller lives on (EIP-712 domain)
    chain_id: u64,
}

impl BatchOrchestrator {
    /// Creates a new batch orchestrator
    ///
    /// # Arguments
    /// * `relay` - Transaction service used for the nonce snapshot and submissions
    /// * `confirmation` - Operator gate consulted before every submission
    /// * `config` - Batch configuration settings
    /// * `chain_id` - Chain id of the controller Safe
    pub fn new(
        relay: Arc<dyn RelayClient>,
        confirmation: Arc<dyn Confirmation>,
        config: BatchConfig,
        chain_id: u64,
    ) -> Self {
        Self {
            submitter: Submitter::new(relay.clone(), confirmation),
            relay,
            config,
            chain_id,
        }
    }

    /// Execute `actions` on the children of `controller`
    ///
    /// Each `(child, call)` pair becomes a call on `child` that runs `call`
    /// as if approved by `controller`.
    pub async fn run(
        &self,
        controller: Address,
        actions: Vec<(Address, ActionCall)>,
        signer: &SafeSigner,
    ) -> Result<Vec<i64>, RunError> {
        info!("Building {} exec transactions for {:?}", actions.len(), controller);
        let items = actions
            .into_iter()
            .map(|(child, call)| ExecEnvelope::new(child, controller, call).into_batch_item())
            .collect();
        self.run_items(controller, items, signer).await
    }

    /// Same pipeline for items the controller executes directly
    pub async fn run_items(
        &self,
        controller: Address,
        items: Vec<BatchItem>,
        signer: &SafeSigner,
    ) -> Result<Vec<i64>, RunError> {
        let partitions = partition(&items, self.config.max_batch_size)?;
        info!(
            "Packing {} transactions into {} MultiSend batch(es) of at most {}",
            items.len(),
            partitions.len(),
            self.config.max_batch_size
        );

        let nonces = nonce::sequence(self.relay.as_ref(), controller, partitions.len()).await?;

        let mut results = Vec::with_capacity(partitions.len());
        for (index, (part, nonce)) in partitions.iter().zip(nonces).enumerate() {
            let batch = self.seal(controller, part, nonce, signer)?;
            debug!(
                "Batch {}/{} with {} transactions sealed as {:?}",
                index + 1,
                partitions.len(),
                part.len(),
                batch.safe_tx_hash
            );
            results.push(self.submitter.submit(&batch).await?);
        }
        Ok(results)
    }

    /// Encode, hash and sign one partition
    fn seal(
        &self,
        controller: Address,
        items: &[BatchItem],
        nonce: u64,
        signer: &SafeSigner,
    ) -> Result<SignedBatch, RunError> {
        let tx = SafeTx::multisend(
            controller,
            self.config.multisend_address,
            encode_batch(items),
            nonce,
        );
        let safe_tx_hash = tx.hash(self.chain_id);
        let signature = signer.sign(safe_tx_hash)?;
        Ok(SignedBatch {
            tx,
            safe_tx_hash,
            signature,
            sender: signer.address(),
        })
    }
}
