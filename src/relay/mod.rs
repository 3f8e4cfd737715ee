//! Relay Module
//!
//! Hands signed batches to the external transaction service:
//! - RelayClient: nonce lookup and submission (Safe Transaction Service over HTTP)
//! - Submitter: confirmation gate and per-partition failure handling

mod client;
mod submitter;

pub use client::{RelayClient, TransactionService};
pub use submitter::{AutoApprove, Confirmation, StdinPrompt, Submitter};
