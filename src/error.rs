//! Error Types
//!
//! One `thiserror` enum per pipeline stage. Fatal stages bubble up through
//! `RunError`; relay failures are turned into per-partition sentinels by the
//! submitter and never reach it.

use ethers::types::H256;
use thiserror::Error;

/// Partitioning failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("can't partition into parts of size {0}")]
    InvalidLimit(usize),
}

/// Malformed addresses, hex strings or fixed-size values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("invalid hex in {input:?}: {reason}")]
    InvalidHex { input: String, reason: String },
    #[error("expected {expected} bytes in {input:?}, got {actual}")]
    InvalidLength {
        input: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid decimal amount {0:?}")]
    InvalidAmount(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("invalid signing credential: {0}")]
    InvalidCredential(String),
}

/// Failures talking to the transaction service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("relay request timed out after {0}ms")]
    Timeout(u64),
    #[error("relay transport error: {0}")]
    Transport(String),
    #[error("relay rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected relay response: {0}")]
    Decode(String),
}

impl RelayError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            RelayError::Timeout(timeout_ms)
        } else if err.is_decode() {
            RelayError::Decode(err.to_string())
        } else {
            RelayError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("submission of {safe_tx_hash:?} (nonce {nonce}) declined by operator")]
    AbortedByUser { safe_tx_hash: H256, nonce: u64 },
}

/// Read-only chain queries (ownership, token decimals)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("invalid rpc url {0:?}")]
    InvalidUrl(String),
    #[error("rpc call timed out after {0}ms")]
    Timeout(u64),
    #[error("rpc call failed: {0}")]
    Rpc(String),
    #[error("unexpected return data: {0}")]
    Decode(String),
}

/// Airdrop allocation lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("{0} is not eligible for the airdrop")]
    NotEligible(String),
    #[error("allocation request failed: {0}")]
    Request(String),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Failures while turning an action into per-child calls
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Fatal errors of one orchestrator run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error(transparent)]
    Partition(#[from] PartitionError),
    #[error(transparent)]
    Signer(#[from] SignerError),
    #[error("failed to read controller nonce: {0}")]
    Nonce(#[from] RelayError),
    #[error(transparent)]
    Aborted(#[from] SubmitError),
}
