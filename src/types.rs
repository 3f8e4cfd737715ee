use crate::error::EncodingError;
use ethers::types::{Address, Bytes, H256, Signature, U256};

use crate::safe::SafeTx;

/// Result value recorded for a partition the relay refused
pub const FAILED_SUBMISSION: i64 = -1;

/// Call type understood by both Safe `execTransaction` and MultiSend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operation {
    Call = 0,
    DelegateCall = 1,
}

impl Operation {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A single low-level call a child account should perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
}

impl ActionCall {
    /// Plain CALL without value
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to,
            value: U256::zero(),
            data,
            operation: Operation::Call,
        }
    }
}

/// One entry of a MultiSend payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub operation: Operation,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl BatchItem {
    pub fn call(to: Address, value: U256, data: Bytes) -> Self {
        Self {
            operation: Operation::Call,
            to,
            value,
            data,
        }
    }
}

/// Sealed partition ready for the relay
///
/// Holding an ethers `Signature` rather than raw bytes means a batch cannot
/// exist without a full 65-byte signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedBatch {
    pub tx: SafeTx,
    pub safe_tx_hash: H256,
    pub signature: Signature,
    /// Owner address that produced `signature`
    pub sender: Address,
}

impl SignedBatch {
    pub fn controller(&self) -> Address {
        self.tx.safe
    }

    pub fn nonce(&self) -> u64 {
        self.tx.nonce
    }

    pub fn encoded_data(&self) -> &Bytes {
        &self.tx.data
    }

    /// `r ‖ s ‖ v` as expected by the transaction service
    pub fn signature_bytes(&self) -> Bytes {
        Bytes::from(self.signature.to_vec())
    }
}

/// Decode a `0x`-prefixed (or bare) hex string of exactly `N` bytes
pub fn parse_fixed<const N: usize>(input: &str) -> Result<[u8; N], EncodingError> {
    let trimmed = input.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let raw = hex::decode(stripped).map_err(|e| EncodingError::InvalidHex {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    let actual = raw.len();
    raw.try_into().map_err(|_| EncodingError::InvalidLength {
        input: input.to_string(),
        expected: N,
        actual,
    })
}

/// Parse a 20-byte account address (checksum casing is not enforced)
pub fn parse_address(input: &str) -> Result<Address, EncodingError> {
    parse_fixed::<20>(input).map(Address::from)
}

pub fn parse_amount(input: &str) -> Result<U256, EncodingError> {
    U256::from_dec_str(input.trim()).map_err(|_| EncodingError::InvalidAmount(input.to_string()))
}
