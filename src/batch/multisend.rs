//! MultiSend Encoding Module
//!
//! Packs batch items into the calldata of `multiSend(bytes transactions)`.
//!
//! # Layout
//! Each item is encoded without padding as
//! `operation (1) ‖ to (20) ‖ value (32) ‖ data length (32) ‖ data`.
//! The concatenation is passed as the single dynamic `bytes` argument:
//! `selector ‖ offset (0x20) ‖ length ‖ transactions ‖ zero padding`.
//!
//! The MultiSend contract decodes this byte for byte, so the encoding must
//! not change.

use crate::{
    BatchItem,
    abi::{self, MULTI_SEND, word},
};
use ethers::types::{Bytes, U256};

const WORD: usize = 32;

/// Append the packed form of `item` to `out`
fn pack_item(item: &BatchItem, out: &mut Vec<u8>) {
    out.push(item.operation.as_u8());
    out.extend_from_slice(item.to.as_bytes());
    out.extend_from_slice(&word(item.value));
    out.extend_from_slice(&word(U256::from(item.data.len())));
    out.extend_from_slice(&item.data);
}

/// The packed `transactions` blob
pub fn pack_transactions(items: &[BatchItem]) -> Vec<u8> {
    let size = items.iter().map(|i| 1 + 20 + 2 * WORD + i.data.len()).sum();
    let mut blob = Vec::with_capacity(size);
    for item in items {
        pack_item(item, &mut blob);
    }
    blob
}

/// Full `multiSend(bytes)` calldata for `items`, in order
pub fn encode_batch(items: &[BatchItem]) -> Bytes {
    let blob = pack_transactions(items);
    let padded = blob.len().div_ceil(WORD) * WORD;

    let mut data = Vec::with_capacity(4 + 2 * WORD + padded);
    data.extend_from_slice(&abi::selector(MULTI_SEND));
    data.extend_from_slice(&word(U256::from(WORD)));
    data.extend_from_slice(&word(U256::from(blob.len())));
    data.extend_from_slice(&blob);
    data.resize(4 + 2 * WORD + padded, 0);
    Bytes::from(data)
}
