//! Contract call encoding
//!
//! The handful of contract methods this tool calls are addressed by their
//! canonical signatures; selectors are derived with keccak256 and arguments
//! encoded with `ethers::abi`.

use ethers::abi::{self, Token};
use ethers::types::{Bytes, U256};
use ethers::utils::keccak256;

/// Safe: execute a transaction given owner signatures
pub const EXEC_TRANSACTION: &str =
    "execTransaction(address,uint256,bytes,uint8,uint256,uint256,uint256,address,address,bytes)";
/// Safe: add an owner and update the threshold
pub const ADD_OWNER_WITH_THRESHOLD: &str = "addOwnerWithThreshold(address,uint256)";
/// Safe: ownership predicate
pub const IS_OWNER: &str = "isOwner(address)";
/// MultiSend: execute packed transactions
pub const MULTI_SEND: &str = "multiSend(bytes)";
/// Airdrop: redeem an allocation
pub const REDEEM: &str = "redeem(uint8,uint16,uint64,uint128,bytes32[])";
/// Airdrop: claim vested tokens
pub const CLAIM_VESTED_TOKENS: &str = "claimVestedTokens(bytes32,address,uint128)";
/// Delegate registry
pub const SET_DELEGATE: &str = "setDelegate(bytes32,address)";
pub const CLEAR_DELEGATE: &str = "clearDelegate(bytes32)";
/// ERC-20
pub const TRANSFER: &str = "transfer(address,uint256)";
pub const DECIMALS: &str = "decimals()";

/// First four bytes of keccak256 over the method signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// Selector followed by the ABI encoding of `args`
pub fn encode_call(signature: &str, args: &[Token]) -> Bytes {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(&abi::encode(args));
    Bytes::from(data)
}

/// Big-endian 32-byte word
pub fn word(value: U256) -> [u8; 32] {
    let mut out = [0u8; 32];
    value.to_big_endian(&mut out);
    out
}

/// Interpret the first return word of an `eth_call`
pub fn first_word(data: &[u8]) -> Option<U256> {
    data.get(..32).map(U256::from_big_endian)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_selectors() {
        assert_eq!(selector(EXEC_TRANSACTION), [0x6a, 0x76, 0x12, 0x02]);
        assert_eq!(selector(MULTI_SEND), [0x8d, 0x80, 0xff, 0x0a]);
        assert_eq!(selector(ADD_OWNER_WITH_THRESHOLD), [0x0d, 0x58, 0x2f, 0x13]);
        assert_eq!(selector(IS_OWNER), [0x2f, 0x54, 0xbf, 0x6e]);
        assert_eq!(selector(TRANSFER), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector(DECIMALS), [0x31, 0x3c, 0xe5, 0x67]);
        assert_eq!(selector(REDEEM), [0xbf, 0x62, 0x13, 0xe4]);
    }

    #[test]
    fn test_word_is_big_endian() {
        let w = word(U256::from(0x0102u64));
        assert_eq!(&w[..30], &[0u8; 30]);
        assert_eq!(w[30], 0x01);
        assert_eq!(w[31], 0x02);
        assert_eq!(first_word(&w), Some(U256::from(0x0102u64)));
        assert_eq!(first_word(&w[..31]), None);
    }
}
