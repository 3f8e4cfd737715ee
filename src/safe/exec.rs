//! Exec Envelope Module
//!
//! Wraps a call so that a child Safe executes it through `execTransaction`
//! on behalf of its (single) owner, the controller Safe.
//!
//! The signature attached to the envelope is not cryptographic. It is the
//! Safe "approved hash" form: `r` carries the owner address, `s` is zero and
//! `v = 1`. The child accepts it because the owner is the direct caller of
//! `execTransaction` (the MultiSend delegatecall runs in the controller's
//! context).

use crate::{
    abi::{self, EXEC_TRANSACTION},
    ActionCall, BatchItem,
};
use ethers::abi::Token;
use ethers::types::{Address, Bytes, U256};

/// Length of a single Safe owner signature
pub const SIGNATURE_LEN: usize = 65;

/// Signature type marker: approved by the address in `r`
const APPROVED_BY_CALLER: u8 = 0x01;

/// Deterministic 65-byte signature naming `owner` as a pre-approved signer
pub fn pre_approved_signature(owner: Address) -> [u8; SIGNATURE_LEN] {
    let mut signature = [0u8; SIGNATURE_LEN];
    signature[12..32].copy_from_slice(owner.as_bytes());
    signature[64] = APPROVED_BY_CALLER;
    signature
}

/// An `ActionCall` to be executed by `target` as if approved by `owner`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecEnvelope {
    pub target: Address,
    pub owner: Address,
    pub call: ActionCall,
}

impl ExecEnvelope {
    pub fn new(target: Address, owner: Address, call: ActionCall) -> Self {
        Self {
            target,
            owner,
            call,
        }
    }

    /// Calldata for `target.execTransaction(...)`
    ///
    /// Gas, refund and gas-token arguments are always zero.
    pub fn encode(&self) -> Bytes {
        abi::encode_call(
            EXEC_TRANSACTION,
            &[
                Token::Address(self.call.to),
                Token::Uint(self.call.value),
                Token::Bytes(self.call.data.to_vec()),
                Token::Uint(U256::from(self.call.operation.as_u8())),
                Token::Uint(U256::zero()),
                Token::Uint(U256::zero()),
                Token::Uint(U256::zero()),
                Token::Address(Address::zero()),
                Token::Address(Address::zero()),
                Token::Bytes(pre_approved_signature(self.owner).to_vec()),
            ],
        )
    }

    /// Plain, value-less call on the child carrying the envelope
    pub fn into_batch_item(self) -> BatchItem {
        let data = self.encode();
        BatchItem::call(self.target, U256::zero(), data)
    }
}

/// Calldata making `target` run `call` approved by `owner`
pub fn encode_exec(target: Address, owner: Address, call: ActionCall) -> Bytes {
    ExecEnvelope::new(target, owner, call).encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Operation, parse_address};
    use ethers::abi::{ParamType, decode};

    fn owner() -> Address {
        parse_address("0x206a9EAa7d0f9637c905F2Bf86aCaB363Abb418c").unwrap()
    }

    #[test]
    fn test_pre_approved_signature_layout() {
        let owner = owner();
        let sig = pre_approved_signature(owner);

        assert_eq!(sig.len(), 65);
        assert_eq!(&sig[..12], &[0u8; 12]);
        assert_eq!(&sig[12..32], owner.as_bytes());
        assert_eq!(sig[32], 0x00);
        assert_eq!(&sig[33..64], &[0u8; 31]);
        assert_eq!(sig[64], 0x01);
    }

    #[test]
    fn test_pre_approved_signature_matches_hex_layout() {
        let sig = pre_approved_signature(owner());
        let expected = format!(
            "000000000000000000000000{}00{}01",
            "206a9eaa7d0f9637c905f2bf86acab363abb418c",
            "0".repeat(62)
        );
        assert_eq!(hex::encode(sig), expected);
    }

    #[test]
    fn test_pre_approved_signature_is_deterministic() {
        assert_eq!(pre_approved_signature(owner()), pre_approved_signature(owner()));
        assert_ne!(
            pre_approved_signature(owner()),
            pre_approved_signature(Address::zero())
        );
    }

    #[test]
    fn test_encode_exec_round_trips_arguments() {
        let target = parse_address("0x1111111111111111111111111111111111111111").unwrap();
        let inner_to = parse_address("0x2222222222222222222222222222222222222222").unwrap();
        let call = ActionCall {
            to: inner_to,
            value: U256::from(7),
            data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
            operation: Operation::DelegateCall,
        };

        let data = encode_exec(target, owner(), call);
        assert_eq!(&data[..4], &[0x6a, 0x76, 0x12, 0x02]);

        let tokens = decode(
            &[
                ParamType::Address,
                ParamType::Uint(256),
                ParamType::Bytes,
                ParamType::Uint(8),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Uint(256),
                ParamType::Address,
                ParamType::Address,
                ParamType::Bytes,
            ],
            &data[4..],
        )
        .unwrap();

        assert_eq!(tokens[0], Token::Address(inner_to));
        assert_eq!(tokens[1], Token::Uint(U256::from(7)));
        assert_eq!(tokens[2], Token::Bytes(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(tokens[3], Token::Uint(U256::one()));
        for zero in &tokens[4..7] {
            assert_eq!(zero, &Token::Uint(U256::zero()));
        }
        assert_eq!(tokens[7], Token::Address(Address::zero()));
        assert_eq!(tokens[8], Token::Address(Address::zero()));
        assert_eq!(
            tokens[9],
            Token::Bytes(pre_approved_signature(owner()).to_vec())
        );
    }

    #[test]
    fn test_envelope_becomes_call_on_child() {
        let child = parse_address("0x3333333333333333333333333333333333333333").unwrap();
        let call = ActionCall::call(child, Bytes::from(vec![1, 2, 3]));
        let envelope = ExecEnvelope::new(child, owner(), call);
        let expected = envelope.encode();

        let item = envelope.into_batch_item();
        assert_eq!(item.operation, Operation::Call);
        assert_eq!(item.to, child);
        assert_eq!(item.value, U256::zero());
        assert_eq!(item.data, expected);
    }
}
