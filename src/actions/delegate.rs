//! Snapshot delegate registry

use crate::{
    ActionCall,
    abi::{self, CLEAR_DELEGATE, SET_DELEGATE},
    actions::ActionBuilder,
    error::{ActionError, EncodingError},
    parse_fixed,
};
use async_trait::async_trait;
use ethers::abi::Token;
use ethers::types::Address;
use std::fmt;
use std::str::FromStr;

/// Delegation namespace, stored on chain as `bytes32`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelegationId([u8; 32]);

impl DelegationId {
    /// UTF-8 bytes of `value`, right-padded with zeros
    pub fn from_text(value: &str) -> Result<Self, EncodingError> {
        let raw = value.as_bytes();
        if raw.len() > 32 {
            return Err(EncodingError::InvalidLength {
                input: value.to_string(),
                expected: 32,
                actual: raw.len(),
            });
        }
        let mut id = [0u8; 32];
        id[..raw.len()].copy_from_slice(raw);
        Ok(Self(id))
    }

    pub fn from_hex(value: &str) -> Result<Self, EncodingError> {
        parse_fixed::<32>(value).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

/// `0x` + 64 hex digits is read as raw bytes, anything else as text
impl FromStr for DelegationId {
    type Err = EncodingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() == 66 && value.starts_with("0x") {
            Self::from_hex(value)
        } else {
            Self::from_text(value)
        }
    }
}

impl fmt::Display for DelegationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = String::from_utf8_lossy(&self.0);
        write!(f, "{}", text.replace('\0', ""))
    }
}

/// Delegate the child's votes in `id` to the parent
pub struct SetDelegate {
    registry: Address,
    id: DelegationId,
}

impl SetDelegate {
    pub fn new(registry: Address, id: DelegationId) -> Self {
        Self { registry, id }
    }
}

#[async_trait]
impl ActionBuilder for SetDelegate {
    async fn build(&self, parent: Address, _child: Address) -> Result<Vec<ActionCall>, ActionError> {
        let data = abi::encode_call(
            SET_DELEGATE,
            &[
                Token::FixedBytes(self.id.as_bytes().to_vec()),
                Token::Address(parent),
            ],
        );
        Ok(vec![ActionCall::call(self.registry, data)])
    }
}

pub struct ClearDelegate {
    registry: Address,
    id: DelegationId,
}

impl ClearDelegate {
    pub fn new(registry: Address, id: DelegationId) -> Self {
        Self { registry, id }
    }
}

#[async_trait]
impl ActionBuilder for ClearDelegate {
    async fn build(&self, _parent: Address, _child: Address) -> Result<Vec<ActionCall>, ActionError> {
        let data = abi::encode_call(
            CLEAR_DELEGATE,
            &[Token::FixedBytes(self.id.as_bytes().to_vec())],
        );
        Ok(vec![ActionCall::call(self.registry, data)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::{ParamType, decode};

    const SAFE_ETH_HEX: &str = "0x736166652e657468000000000000000000000000000000000000000000000000";

    #[test]
    fn test_id_from_text_and_hex_agree() {
        let from_text = DelegationId::from_text("safe.eth").unwrap();
        let from_hex = DelegationId::from_hex(SAFE_ETH_HEX).unwrap();

        assert_eq!(from_text, from_hex);
        assert_eq!(from_text.to_hex(), SAFE_ETH_HEX);
        assert_eq!(from_hex.to_string(), "safe.eth");
    }

    #[test]
    fn test_id_from_str_dispatch() {
        assert_eq!(
            "safe.eth".parse::<DelegationId>().unwrap(),
            SAFE_ETH_HEX.parse::<DelegationId>().unwrap()
        );
        // short hex-looking strings are names
        assert_eq!("0xabc".parse::<DelegationId>().unwrap().to_string(), "0xabc");
    }

    #[test]
    fn test_id_too_long() {
        let long = "a".repeat(33);
        assert_eq!(
            DelegationId::from_text(&long),
            Err(EncodingError::InvalidLength {
                input: long.clone(),
                expected: 32,
                actual: 33
            })
        );
        assert!(DelegationId::from_text(&long[..32]).is_ok());
    }

    #[tokio::test]
    async fn test_set_delegate_points_to_parent() {
        let registry = Address::repeat_byte(0x46);
        let parent = Address::repeat_byte(0x99);
        let id = DelegationId::from_text("safe.eth").unwrap();

        let calls = SetDelegate::new(registry, id)
            .build(parent, Address::repeat_byte(1))
            .await
            .unwrap();

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].to, registry);
        assert_eq!(&calls[0].data[..4], &abi::selector(SET_DELEGATE));
        let args = decode(&[ParamType::FixedBytes(32), ParamType::Address], &calls[0].data[4..]).unwrap();
        assert_eq!(args[0], Token::FixedBytes(id.as_bytes().to_vec()));
        assert_eq!(args[1], Token::Address(parent));
    }

    #[tokio::test]
    async fn test_clear_delegate() {
        let registry = Address::repeat_byte(0x46);
        let id = DelegationId::from_text("safe.eth").unwrap();

        let calls = ClearDelegate::new(registry, id)
            .build(Address::zero(), Address::repeat_byte(1))
            .await
            .unwrap();

        let mut expected = abi::selector(CLEAR_DELEGATE).to_vec();
        expected.extend_from_slice(id.as_bytes());
        assert_eq!(calls[0].data.to_vec(), expected);
        assert_eq!(calls[0].to, registry);
    }
}
