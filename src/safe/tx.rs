//! Safe transaction model and its EIP-712 hash

use crate::Operation;
use ethers::abi::{self, Token};
use ethers::types::{Address, Bytes, H256, U256};
use ethers::utils::keccak256;

pub const DOMAIN_SEPARATOR_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";
pub const SAFE_TX_TYPE: &str = "SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";

/// Transaction executed by the controller Safe itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeTx {
    pub safe: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: u64,
}

impl SafeTx {
    /// Delegatecall into the MultiSend contract with gas refunds disabled
    pub fn multisend(safe: Address, multisend: Address, data: Bytes, nonce: u64) -> Self {
        Self {
            safe,
            to: multisend,
            value: U256::zero(),
            data,
            operation: Operation::DelegateCall,
            safe_tx_gas: U256::zero(),
            base_gas: U256::zero(),
            gas_price: U256::zero(),
            gas_token: Address::zero(),
            refund_receiver: Address::zero(),
            nonce,
        }
    }

    pub fn domain_separator(&self, chain_id: u64) -> H256 {
        H256::from(keccak256(abi::encode(&[
            Token::FixedBytes(keccak256(DOMAIN_SEPARATOR_TYPE).to_vec()),
            Token::Uint(U256::from(chain_id)),
            Token::Address(self.safe),
        ])))
    }

    fn struct_hash(&self) -> H256 {
        H256::from(keccak256(abi::encode(&[
            Token::FixedBytes(keccak256(SAFE_TX_TYPE).to_vec()),
            Token::Address(self.to),
            Token::Uint(self.value),
            Token::FixedBytes(keccak256(&self.data).to_vec()),
            Token::Uint(U256::from(self.operation.as_u8())),
            Token::Uint(self.safe_tx_gas),
            Token::Uint(self.base_gas),
            Token::Uint(self.gas_price),
            Token::Address(self.gas_token),
            Token::Address(self.refund_receiver),
            Token::Uint(U256::from(self.nonce)),
        ])))
    }

    /// `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ structHash)`
    pub fn hash(&self, chain_id: u64) -> H256 {
        let mut preimage = Vec::with_capacity(66);
        preimage.extend_from_slice(&[0x19, 0x01]);
        preimage.extend_from_slice(self.domain_separator(chain_id).as_bytes());
        preimage.extend_from_slice(self.struct_hash().as_bytes());
        H256::from(keccak256(preimage))
    }
}
