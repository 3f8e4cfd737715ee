//! Safe Module
//!
//! Everything specific to Safe smart accounts:
//! - ExecEnvelope: `execTransaction` calldata with a pre-approved owner signature
//! - SafeTx: the controller's own transaction and its EIP-712 hash
//! - SafeSigner: signs that hash with the proposer key
//! - SafeFamily / ChainReader: child Safes and read-only ownership checks

mod account;
mod exec;
mod signer;
mod tx;

pub use account::{ChainReader, EthChain, SafeFamily};
pub use exec::{ExecEnvelope, SIGNATURE_LEN, encode_exec, pre_approved_signature};
pub use signer::SafeSigner;
pub use tx::SafeTx;
