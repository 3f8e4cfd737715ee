//! Proposer key handling
//!
//! Signs Safe transaction hashes with the one private key supplied for the
//! run. Signatures are plain ECDSA over the EIP-712 hash (no message prefix)
//! with `v` in {27, 28}, the form Safe contracts verify for owner EOAs.

use crate::error::SignerError;
use ethers::core::k256::ecdsa::SigningKey;
use ethers::signers::{LocalWallet, Signer as _};
use ethers::types::{Address, H256, Signature};

pub struct SafeSigner {
    wallet: LocalWallet,
}

impl SafeSigner {
    /// Private key as hex, with or without `0x`
    pub fn from_hex(private_key: &str) -> Result<Self, SignerError> {
        let key_hex = private_key.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);
        let key_bytes = hex::decode(key_hex)
            .map_err(|e| SignerError::InvalidCredential(format!("invalid private key hex: {}", e)))?;
        Self::from_bytes(&key_bytes)
    }

    pub fn from_bytes(key_bytes: &[u8]) -> Result<Self, SignerError> {
        if key_bytes.len() != 32 {
            return Err(SignerError::InvalidCredential(format!(
                "private key must be 32 bytes, got {}",
                key_bytes.len()
            )));
        }
        let signing_key = SigningKey::from_bytes(key_bytes.into())
            .map_err(|e| SignerError::InvalidCredential(format!("invalid private key: {}", e)))?;

        Ok(Self {
            wallet: LocalWallet::from(signing_key),
        })
    }

    /// Owner address derived from the key
    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn sign(&self, safe_tx_hash: H256) -> Result<Signature, SignerError> {
        self.wallet
            .sign_hash(safe_tx_hash)
            .map_err(|e| SignerError::InvalidCredential(e.to_string()))
    }
}

impl std::fmt::Debug for SafeSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_address;

    // Hardhat account #0, never use outside tests
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_address_from_key() {
        let signer = SafeSigner::from_hex(TEST_KEY).unwrap();
        assert_eq!(
            signer.address(),
            parse_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266").unwrap()
        );

        let bare = SafeSigner::from_hex(TEST_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(bare.address(), signer.address());
    }

    #[test]
    fn test_sign_is_deterministic_and_recoverable() {
        let signer = SafeSigner::from_hex(TEST_KEY).unwrap();
        let hash = H256::repeat_byte(0x42);

        let first = signer.sign(hash).unwrap();
        let second = signer.sign(hash).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_vec().len(), 65);
        assert!(first.v == 27 || first.v == 28);
        assert_eq!(first.recover(hash).unwrap(), signer.address());
    }

    #[test]
    fn test_rejects_bad_credentials() {
        assert!(matches!(
            SafeSigner::from_hex("not-hex"),
            Err(SignerError::InvalidCredential(_))
        ));
        assert!(matches!(
            SafeSigner::from_hex("0xabcd"),
            Err(SignerError::InvalidCredential(_))
        ));
        // zero is not a valid secp256k1 scalar
        assert!(matches!(
            SafeSigner::from_hex(&"0".repeat(64)),
            Err(SignerError::InvalidCredential(_))
        ));
    }
}
