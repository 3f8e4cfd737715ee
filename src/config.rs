//! Configuration Module
//!
//! This module defines all configuration structures for safe-multiexec.
//! Configuration is loaded from TOML files and parsed using serde. Every
//! section except `[network]` may be omitted and falls back to defaults.

use ethers::types::Address;
use serde::Deserialize;
use std::fs;
use std::str::FromStr;

/// Main configuration structure
///
/// # Example TOML
/// ```toml
/// [network]
/// rpc_url = "https://rpc.ankr.com/eth"
/// chain_id = 1
///
/// [relay]
/// url = "https://safe-transaction-mainnet.safe.global"
///
/// [batch]
/// max_batch_size = 80
///
/// [family]
/// parent = "0x..."
/// children = ["0x...", "0x..."]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub family: FamilyConfig,
    #[serde(default)]
    pub airdrop: AirdropConfig,
    #[serde(default)]
    pub delegation: DelegationConfig,
}

/// Chain connection
///
/// # Fields
/// - `rpc_url`: JSON-RPC endpoint used for ownership checks and token decimals
/// - `chain_id`: Chain id, part of the Safe transaction hash domain
/// - `timeout_ms`: Per-call timeout (in milliseconds)
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Safe Transaction Service the signed batches are proposed to
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_relay_url")]
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Free-form origin tag shown in the Safe interface
    #[serde(default = "default_origin")]
    pub origin: String,
}

/// Batch creation configuration
///
/// # Fields
/// - `max_batch_size`: Maximum number of transactions per MultiSend batch
/// - `multisend_address`: MultiSend contract the controller delegatecalls into
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default = "default_multisend_address")]
    pub multisend_address: Address,
}

/// Parent Safe and its children; may be overridden on the command line
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FamilyConfig {
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirdropConfig {
    #[serde(default = "default_allocation_url")]
    pub allocation_url: String,
    /// Chain whose allocations are looked up
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_allocation_timeout_ms")]
    pub timeout_ms: u64,
}

/// Snapshot delegate registry
///
/// `id` is either a name (`safe.eth`) or a 32-byte hex value.
#[derive(Debug, Clone, Deserialize)]
pub struct DelegationConfig {
    #[serde(default = "default_registry")]
    pub registry: Address,
    #[serde(default = "default_delegation_id")]
    pub id: String,
}

fn default_chain_id() -> u64 {
    1
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_allocation_timeout_ms() -> u64 {
    5_000
}

fn default_relay_url() -> String {
    "https://safe-transaction-mainnet.safe.global".to_string()
}

fn default_origin() -> String {
    "safe-multiexec".to_string()
}

fn default_max_batch_size() -> usize {
    80
}

fn default_multisend_address() -> Address {
    known_address("0x40A2aCCbd92BCA938b02010E17A5b8929b49130D")
}

fn default_allocation_url() -> String {
    "https://safe-claiming-app-data.gnosis-safe.io/allocations".to_string()
}

fn default_registry() -> Address {
    known_address("0x469788fE6E9E9681C6ebF3bF78e7Fd26Fc015446")
}

fn default_delegation_id() -> String {
    "safe.eth".to_string()
}

/// Parse a hard-coded address literal
fn known_address(literal: &str) -> Address {
    Address::from_str(literal).unwrap_or_default()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: default_relay_url(),
            timeout_ms: default_timeout_ms(),
            origin: default_origin(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            multisend_address: default_multisend_address(),
        }
    }
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            allocation_url: default_allocation_url(),
            chain_id: default_chain_id(),
            timeout_ms: default_allocation_timeout_ms(),
        }
    }
}

impl Default for DelegationConfig {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            id: default_delegation_id(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.batch.max_batch_size == 0 {
            anyhow::bail!("batch.max_batch_size must be at least 1");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [network]
            rpc_url = "http://localhost:8545"
            "#,
        )
        .unwrap();

        assert_eq!(config.network.chain_id, 1);
        assert_eq!(config.batch.max_batch_size, 80);
        assert_eq!(
            config.batch.multisend_address,
            Address::from_str("0x40A2aCCbd92BCA938b02010E17A5b8929b49130D").unwrap()
        );
        assert_eq!(config.relay.url, "https://safe-transaction-mainnet.safe.global");
        assert_eq!(config.delegation.id, "safe.eth");
        assert_eq!(config.airdrop.timeout_ms, 5_000);
        assert_ne!(config.delegation.registry, Address::zero());
        assert!(config.family.parent.is_none());
        assert!(config.family.children.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [network]
            rpc_url = "http://localhost:8545"
            chain_id = 100
            timeout_ms = 2000

            [relay]
            url = "http://localhost:8000"
            origin = "ops"

            [batch]
            max_batch_size = 10
            multisend_address = "0x1111111111111111111111111111111111111111"

            [family]
            parent = "0x2222222222222222222222222222222222222222"
            children = ["0x3333333333333333333333333333333333333333"]

            [delegation]
            id = "cow.eth"
            "#,
        )
        .unwrap();

        assert_eq!(config.network.chain_id, 100);
        assert_eq!(config.relay.timeout_ms, 10_000);
        assert_eq!(config.relay.origin, "ops");
        assert_eq!(config.batch.max_batch_size, 10);
        assert_eq!(config.batch.multisend_address, Address::repeat_byte(0x11));
        assert_eq!(config.family.children.len(), 1);
        assert_eq!(config.delegation.id, "cow.eth");
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let result = Config::parse(
            r#"
            [network]
            rpc_url = "http://localhost:8545"
            [batch]
            max_batch_size = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_network_fails() {
        assert!(Config::parse("[batch]\nmax_batch_size = 5\n").is_err());
    }
}
