//! Native and ERC-20 transfers sent directly from the controller Safe

use crate::{
    BatchItem,
    abi::{self, TRANSFER},
    error::{ActionError, ChainError},
    parse_address, parse_amount,
    safe::ChainReader,
};
use ethers::abi::Token as AbiToken;
use ethers::types::{Address, Bytes, U256};
use ethers::utils::format_units;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const NATIVE_DECIMALS: u8 = 18;

/// ERC-20 token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, decimals: u8) -> Self {
        Self { address, decimals }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// `None` for the chain's native currency
    pub token: Option<Token>,
    pub receiver: Address,
    pub amount_wei: U256,
}

impl Transfer {
    pub fn native(receiver: Address, amount_wei: U256) -> Self {
        Self {
            token: None,
            receiver,
            amount_wei,
        }
    }

    pub fn erc20(token: Token, receiver: Address, amount_wei: U256) -> Self {
        Self {
            token: Some(token),
            receiver,
            amount_wei,
        }
    }

    pub fn decimals(&self) -> u8 {
        self.token.map_or(NATIVE_DECIMALS, |token| token.decimals)
    }

    /// Amount in whole units, e.g. `1.500000000000000000`
    pub fn amount(&self) -> String {
        format_units(self.amount_wei, u32::from(self.decimals()))
            .unwrap_or_else(|_| format!("{} wei", self.amount_wei))
    }

    pub fn as_batch_item(&self) -> BatchItem {
        match self.token {
            None => BatchItem::call(self.receiver, self.amount_wei, Bytes::new()),
            Some(token) => BatchItem::call(
                token.address,
                U256::zero(),
                abi::encode_call(
                    TRANSFER,
                    &[
                        AbiToken::Address(self.receiver),
                        AbiToken::Uint(self.amount_wei),
                    ],
                ),
            ),
        }
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token {
            None => write!(
                f,
                "TransferETH(receiver={:?}, amount={})",
                self.receiver,
                self.amount()
            ),
            Some(token) => write!(
                f,
                "Transfer(token={:?}, receiver={:?}, amount={})",
                token.address,
                self.receiver,
                self.amount()
            ),
        }
    }
}

/// Token decimals looked up once per run
pub struct DecimalsCache {
    chain: Arc<dyn ChainReader>,
    known: HashMap<Address, u8>,
}

impl DecimalsCache {
    pub fn new(chain: Arc<dyn ChainReader>) -> Self {
        Self {
            chain,
            known: HashMap::new(),
        }
    }

    pub async fn decimals(&mut self, token: Address) -> Result<u8, ChainError> {
        if let Some(decimals) = self.known.get(&token) {
            return Ok(*decimals);
        }
        info!("Fetching decimals for token {:?}", token);
        let decimals = self.chain.decimals(token).await?;
        self.known.insert(token, decimals);
        Ok(decimals)
    }
}

/// One row of a transfer file
///
/// ```json
/// [{"receiver": "0x…", "amount": "1000", "token_address": "0x…"}]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferRecord {
    pub receiver: String,
    /// Integer amount in the token's smallest unit
    pub amount: String,
    #[serde(default)]
    pub token_address: Option<String>,
}

impl TransferRecord {
    pub fn load_all(path: impl AsRef<Path>) -> anyhow::Result<Vec<Self>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate the record without touching the chain
    pub fn parse(&self) -> Result<ParsedTransfer, ActionError> {
        let token = match self.token_address.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(address) => Some(parse_address(address)?),
        };
        Ok(ParsedTransfer {
            token,
            receiver: parse_address(&self.receiver)?,
            amount_wei: parse_amount(&self.amount)?,
        })
    }

    pub async fn resolve(&self, cache: &mut DecimalsCache) -> Result<Transfer, ActionError> {
        self.parse()?.resolve(cache).await
    }
}

/// A transfer record with its fields decoded, decimals still unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTransfer {
    pub token: Option<Address>,
    pub receiver: Address,
    pub amount_wei: U256,
}

impl ParsedTransfer {
    pub async fn resolve(self, cache: &mut DecimalsCache) -> Result<Transfer, ActionError> {
        match self.token {
            None => Ok(Transfer::native(self.receiver, self.amount_wei)),
            Some(address) => {
                let decimals = cache.decimals(address).await?;
                Ok(Transfer::erc20(
                    Token::new(address, decimals),
                    self.receiver,
                    self.amount_wei,
                ))
            }
        }
    }
}

/// Resolve every record in order
///
/// All records are parsed before the first decimals lookup, so a malformed
/// row anywhere in the file fails without any chain call.
pub async fn resolve_transfers(
    records: &[TransferRecord],
    cache: &mut DecimalsCache,
) -> Result<Vec<Transfer>, ActionError> {
    let parsed = records
        .iter()
        .map(TransferRecord::parse)
        .collect::<Result<Vec<_>, _>>()?;

    let mut transfers = Vec::with_capacity(parsed.len());
    for transfer in parsed {
        transfers.push(transfer.resolve(cache).await?);
    }
    Ok(transfers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operation;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChain {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChainReader for CountingChain {
        async fn is_owner(&self, _safe: Address, _candidate: Address) -> Result<bool, ChainError> {
            Ok(true)
        }

        async fn decimals(&self, _token: Address) -> Result<u8, ChainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(6)
        }
    }

    fn receiver() -> Address {
        Address::repeat_byte(0xde)
    }

    #[test]
    fn test_native_transfer_item() {
        let item = Transfer::native(receiver(), U256::from(16)).as_batch_item();
        assert_eq!(item.operation, Operation::Call);
        assert_eq!(item.to, receiver());
        assert_eq!(item.value, U256::from(16));
        assert!(item.data.is_empty());
    }

    #[test]
    fn test_erc20_transfer_item() {
        let token = Token::new(Address::repeat_byte(0x11), 18);
        let item = Transfer::erc20(token, receiver(), U256::from(15)).as_batch_item();

        assert_eq!(item.to, token.address);
        assert!(item.value.is_zero());
        let mut expected = vec![0xa9, 0x05, 0x9c, 0xbb];
        expected.extend_from_slice(&[0u8; 12]);
        expected.extend_from_slice(receiver().as_bytes());
        expected.extend_from_slice(&abi::word(U256::from(15)));
        assert_eq!(item.data.to_vec(), expected);
    }

    #[test]
    fn test_amount_in_units() {
        let eth = Transfer::native(receiver(), U256::exp10(18) * 3 / 2);
        assert_eq!(eth.amount(), "1.500000000000000000");

        let usdc = Transfer::erc20(
            Token::new(Address::repeat_byte(0x11), 6),
            receiver(),
            U256::from(2_500_000u64),
        );
        assert_eq!(usdc.amount(), "2.500000");
    }

    #[test]
    fn test_parse_records() {
        let records: Vec<TransferRecord> = serde_json::from_str(
            r#"[
                {"receiver": "0xdededededededededededededededededededede", "amount": "10"},
                {"receiver": "0xdededededededededededededededededededede", "amount": "5",
                 "token_address": "0x1111111111111111111111111111111111111111"}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].token_address, None);
        assert!(records[1].token_address.is_some());
    }

    #[tokio::test]
    async fn test_resolve_caches_decimals() {
        let chain = Arc::new(CountingChain {
            calls: AtomicUsize::new(0),
        });
        let mut cache = DecimalsCache::new(chain.clone());
        let token = "0x1111111111111111111111111111111111111111".to_string();
        let records = vec![
            TransferRecord {
                receiver: format!("{:?}", receiver()),
                amount: "7".to_string(),
                token_address: Some(token.clone()),
            },
            TransferRecord {
                receiver: format!("{:?}", receiver()),
                amount: "8".to_string(),
                token_address: Some(token),
            },
            TransferRecord {
                receiver: format!("{:?}", receiver()),
                amount: "9".to_string(),
                token_address: Some(String::new()),
            },
        ];

        let transfers = resolve_transfers(&records, &mut cache).await.unwrap();

        assert_eq!(chain.calls.load(Ordering::SeqCst), 1);
        assert_eq!(transfers[0].decimals(), 6);
        assert_eq!(transfers[1].amount_wei, U256::from(8));
        assert_eq!(transfers[2], Transfer::native(receiver(), U256::from(9)));
    }

    #[tokio::test]
    async fn test_resolve_rejects_bad_amount() {
        let chain = Arc::new(CountingChain {
            calls: AtomicUsize::new(0),
        });
        let mut cache = DecimalsCache::new(chain);
        let record = TransferRecord {
            receiver: format!("{:?}", receiver()),
            amount: "1.5".to_string(),
            token_address: None,
        };
        assert!(matches!(
            record.resolve(&mut cache).await,
            Err(ActionError::Encoding(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_record_fails_before_any_lookup() {
        let chain = Arc::new(CountingChain {
            calls: AtomicUsize::new(0),
        });
        let mut cache = DecimalsCache::new(chain.clone());
        let records = vec![
            TransferRecord {
                receiver: format!("{:?}", receiver()),
                amount: "7".to_string(),
                token_address: Some("0x1111111111111111111111111111111111111111".to_string()),
            },
            TransferRecord {
                receiver: "0xdead".to_string(),
                amount: "8".to_string(),
                token_address: None,
            },
        ];

        let result = resolve_transfers(&records, &mut cache).await;

        assert!(matches!(result, Err(ActionError::Encoding(_))));
        assert_eq!(chain.calls.load(Ordering::SeqCst), 0);
    }
}
