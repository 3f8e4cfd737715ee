//! Nonce Sequencing
//!
//! Reads the controller's nonce once and hands out consecutive values, one
//! per partition. Another process proposing for the same controller during
//! the run will collide with these nonces; nothing here guards against it.

use crate::{error::RelayError, relay::RelayClient};
use ethers::types::Address;
use tracing::debug;

pub async fn sequence(
    relay: &dyn RelayClient,
    controller: Address,
    count: usize,
) -> Result<Vec<u64>, RelayError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let base = relay.get_nonce(controller).await?;
    debug!("Nonce snapshot for {:?}: {} ({} partitions)", controller, base, count);
    Ok((0..count as u64).map(|i| base + i).collect())
}
