//! Batch Module
//!
//! This module turns ordered calls into submitted MultiSend batches:
//! - partition: splits items into size-bounded, order-preserving chunks
//! - multisend: packs a chunk into `multiSend(bytes)` calldata
//! - nonce: assigns consecutive controller nonces to chunks
//! - BatchOrchestrator: runs the whole pipeline

mod multisend;
mod nonce;
mod partition;
pub mod orchestrator;


pub use multisend::{encode_batch, pack_transactions};
pub use nonce::sequence;
pub use orchestrator::BatchOrchestrator;
pub use partition::partition;
