//! safe-multiexec batches administrative actions over a family of Safe
//! accounts. A controller Safe that owns many child Safes executes one call
//! per child through MultiSend batches, signed by a single proposer key and
//! submitted to a Safe Transaction Service.

pub mod abi; // Contract method signatures and call encoding.
pub mod actions; // Per-child calls for each supported command.
pub mod batch; // Partitioning, MultiSend packing, nonces and the pipeline.
pub mod config; // Defines and loads configuration.
pub mod context; // Run-scoped wiring of clients.
pub mod error; // Error types for every stage.
pub mod relay; // Transaction service client and submission gate.
pub mod safe; // Safe transaction hashing, signing and exec envelopes.
pub mod types; // Common data structures.

// Re-export commonly used types and configurations for easier access.
pub use batch::BatchOrchestrator;
pub use config::Config;
pub use context::RunContext;
pub use types::*;
