//! EVM Chain Support Module
//!
//! Everything that touches a node: contract bindings, the RPC seams the
//! bridge operations are written against, and the alloy client that backs
//! them on both layers.
//!
//! ## Submodules
//!
//! - `calls` - Encoding sol! calls into requests and decoding read results
//! - `client` - `ChainRpc`/`ZksRpc` seams and the alloy-backed `EvmClient`
//! - `contracts` - Hub, bridge and system contract bindings using alloy sol! macro
//! - `tokens` - ERC20 metadata, allowance and approve helpers

pub mod calls;
pub mod client;
pub mod contracts;
pub mod tokens;

// Re-export commonly used items
pub use client::{ChainRpc, EvmClient, EvmClientConfig, ZksRpc};
pub use contracts::{IBridgehub, IL1SharedBridge, IL2SharedBridge, ERC20};
pub use tokens::{ensure_allowance, get_token_info, TokenInfo};
