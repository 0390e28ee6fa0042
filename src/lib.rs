//! Bridgehub-RS: L1 <-> L2 Bridge Client
//!
//! Moves value between an Ethereum L1 and a hub-registered L2 chain:
//!
//! - **Topology** - Hub, default bridges and base token of the connected chain
//! - **Fees** - Base cost of priority operations and L1 fee estimation
//! - **Deposits** - Route selection across ETH/ERC20 and native/custom base tokens
//! - **Priority Operations** - L1->L2 correlation, confirmations, `request_execute`
//! - **Messages** - Locating L2->L1 status logs and withdrawal messages
//! - **Finalization** - Inclusion proofs, withdrawal finalization, failed-deposit claims
//! - **EVM Module** - Contract bindings, RPC seams and the alloy-backed client
//! - **Testing Module** - In-memory chain and fixtures for unit and E2E tests
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! bridgehub-rs = { path = "../bridgehub-rs" }
//! ```
//!
//! ```ignore
//! use bridgehub_rs::{deposit, BridgeConfig, DepositRequest};
//! use alloy::primitives::{Address, U256};
//!
//! let config = BridgeConfig::load()?;
//! let (l1, l2) = config.connect().await?;
//! let request = DepositRequest::new(Address::ZERO, U256::from(7_000_000_000u64))
//!     .with_margins(config.margins);
//! let l1_tx = deposit(&l1, &l2, request).await?;
//! ```
//!
//! ## Feature Flags
//!
//! - `testing` - Expose the in-memory chain and fixtures to downstream tests

// Core modules
pub mod address_codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod redact;
pub mod types;

// Chain access
pub mod evm;

// Bridge operations
pub mod deposit;
pub mod fees;
pub mod finalization;
pub mod messages;
pub mod priority;
pub mod topology;
pub mod withdraw;

// Testing utilities (feature-gated)
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used items at the crate root
pub use address_codec::{apply_l1_to_l2_alias, is_eth, normalize_token, undo_l1_to_l2_alias};
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use evm::{ChainRpc, EvmClient, EvmClientConfig, ZksRpc};

pub use deposit::{deposit, plan_deposit, DepositPlan, DepositRoute};
pub use finalization::{
    claim_failed_deposit, finalize_withdrawal, finalize_withdrawal_params, get_proof,
    is_withdrawal_finalized, withdrawal_status, FinalizeWithdrawalParams, FinalizedWithdrawal,
};
pub use messages::{find_withdrawal, WithdrawalMessage};
pub use priority::{
    derive_l2_hash, get_priority_op_confirmation, l2_hash_from_priority_op, request_execute,
    ExecuteRequest, PriorityOpConfirmation,
};
pub use topology::{get_l2_token_address, main_contract, resolve_topology};
pub use types::{
    BridgeAddressSet, ChainContext, DepositRequest, InclusionProof, SafetyMargins, TxOverrides,
    WithdrawalFinalizationState,
};
pub use withdraw::{l2_withdrawal_token, withdraw, WithdrawRequest};
