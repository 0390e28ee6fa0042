//! Bridge Errors
//!
//! Every operation surfaces failures as [`BridgeError`]. Nothing is retried
//! internally; the lookup-miss variants (`TxHashNotFoundInLogs`,
//! `MessageLogNotFound`, `WithdrawalLogNotFound`) usually mean the operation
//! is still processing and are worth retrying with backoff.

use alloy::primitives::{TxHash, U256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    // ========================================================================
    // Client Errors
    // ========================================================================
    #[error("Account not found: a signer is required to submit transactions")]
    AccountNotFound,

    #[error("Chain not configured: the client carries no chain id")]
    ChainNotConfigured,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ========================================================================
    // Cost Errors
    // ========================================================================
    #[error(
        "The base cost of performing the priority operation is higher than the provided transaction value parameter. Base cost: {base_cost}. Provided value: {value}."
    )]
    BaseCostExceedsValue { base_cost: U256, value: U256 },

    // ========================================================================
    // Lookup Errors
    // ========================================================================
    #[error("The transaction hash not found in event logs.")]
    TxHashNotFoundInLogs,

    #[error(
        "L2->L1 message log with hash {hash} not found. Either the transaction is still processing or it did not finish successfully."
    )]
    MessageLogNotFound { hash: TxHash },

    #[error(
        "Withdrawal log with hash {hash} not found. Either the withdrawal transaction is still processing or it did not finish successfully."
    )]
    WithdrawalLogNotFound { hash: TxHash },

    #[error("Transaction receipt not found: {hash}")]
    ReceiptNotFound { hash: TxHash },

    #[error("Unrecognized withdrawal message with selector {selector}")]
    UnrecognizedWithdrawalMessage { selector: String },

    // ========================================================================
    // Guard Rails
    // ========================================================================
    #[error("Cannot claim successful deposit.")]
    CannotClaimSuccessfulDeposit,

    // ========================================================================
    // Execution Errors
    // ========================================================================
    #[error("Transaction reverted: {reason}")]
    TransactionReverted { reason: String },

    #[error("Transaction failed on-chain: {hash}")]
    TransactionFailed { hash: TxHash },

    #[error("RPC {method} failed: {message}")]
    Rpc { method: String, message: String },

    #[error("ABI decoding failed: {0}")]
    Abi(#[from] alloy::sol_types::Error),
}

impl BridgeError {
    /// Classify a node error, separating reverts from transport failures
    pub fn from_rpc(method: &str, err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        if message.to_ascii_lowercase().contains("revert") {
            Self::TransactionReverted { reason: message }
        } else {
            Self::Rpc {
                method: method.to_string(),
                message,
            }
        }
    }

    /// Whether the error reflects a lookup that may succeed later
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::TxHashNotFoundInLogs
                | Self::MessageLogNotFound { .. }
                | Self::WithdrawalLogNotFound { .. }
                | Self::ReceiptNotFound { .. }
        )
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
