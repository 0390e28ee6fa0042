//! Cross-Layer Message Locator
//!
//! Finds L2->L1 system messages in an L2 receipt. Two kinds matter here:
//!
//! - Priority-operation status logs, sent by the bootloader with the L2 tx
//!   hash as key and a zero value on failure
//! - Withdrawal messages, sent through the L1 messenger; the message body is
//!   only in the paired `L1MessageSent` event log
//!
//! A miss is the expected signal that the transaction is still processing.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::{SolCall, SolEvent};
use tracing::debug;

use crate::address_codec::address_from_topic;
use crate::constants::{BOOTLOADER_FORMAL_ADDRESS, L1_MESSENGER_ADDRESS};
use crate::error::{BridgeError, BridgeResult};
use crate::evm::contracts::{IL1ERC20Bridge, IL1Messenger, IMailbox};
use crate::types::{L2ToL1Message, L2TransactionReceipt};

// ============================================================================
// Predicates
// ============================================================================

/// Status log of the priority operation `tx_hash`
pub fn is_status_log_for(tx_hash: B256) -> impl Fn(&L2ToL1Message) -> bool {
    move |message| message.sender == BOOTLOADER_FORMAL_ADDRESS && message.key == tx_hash
}

pub fn is_bootloader_log(message: &L2ToL1Message) -> bool {
    message.sender == BOOTLOADER_FORMAL_ADDRESS
}

pub fn is_messenger_log(message: &L2ToL1Message) -> bool {
    message.sender == L1_MESSENGER_ADDRESS
}

// ============================================================================
// Lookup
// ============================================================================

/// The `nth` entry of `l2ToL1Logs` matching `predicate`, with its index in the receipt
pub fn locate_nth_message<P>(
    receipt: &L2TransactionReceipt,
    predicate: P,
    nth: usize,
) -> BridgeResult<(usize, &L2ToL1Message)>
where
    P: Fn(&L2ToL1Message) -> bool,
{
    receipt
        .l2_to_l1_logs
        .iter()
        .enumerate()
        .filter(|(_, message)| predicate(message))
        .nth(nth)
        .ok_or_else(|| {
            debug!(tx_hash = %receipt.transaction_hash, nth = nth, "L2->L1 message not found");
            BridgeError::MessageLogNotFound {
                hash: receipt.transaction_hash,
            }
        })
}

/// First entry of `l2ToL1Logs` matching `predicate`
pub fn locate_message<P>(
    receipt: &L2TransactionReceipt,
    predicate: P,
) -> BridgeResult<(usize, &L2ToL1Message)>
where
    P: Fn(&L2ToL1Message) -> bool,
{
    locate_nth_message(receipt, predicate, 0)
}

// ============================================================================
// Withdrawals
// ============================================================================

/// A withdrawal message together with its position in the receipt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedWithdrawal {
    /// L2 contract that sent the message (base token contract or a bridge)
    pub l2_sender: Address,
    pub message: Bytes,
    /// Index of the matching entry in `l2ToL1Logs`
    pub l2_to_l1_log_index: usize,
    pub l1_batch_number: Option<u64>,
    pub l1_batch_tx_index: Option<u64>,
}

/// The `index`-th withdrawal of an L2 transaction
pub fn find_withdrawal(
    receipt: &L2TransactionReceipt,
    index: usize,
) -> BridgeResult<LocatedWithdrawal> {
    let not_found = || BridgeError::WithdrawalLogNotFound {
        hash: receipt.transaction_hash,
    };

    let (l2_sender, message) = receipt
        .logs
        .iter()
        .filter(|log| {
            log.address() == L1_MESSENGER_ADDRESS
                && log.topics().first() == Some(&IL1Messenger::L1MessageSent::SIGNATURE_HASH)
        })
        .nth(index)
        .and_then(|log| {
            let sender = address_from_topic(log.topics().get(1)?);
            let event = IL1Messenger::L1MessageSent::decode_log_data(log.data(), true).ok()?;
            Some((sender, event._message))
        })
        .ok_or_else(not_found)?;

    let (l2_to_l1_log_index, entry) =
        locate_nth_message(receipt, is_messenger_log, index).map_err(|_| not_found())?;

    Ok(LocatedWithdrawal {
        l2_sender,
        message,
        l2_to_l1_log_index,
        l1_batch_number: entry
            .l1_batch_number
            .map(|n| n.to::<u64>())
            .or_else(|| receipt.batch_number()),
        l1_batch_tx_index: receipt.batch_tx_index(),
    })
}

/// Decoded withdrawal message, in one of the layouts the L1 bridge accepts
///
/// ```text
/// base token: finalizeEthWithdrawal selector | receiver (20) | amount (32)
/// erc20:      finalizeWithdrawal selector    | receiver (20) | l1Token (20) | amount (32)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalMessage {
    BaseToken {
        receiver: Address,
        amount: U256,
    },
    Erc20 {
        receiver: Address,
        l1_token: Address,
        amount: U256,
    },
}

impl WithdrawalMessage {
    pub fn parse(message: &[u8]) -> BridgeResult<Self> {
        let unrecognized = || BridgeError::UnrecognizedWithdrawalMessage {
            selector: alloy::hex::encode_prefixed(&message[..message.len().min(4)]),
        };
        if message.len() < 4 {
            return Err(unrecognized());
        }
        let selector = &message[..4];

        if selector == IMailbox::finalizeEthWithdrawalCall::SELECTOR.as_slice() {
            if message.len() < 56 {
                return Err(unrecognized());
            }
            return Ok(Self::BaseToken {
                receiver: Address::from_slice(&message[4..24]),
                amount: U256::from_be_slice(&message[24..56]),
            });
        }

        if selector == IL1ERC20Bridge::finalizeWithdrawalCall::SELECTOR.as_slice() {
            if message.len() < 76 {
                return Err(unrecognized());
            }
            return Ok(Self::Erc20 {
                receiver: Address::from_slice(&message[4..24]),
                l1_token: Address::from_slice(&message[24..44]),
                amount: U256::from_be_slice(&message[44..76]),
            });
        }

        Err(unrecognized())
    }

    pub fn receiver(&self) -> Address {
        match self {
            Self::BaseToken { receiver, .. } | Self::Erc20 { receiver, .. } => *receiver,
        }
    }

    pub fn amount(&self) -> U256 {
        match self {
            Self::BaseToken { amount, .. } | Self::Erc20 { amount, .. } => *amount,
        }
    }

    /// L1 token released, given the chain's base token
    pub fn l1_token(&self, base_token: Address) -> Address {
        match self {
            Self::BaseToken { .. } => base_token,
            Self::Erc20 { l1_token, .. } => *l1_token,
        }
    }
}
