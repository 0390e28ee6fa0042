//! Test Fixtures
//!
//! Addresses of a local L1 + L2 deployment and builders for the logs and
//! receipts the bridge flows consume.

use alloy::{
    primitives::{address, b256, keccak256, Address, Bytes, LogData, TxHash, B256, U256, U64},
    rpc::types::Log,
    sol_types::{SolCall, SolEvent, SolValue},
};

use crate::constants::{BOOTLOADER_FORMAL_ADDRESS, L1_MESSENGER_ADDRESS};
use crate::evm::contracts::{IL1ERC20Bridge, IL1Messenger, IMailbox};
use crate::types::{BridgeAddressSet, L2ToL1LogProof, L2ToL1Message, L2TransactionReceipt};

// ============================================================================
// Deployment
// ============================================================================

pub const L1_CHAIN_ID: u64 = 9;
pub const L2_CHAIN_ID: u64 = 270;

pub const SIGNER: Address = address!("36615cf349d7f6344891b1e7ca7c72883f5dc049");
pub const BRIDGEHUB: Address = address!("35a54c8c757806eb6820629bc82d90e056394c92");
pub const MAIN_CONTRACT: Address = address!("9fab5aec650f1ce6e35ec60a611af0a1345927c8");
pub const SHARED_L1: Address = address!("648afeaf09a3db988ac41b786001235bbdbc7640");
pub const SHARED_L2: Address = address!("fd61c893b903fa133908ce83dfef67c4c2350dd8");
pub const LEGACY_L1: Address = address!("be270c78209cfda84310230aaa82e18936310b2e");
pub const DAI_L1: Address = address!("70a0f165d6f8054d0d0cf8dfd4dd2005f0af6b55");
pub const DAI_L2: Address = address!("ce5c4d2a2b5d2f6f8d6f6a8e1c0b9e1c6c1f1a0b");
pub const CUSTOM_BASE_TOKEN: Address = address!("2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a");

pub const DEPOSIT_TX: TxHash =
    b256!("15c295874fe9ad8f6708def4208119c68999f7a76ac6447c111e658ba6bfaa1e");
pub const WITHDRAWAL_TX: TxHash =
    b256!("08ac22b6d5d048ae8a486aa41a058bb01d82bdca6489760414aa15f61f27b943");

pub fn bridge_addresses() -> BridgeAddressSet {
    BridgeAddressSet {
        shared_l1: SHARED_L1,
        shared_l2: SHARED_L2,
        legacy_l1: Some(LEGACY_L1),
        legacy_l2: Some(SHARED_L2),
    }
}

// ============================================================================
// Logs
// ============================================================================

pub fn rpc_log(address: Address, data: LogData) -> Log {
    Log {
        inner: alloy::primitives::Log { address, data },
        ..Default::default()
    }
}

/// `NewPriorityRequest` as emitted by a chain's diamond proxy
pub fn priority_request_log(contract: Address, l2_tx_hash: B256) -> Log {
    let event = IMailbox::NewPriorityRequest {
        txId: U256::from(42u64),
        txHash: l2_tx_hash,
        expirationTimestamp: 1_700_000_000,
        transaction: IMailbox::L2CanonicalTransaction {
            txType: U256::from(255u64),
            from: U256::from_be_slice(SIGNER.as_slice()),
            to: U256::from_be_slice(SIGNER.as_slice()),
            gasLimit: U256::from(600_000u64),
            gasPerPubdataByteLimit: U256::from(800u64),
            maxFeePerGas: U256::ZERO,
            maxPriorityFeePerGas: U256::ZERO,
            paymaster: U256::ZERO,
            nonce: U256::from(42u64),
            value: U256::from(7_000_000_000u64),
            reserved: [U256::ZERO; 4],
            data: Bytes::new(),
            signature: Bytes::new(),
            factoryDeps: Vec::new(),
            paymasterInput: Bytes::new(),
            reservedDynamic: Bytes::new(),
        },
        factoryDeps: Vec::new(),
    };
    rpc_log(contract, event.encode_log_data())
}

/// `L1MessageSent` from the L1 messenger carrying a withdrawal message
pub fn l1_message_sent_log(sender: Address, message: Bytes) -> Log {
    let event = IL1Messenger::L1MessageSent {
        _sender: sender,
        _hash: keccak256(&message),
        _message: message,
    };
    rpc_log(L1_MESSENGER_ADDRESS, event.encode_log_data())
}

/// Withdrawal message of the L2 base token contract
pub fn base_token_withdrawal_message(receiver: Address, amount: U256) -> Bytes {
    let mut message = IMailbox::finalizeEthWithdrawalCall::SELECTOR.to_vec();
    message.extend_from_slice(receiver.as_slice());
    message.extend_from_slice(&amount.to_be_bytes::<32>());
    Bytes::from(message)
}

/// Withdrawal message of the L2 shared bridge
pub fn erc20_withdrawal_message(receiver: Address, l1_token: Address, amount: U256) -> Bytes {
    let mut message = IL1ERC20Bridge::finalizeWithdrawalCall::SELECTOR.to_vec();
    message.extend_from_slice(receiver.as_slice());
    message.extend_from_slice(l1_token.as_slice());
    message.extend_from_slice(&amount.to_be_bytes::<32>());
    Bytes::from(message)
}

// ============================================================================
// Receipts
// ============================================================================

pub fn l2_to_l1_message(sender: Address, key: B256, value: B256) -> L2ToL1Message {
    L2ToL1Message {
        sender,
        key,
        value,
        l1_batch_number: Some(U64::from(7u64)),
        tx_index_in_l1_batch: Some(U64::from(2u64)),
        log_index_in_receipt: 0,
    }
}

/// Mined L2 receipt in batch 7 at position 2, without logs
pub fn l2_receipt(hash: TxHash, from: Address) -> L2TransactionReceipt {
    L2TransactionReceipt {
        transaction_hash: hash,
        from,
        to: None,
        status: Some(U64::from(1u64)),
        l1_batch_number: Some(U64::from(7u64)),
        l1_batch_tx_index: Some(U64::from(2u64)),
        logs: Vec::new(),
        l2_to_l1_logs: Vec::new(),
    }
}

pub fn push_l2_to_l1_log(receipt: &mut L2TransactionReceipt, mut message: L2ToL1Message) {
    message.log_index_in_receipt = receipt.l2_to_l1_logs.len();
    receipt.l2_to_l1_logs.push(message);
}

/// Receipt of a priority operation with the bootloader status log
pub fn priority_op_receipt(hash: TxHash, from: Address, succeeded: bool) -> L2TransactionReceipt {
    let mut receipt = l2_receipt(hash, from);
    let value = if succeeded {
        B256::with_last_byte(1)
    } else {
        B256::ZERO
    };
    push_l2_to_l1_log(
        &mut receipt,
        l2_to_l1_message(BOOTLOADER_FORMAL_ADDRESS, hash, value),
    );
    receipt
}

/// Receipt of a withdrawal that emitted `message` from `l2_sender`
pub fn withdrawal_receipt(
    hash: TxHash,
    l2_sender: Address,
    message: Bytes,
) -> L2TransactionReceipt {
    let mut receipt = l2_receipt(hash, SIGNER);
    let message_hash = keccak256(&message);
    receipt.logs.push(l1_message_sent_log(l2_sender, message));
    push_l2_to_l1_log(
        &mut receipt,
        l2_to_l1_message(L1_MESSENGER_ADDRESS, l2_sender.into_word(), message_hash),
    );
    receipt
}

pub fn log_proof(id: u64) -> L2ToL1LogProof {
    L2ToL1LogProof {
        id,
        proof: vec![
            b256!("010f000000000000000000000000000000000000000000000000000000000000"),
            b256!("72abee45b59e344af8a6e520241c4744aff26ed411f4c4b00f8af09adada43ba"),
        ],
        root: b256!("00000000000000000000000000000000000000000000000000000000000000aa"),
    }
}

/// Abi-encoded word for a mocked contract return
pub fn word<T: SolValue>(value: T) -> Vec<u8> {
    value.abi_encode()
}
