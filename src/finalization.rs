//! Proof & Finalization Engine
//!
//! Completes the L1 side of L2->L1 flows:
//!
//! - Withdrawals: locate the withdrawal message, fetch its inclusion proof and
//!   call `finalizeWithdrawal` on the L1 bridge paired with the L2 sender
//! - Failed deposits: prove the zero-status log of a priority operation and
//!   call `claimFailedDeposit` on the L1 bridge that originated it
//!
//! Whether a withdrawal can be finalized twice is decided on L1; a duplicate
//! surfaces as [`BridgeError::TransactionReverted`].

use alloy::{
    primitives::{Address, Bytes, TxHash, B256, U256},
    sol_types::SolCall,
};
use tracing::{debug, info, warn};

use crate::address_codec::undo_l1_to_l2_alias;
use crate::constants::L2_BASE_TOKEN_ADDRESS;
use crate::error::{BridgeError, BridgeResult};
use crate::evm::calls::{read_contract, submit_request};
use crate::evm::client::{ChainRpc, ZksRpc};
use crate::evm::contracts::{IL1SharedBridge, IL2SharedBridge};
use crate::messages::{find_withdrawal, is_status_log_for, locate_message, WithdrawalMessage};
use crate::topology::resolve_topology;
use crate::types::{
    BridgeAddressSet, InclusionProof, L2TransactionReceipt, TxOverrides,
    WithdrawalFinalizationState,
};

// ============================================================================
// Proofs
// ============================================================================

async fn fetch_receipt<R: ZksRpc + ?Sized>(
    l2: &R,
    hash: TxHash,
) -> BridgeResult<L2TransactionReceipt> {
    l2.l2_transaction_receipt(hash)
        .await?
        .ok_or(BridgeError::ReceiptNotFound { hash })
}

/// Inclusion proof of the `log_index`-th L2->L1 log of `hash`
///
/// `None` until the node can prove the log, i.e. until its batch is committed.
pub async fn get_proof<R: ZksRpc + ?Sized>(
    l2: &R,
    hash: TxHash,
    log_index: usize,
) -> BridgeResult<Option<InclusionProof>> {
    let Some(raw) = l2.l2_to_l1_log_proof(hash, log_index).await? else {
        return Ok(None);
    };
    let Some(batch_number) = fetch_receipt(l2, hash).await?.batch_number() else {
        return Ok(None);
    };
    Ok(Some(InclusionProof::new(batch_number, raw)))
}

// ============================================================================
// Bridge Selection
// ============================================================================

/// L1 bridge that finalizes messages sent by `l2_sender`
///
/// Base-token withdrawals go through the shared bridge; anything else asks
/// the L2 bridge for its L1 counterpart, which covers custom bridges.
pub async fn l1_bridge_for<R: ZksRpc + ?Sized>(
    l2: &R,
    bridges: &BridgeAddressSet,
    l2_sender: Address,
) -> BridgeResult<Address> {
    if l2_sender == L2_BASE_TOKEN_ADDRESS {
        return Ok(bridges.shared_l1);
    }
    let bridge = read_contract(l2, l2_sender, IL2SharedBridge::l1SharedBridgeCall {}).await?;
    Ok(bridge._0)
}

// ============================================================================
// Withdrawals
// ============================================================================

/// Arguments of `finalizeWithdrawal` for one withdrawal message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeWithdrawalParams {
    pub l1_batch_number: u64,
    pub l2_message_index: u64,
    pub l2_tx_number_in_batch: u16,
    pub message: Bytes,
    pub sender: Address,
    pub proof: Vec<B256>,
}

/// Collect the proof data needed to finalize the `index`-th withdrawal of `hash`
pub async fn finalize_withdrawal_params<R: ZksRpc + ?Sized>(
    l2: &R,
    hash: TxHash,
    index: usize,
) -> BridgeResult<FinalizeWithdrawalParams> {
    let receipt = fetch_receipt(l2, hash).await?;
    let located = find_withdrawal(&receipt, index)?;
    let pending = || BridgeError::WithdrawalLogNotFound { hash };

    let proof = l2
        .l2_to_l1_log_proof(hash, located.l2_to_l1_log_index)
        .await?
        .ok_or_else(pending)?;
    let l1_batch_number = located.l1_batch_number.ok_or_else(pending)?;
    let tx_index = located.l1_batch_tx_index.ok_or_else(pending)?;
    let l2_tx_number_in_batch = u16::try_from(tx_index).map_err(|_| {
        BridgeError::InvalidRequest(format!("transaction index {tx_index} exceeds u16"))
    })?;

    Ok(FinalizeWithdrawalParams {
        l1_batch_number,
        l2_message_index: proof.id,
        l2_tx_number_in_batch,
        message: located.message,
        sender: located.l2_sender,
        proof: proof.proof,
    })
}

/// Outcome of a submitted withdrawal finalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedWithdrawal {
    pub tx_hash: TxHash,
    pub l1_bridge: Address,
    pub l1_receiver: Address,
    pub l1_token: Address,
    pub amount: U256,
}

/// Release the assets of withdrawal `hash` on L1
pub async fn finalize_withdrawal<L1, L2>(
    l1: &L1,
    l2: &L2,
    hash: TxHash,
    index: usize,
    overrides: &TxOverrides,
) -> BridgeResult<FinalizedWithdrawal>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    if l1.signer_address().is_none() {
        return Err(BridgeError::AccountNotFound);
    }
    let (context, bridges) = resolve_topology(l1, l2).await?;
    let params = finalize_withdrawal_params(l2, hash, index).await?;
    let parsed = WithdrawalMessage::parse(&params.message)?;
    let l1_bridge = l1_bridge_for(l2, &bridges, params.sender).await?;

    let call = IL1SharedBridge::finalizeWithdrawalCall {
        _chainId: U256::from(context.chain_id),
        _l2BatchNumber: U256::from(params.l1_batch_number),
        _l2MessageIndex: U256::from(params.l2_message_index),
        _l2TxNumberInBatch: params.l2_tx_number_in_batch,
        _message: params.message,
        _merkleProof: params.proof,
    };
    let tx_hash = l1
        .send_transaction(submit_request(l1_bridge, &call, U256::ZERO, overrides))
        .await?;

    let finalized = FinalizedWithdrawal {
        tx_hash,
        l1_bridge,
        l1_receiver: parsed.receiver(),
        l1_token: parsed.l1_token(context.base_token),
        amount: parsed.amount(),
    };
    info!(
        tx_hash = %tx_hash,
        withdrawal = %hash,
        l1_bridge = %l1_bridge,
        l1_receiver = %finalized.l1_receiver,
        l1_token = %finalized.l1_token,
        amount = %finalized.amount,
        "Withdrawal finalization submitted"
    );
    Ok(finalized)
}

/// Whether the `index`-th withdrawal of `hash` has been finalized on L1
///
/// An unprovable withdrawal is reported as not finalized.
pub async fn is_withdrawal_finalized<L1, L2>(
    l1: &L1,
    l2: &L2,
    hash: TxHash,
    index: usize,
) -> BridgeResult<bool>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    Ok(withdrawal_status(l1, l2, hash, index).await? == WithdrawalFinalizationState::Finalized)
}

/// Lifecycle position of the `index`-th withdrawal of `hash`
pub async fn withdrawal_status<L1, L2>(
    l1: &L1,
    l2: &L2,
    hash: TxHash,
    index: usize,
) -> BridgeResult<WithdrawalFinalizationState>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    let receipt = fetch_receipt(l2, hash).await?;
    let located = find_withdrawal(&receipt, index)?;

    let Some(proof) = get_proof(l2, hash, located.l2_to_l1_log_index).await? else {
        debug!(withdrawal = %hash, "Withdrawal not yet provable");
        return Ok(WithdrawalFinalizationState::NotYetProcessable);
    };

    let (context, bridges) = resolve_topology(l1, l2).await?;
    let l1_bridge = l1_bridge_for(l2, &bridges, located.l2_sender).await?;
    let finalized = read_contract(
        l1,
        l1_bridge,
        IL1SharedBridge::isWithdrawalFinalizedCall {
            _chainId: U256::from(context.chain_id),
            _l2BatchNumber: U256::from(proof.batch_number),
            _l2MessageIndex: U256::from(proof.message_index),
        },
    )
    .await?
    ._0;

    Ok(if finalized {
        WithdrawalFinalizationState::Finalized
    } else {
        WithdrawalFinalizationState::Processable
    })
}

// ============================================================================
// Failed Deposits
// ============================================================================

/// Recover the funds of a deposit whose L2 execution failed
///
/// Only ERC20 deposits routed through a bridge can be claimed; a successful
/// deposit is rejected before anything is submitted.
pub async fn claim_failed_deposit<L1, L2>(
    l1: &L1,
    l2: &L2,
    deposit_hash: TxHash,
    overrides: &TxOverrides,
) -> BridgeResult<TxHash>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    if l1.signer_address().is_none() {
        return Err(BridgeError::AccountNotFound);
    }
    let receipt = fetch_receipt(l2, deposit_hash).await?;
    let (log_index, status) = locate_message(&receipt, is_status_log_for(deposit_hash))?;
    if !status.signals_failure() {
        warn!(deposit = %deposit_hash, "Refusing to claim a successful deposit");
        return Err(BridgeError::CannotClaimSuccessfulDeposit);
    }

    let l1_bridge = undo_l1_to_l2_alias(receipt.from);
    let input = l2
        .l2_transaction_input(deposit_hash)
        .await?
        .ok_or(BridgeError::ReceiptNotFound { hash: deposit_hash })?;
    let deposit = IL2SharedBridge::finalizeDepositCall::abi_decode(&input, true)?;

    let proof = get_proof(l2, deposit_hash, log_index)
        .await?
        .ok_or(BridgeError::MessageLogNotFound { hash: deposit_hash })?;
    let tx_index = receipt
        .batch_tx_index()
        .ok_or(BridgeError::MessageLogNotFound { hash: deposit_hash })?;
    let l2_tx_number_in_batch = u16::try_from(tx_index).map_err(|_| {
        BridgeError::InvalidRequest(format!("transaction index {tx_index} exceeds u16"))
    })?;
    let chain_id = l2.chain_id().ok_or(BridgeError::ChainNotConfigured)?;

    let call = IL1SharedBridge::claimFailedDepositCall {
        _chainId: U256::from(chain_id),
        _depositSender: deposit._l1Sender,
        _l1Token: deposit._l1Token,
        _amount: deposit._amount,
        _l2TxHash: deposit_hash,
        _l2BatchNumber: U256::from(proof.batch_number),
        _l2MessageIndex: U256::from(proof.message_index),
        _l2TxNumberInBatch: l2_tx_number_in_batch,
        _merkleProof: proof.sibling_hashes,
    };
    let tx_hash = l1
        .send_transaction(submit_request(l1_bridge, &call, U256::ZERO, overrides))
        .await?;

    info!(
        tx_hash = %tx_hash,
        deposit = %deposit_hash,
        l1_bridge = %l1_bridge,
        depositor = %deposit._l1Sender,
        l1_token = %deposit._l1Token,
        amount = %deposit._amount,
        "Failed deposit claim submitted"
    );
    Ok(tx_hash)
}
