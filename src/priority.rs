//! Priority Operations
//!
//! Submission of hub calls and correlation of an L1 priority transaction with
//! the L2 transaction it produces. The canonical L2 hash is carried in the
//! `NewPriorityRequest` event the chain's diamond proxy emits.

use alloy::{
    primitives::{Address, Bytes, TxHash, B256, U256},
    rpc::types::{Log, TransactionReceipt, TransactionRequest},
    sol_types::{SolCall, SolEvent},
};
use tracing::{debug, info};

use crate::constants::REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT;
use crate::error::{BridgeError, BridgeResult};
use crate::evm::calls::apply_overrides;
use crate::evm::client::{ChainRpc, ZksRpc};
use crate::evm::contracts::{IBridgehub, IMailbox};
use crate::evm::tokens::ensure_allowance;
use crate::fees::{base_cost, resolve_fees, scale_gas_limit};
use crate::messages::{is_bootloader_log, locate_nth_message};
use crate::topology::resolve_topology;
use crate::types::{L1ToL2GasRequest, PriorityOperationParams, SafetyMargins, TxOverrides};

// ============================================================================
// Correlation
// ============================================================================

/// Canonical L2 hash from the logs of an L1 priority transaction
///
/// Only `NewPriorityRequest` events emitted by `contract` are considered.
pub fn derive_l2_hash_from_logs(logs: &[Log], contract: Address) -> BridgeResult<B256> {
    logs.iter()
        .filter(|log| {
            log.address() == contract
                && log.topics().first() == Some(&IMailbox::NewPriorityRequest::SIGNATURE_HASH)
        })
        .find_map(|log| IMailbox::NewPriorityRequest::decode_log_data(log.data(), true).ok())
        .map(|event| event.txHash)
        .ok_or(BridgeError::TxHashNotFoundInLogs)
}

/// Canonical L2 hash produced by an L1 priority transaction
pub fn derive_l2_hash(receipt: &TransactionReceipt, contract: Address) -> BridgeResult<B256> {
    derive_l2_hash_from_logs(receipt.inner.logs(), contract)
}

/// Fetch the L1 receipt and derive its L2 hash against the chain's main contract
pub async fn l2_hash_from_priority_op<L1, L2>(
    l1: &L1,
    l2: &L2,
    l1_tx_hash: TxHash,
) -> BridgeResult<B256>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    let receipt = l1
        .transaction_receipt(l1_tx_hash)
        .await?
        .ok_or(BridgeError::ReceiptNotFound { hash: l1_tx_hash })?;
    let main_contract = l2.main_contract().await?;
    let l2_hash = derive_l2_hash(&receipt, main_contract)?;
    debug!(l1_tx_hash = %l1_tx_hash, l2_tx_hash = %l2_hash, "Correlated priority operation");
    Ok(l2_hash)
}

// ============================================================================
// Confirmation
// ============================================================================

/// Proof data confirming an executed priority operation on L1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOpConfirmation {
    pub l1_batch_number: u64,
    pub l2_message_index: u64,
    pub l2_tx_number_in_batch: Option<u64>,
    pub proof: Vec<B256>,
}

/// Locate the `index`-th bootloader log of `l2_tx_hash` and fetch its proof
pub async fn get_priority_op_confirmation<R: ZksRpc + ?Sized>(
    l2: &R,
    l2_tx_hash: TxHash,
    index: usize,
) -> BridgeResult<PriorityOpConfirmation> {
    let not_found = || BridgeError::MessageLogNotFound { hash: l2_tx_hash };
    let receipt = l2
        .l2_transaction_receipt(l2_tx_hash)
        .await?
        .ok_or_else(not_found)?;
    let (log_index, message) = locate_nth_message(&receipt, is_bootloader_log, index)?;
    let batch_number = message
        .l1_batch_number
        .map(|n| n.to::<u64>())
        .or_else(|| receipt.batch_number())
        .ok_or_else(not_found)?;
    let proof = l2
        .l2_to_l1_log_proof(l2_tx_hash, log_index)
        .await?
        .ok_or_else(not_found)?;

    Ok(PriorityOpConfirmation {
        l1_batch_number: batch_number,
        l2_message_index: proof.id,
        l2_tx_number_in_batch: receipt.batch_tx_index(),
        proof: proof.proof,
    })
}

// ============================================================================
// Submission
// ============================================================================

/// Send `calldata` to the hub, estimating and scaling gas when unset
pub(crate) async fn submit_hub_call<R: ChainRpc + ?Sized>(
    l1: &R,
    bridgehub: Address,
    calldata: Bytes,
    value: U256,
    overrides: &TxOverrides,
    margins: &SafetyMargins,
) -> BridgeResult<TxHash> {
    let from = l1.signer_address().ok_or(BridgeError::AccountNotFound)?;
    let mut tx = apply_overrides(
        TransactionRequest::default()
            .from(from)
            .to(bridgehub)
            .input(calldata.into())
            .value(value),
        overrides,
    );
    if tx.gas.is_none() {
        let estimate = l1.estimate_gas(&tx).await?;
        tx = tx.gas_limit(scale_gas_limit(estimate, margins));
    }
    let hash = l1.send_transaction(tx).await?;
    info!(tx_hash = %hash, bridgehub = %bridgehub, value = %value, "Submitted priority operation");
    Ok(hash)
}

/// Sum of the base cost and the values the mint has to carry
pub(crate) fn mint_value_sum(parts: &[U256]) -> BridgeResult<U256> {
    parts
        .iter()
        .try_fold(U256::ZERO, |total, part| total.checked_add(*part))
        .ok_or_else(|| BridgeError::InvalidRequest("mint value overflows uint256".to_string()))
}

/// Reject a mint value that does not cover the base cost
pub(crate) fn check_mint_value(base_cost: U256, mint_value: U256) -> BridgeResult<()> {
    if base_cost > mint_value {
        return Err(BridgeError::BaseCostExceedsValue {
            base_cost,
            value: mint_value,
        });
    }
    Ok(())
}

/// An arbitrary L2 call requested from L1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteRequest {
    pub contract_address: Address,
    pub calldata: Bytes,
    pub l2_value: U256,
    pub l2_gas_limit: Option<u64>,
    pub gas_per_pubdata_byte: u64,
    pub factory_deps: Vec<Bytes>,
    pub operator_tip: U256,
    pub mint_value: Option<U256>,
    pub refund_recipient: Option<Address>,
    /// Approve the base token on non-ETH chains when allowance is short
    pub approve_base_token: Option<TxOverrides>,
    pub overrides: TxOverrides,
    pub margins: SafetyMargins,
}

impl ExecuteRequest {
    pub fn new(contract_address: Address, calldata: Bytes) -> Self {
        Self {
            contract_address,
            calldata,
            l2_value: U256::ZERO,
            l2_gas_limit: None,
            gas_per_pubdata_byte: REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT,
            factory_deps: Vec::new(),
            operator_tip: U256::ZERO,
            mint_value: None,
            refund_recipient: None,
            approve_base_token: None,
            overrides: TxOverrides::default(),
            margins: SafetyMargins::default(),
        }
    }
}

/// Request execution of an L2 call through the hub's direct path
pub async fn request_execute<L1, L2>(
    l1: &L1,
    l2: &L2,
    request: ExecuteRequest,
) -> BridgeResult<TxHash>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    request.margins.validate()?;
    let sender = l1.signer_address().ok_or(BridgeError::AccountNotFound)?;
    let (context, bridges) = resolve_topology(l1, l2).await?;

    let l2_gas_limit = match request.l2_gas_limit {
        Some(limit) => limit,
        None => {
            l2.estimate_gas_l1_to_l2(&L1ToL2GasRequest::new(
                sender,
                request.contract_address,
                request.calldata.clone(),
                request.l2_value,
                request.gas_per_pubdata_byte,
            ))
            .await?
        }
    };

    let mut overrides = request.overrides;
    let gas_price = resolve_fees(l1, &mut overrides, &request.margins).await?;
    let cost = base_cost(
        l1,
        &context,
        gas_price,
        l2_gas_limit,
        request.gas_per_pubdata_byte,
    )
    .await?;
    let mint_value = match request.mint_value {
        Some(value) => value,
        None => mint_value_sum(&[cost, request.operator_tip, request.l2_value])?,
    };
    check_mint_value(cost, mint_value)?;

    if !context.is_base_layer_native {
        if let Some(approval) = &request.approve_base_token {
            ensure_allowance(
                l1,
                context.base_token,
                sender,
                bridges.shared_l1,
                mint_value,
                approval,
            )
            .await?;
        }
    }

    let params = PriorityOperationParams {
        chain_id: context.chain_id,
        mint_value,
        l2_target: request.contract_address,
        l2_value: request.l2_value,
        l2_calldata: request.calldata,
        l2_gas_limit,
        gas_per_pubdata_byte: request.gas_per_pubdata_byte,
        factory_deps: request.factory_deps,
        refund_recipient: request.refund_recipient.unwrap_or(sender),
    };
    let value = if context.is_base_layer_native {
        mint_value
    } else {
        U256::ZERO
    };
    let calldata = IBridgehub::requestL2TransactionDirectCall {
        _request: params.into(),
    }
    .abi_encode();

    submit_hub_call(
        l1,
        context.bridgehub,
        calldata.into(),
        value,
        &overrides,
        &request.margins,
    )
    .await
}
