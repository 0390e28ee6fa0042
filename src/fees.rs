//! Fee & Cost Calculator
//!
//! Base cost of a priority operation comes from the hub. L1 fee parameters
//! are derived from the latest base fee with a configurable multiplier:
//!
//! ```text
//! maxFeePerGas         = baseFee * base_fee_percent / 100 + priorityFee
//! maxPriorityFeePerGas = priorityFee
//! gasLimit             = estimate * gas_limit_percent / 100
//! ```

use alloy::primitives::U256;
use tracing::debug;

use crate::error::BridgeResult;
use crate::evm::calls::read_contract;
use crate::evm::client::ChainRpc;
use crate::evm::contracts::IBridgehub;
use crate::types::{ChainContext, FeeParams, SafetyMargins, TxOverrides};

/// Cost in base token of executing an L2 transaction with the given limits
pub async fn base_cost<R: ChainRpc + ?Sized>(
    l1: &R,
    context: &ChainContext,
    gas_price: u128,
    l2_gas_limit: u64,
    gas_per_pubdata_byte: u64,
) -> BridgeResult<U256> {
    let cost = read_contract(
        l1,
        context.bridgehub,
        IBridgehub::l2TransactionBaseCostCall {
            _chainId: U256::from(context.chain_id),
            _gasPrice: U256::from(gas_price),
            _l2GasLimit: U256::from(l2_gas_limit),
            _l2GasPerPubdataByteLimit: U256::from(gas_per_pubdata_byte),
        },
    )
    .await?;
    Ok(cost._0)
}

/// EIP-1559 fees with the base-fee margin applied
///
/// Falls back to the legacy gas price when the chain reports no base fee.
pub async fn estimate_fee_params<R: ChainRpc + ?Sized>(
    l1: &R,
    margins: &SafetyMargins,
) -> BridgeResult<FeeParams> {
    let base_fee = match l1.latest_base_fee().await? {
        Some(fee) => fee,
        None => l1.gas_price().await?,
    };
    let priority_fee = l1.max_priority_fee().await?;
    let max_fee_per_gas = apply_percent(base_fee, margins.base_fee_percent) + priority_fee;

    debug!(
        base_fee = base_fee,
        priority_fee = priority_fee,
        max_fee_per_gas = max_fee_per_gas,
        "Estimated L1 fee params"
    );

    Ok(FeeParams {
        max_fee_per_gas,
        max_priority_fee_per_gas: priority_fee,
    })
}

/// Fill unset fee fields of `overrides`, returning the gas price used for base cost
pub async fn resolve_fees<R: ChainRpc + ?Sized>(
    l1: &R,
    overrides: &mut TxOverrides,
    margins: &SafetyMargins,
) -> BridgeResult<u128> {
    if let Some(gas_price) = overrides.gas_price {
        return Ok(gas_price);
    }
    if let Some(max_fee) = overrides.max_fee_per_gas {
        return Ok(max_fee);
    }
    let fees = estimate_fee_params(l1, margins).await?;
    overrides.max_fee_per_gas = Some(fees.max_fee_per_gas);
    overrides.max_priority_fee_per_gas = Some(fees.max_priority_fee_per_gas);
    Ok(fees.max_fee_per_gas)
}

/// Raw gas estimate scaled by the gas-limit margin
pub fn scale_gas_limit(gas: u64, margins: &SafetyMargins) -> u64 {
    let scaled = u128::from(gas) * u128::from(margins.gas_limit_percent) / 100;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

fn apply_percent(value: u128, percent: u64) -> u128 {
    value.saturating_mul(u128::from(percent)) / 100
}
