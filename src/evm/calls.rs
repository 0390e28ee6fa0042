//! Contract call helpers
//!
//! Encodes sol! call structs into transaction requests and decodes read
//! results, so every operation goes through the [`ChainRpc`] seam.

use alloy::{
    primitives::{Address, Bytes, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};

use crate::error::BridgeResult;
use crate::evm::client::ChainRpc;
use crate::types::TxOverrides;

/// Build a request calling `call` on `to`
pub fn call_request<C: SolCall>(to: Address, call: &C) -> TransactionRequest {
    TransactionRequest::default()
        .to(to)
        .input(Bytes::from(call.abi_encode()).into())
}

/// Build a value-carrying request with the caller's overrides applied
pub fn submit_request<C: SolCall>(
    to: Address,
    call: &C,
    value: U256,
    overrides: &TxOverrides,
) -> TransactionRequest {
    apply_overrides(call_request(to, call).value(value), overrides)
}

pub fn apply_overrides(mut tx: TransactionRequest, overrides: &TxOverrides) -> TransactionRequest {
    if let Some(gas) = overrides.gas_limit {
        tx = tx.gas_limit(gas);
    }
    if let Some(price) = overrides.gas_price {
        tx.gas_price = Some(price);
    }
    if let Some(max_fee) = overrides.max_fee_per_gas {
        tx = tx.max_fee_per_gas(max_fee);
    }
    if let Some(tip) = overrides.max_priority_fee_per_gas {
        tx = tx.max_priority_fee_per_gas(tip);
    }
    tx
}

/// `eth_call` a view function and decode its return values
pub async fn read_contract<R, C>(rpc: &R, to: Address, call: C) -> BridgeResult<C::Return>
where
    R: ChainRpc + ?Sized,
    C: SolCall + Send,
{
    let data = rpc.call(&call_request(to, &call)).await?;
    Ok(C::abi_decode_returns(&data, true)?)
}
