//! Bridge Topology Resolver
//!
//! Discovers the hub, the default bridges and the base token of the chain an
//! L2 client is connected to. Callers may cache the result; nothing here does.

use alloy::primitives::{Address, U256};
use tracing::info;

use crate::address_codec::normalize_token;
use crate::constants::{ETH_ADDRESS_IN_CONTRACTS, L2_BASE_TOKEN_ADDRESS};
use crate::error::{BridgeError, BridgeResult};
use crate::evm::calls::read_contract;
use crate::evm::client::{ChainRpc, ZksRpc};
use crate::evm::contracts::{IBridgehub, IL2SharedBridge};
use crate::types::{BridgeAddressSet, ChainContext};

/// Resolve chain identity and bridge contracts for the L2 behind `l2`
pub async fn resolve_topology<L1, L2>(
    l1: &L1,
    l2: &L2,
) -> BridgeResult<(ChainContext, BridgeAddressSet)>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    let chain_id = l2.chain_id().ok_or(BridgeError::ChainNotConfigured)?;
    let (bridgehub, bridges) = tokio::try_join!(l2.bridgehub_contract(), l2.bridge_contracts())?;
    let base_token = base_token_of(l1, bridgehub, chain_id).await?;

    let context = ChainContext {
        chain_id,
        base_token,
        bridgehub,
        is_base_layer_native: base_token == ETH_ADDRESS_IN_CONTRACTS,
    };

    info!(
        chain_id = chain_id,
        bridgehub = %bridgehub,
        base_token = %base_token,
        shared_l1 = %bridges.shared_l1,
        shared_l2 = %bridges.shared_l2,
        "Resolved bridge topology"
    );

    Ok((context, bridges))
}

/// L1 address of the chain's base token, as registered on the hub
pub async fn base_token_of<R: ChainRpc + ?Sized>(
    l1: &R,
    bridgehub: Address,
    chain_id: u64,
) -> BridgeResult<Address> {
    let token = read_contract(
        l1,
        bridgehub,
        IBridgehub::baseTokenCall {
            _chainId: U256::from(chain_id),
        },
    )
    .await?;
    Ok(token._0)
}

/// Diamond proxy of the chain, the emitter of its priority-queue events
pub async fn main_contract<R: ZksRpc + ?Sized>(l2: &R) -> BridgeResult<Address> {
    l2.main_contract().await
}

/// L2 address of the token bridged from `l1_token`
pub async fn get_l2_token_address<L1, L2>(
    l1: &L1,
    l2: &L2,
    l1_token: Address,
) -> BridgeResult<Address>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    let l1_token = normalize_token(l1_token);
    let (context, bridges) = resolve_topology(l1, l2).await?;
    if l1_token == context.base_token {
        return Ok(L2_BASE_TOKEN_ADDRESS);
    }
    let l2_token = read_contract(
        l2,
        bridges.shared_l2,
        IL2SharedBridge::l2TokenAddressCall { _l1Token: l1_token },
    )
    .await?;
    Ok(l2_token._0)
}
