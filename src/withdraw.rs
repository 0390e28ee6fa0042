//! L2 Withdrawals
//!
//! Starts the L2->L1 flow. The withdrawal message it emits is what
//! [`crate::finalization::finalize_withdrawal`] later proves on L1.

use alloy::primitives::{Address, TxHash, U256};
use tracing::{debug, info};

use crate::constants::{ETH_ADDRESS_IN_CONTRACTS, L2_BASE_TOKEN_ADDRESS, LEGACY_ETH_ADDRESS};
use crate::error::{BridgeError, BridgeResult};
use crate::evm::calls::{read_contract, submit_request};
use crate::evm::client::ZksRpc;
use crate::evm::contracts::{IL2BaseToken, IL2SharedBridge};
use crate::types::TxOverrides;

/// A withdrawal of `amount` of an L2 token back to L1
///
/// `token` is the L2 address. ETH may also be given as the legacy ETH
/// address or the in-contract ETH marker; it is mapped to the base token on
/// ETH chains and to its bridged L2 token on chains with an ERC20 base token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub token: Address,
    pub amount: U256,
    /// L1 receiver, defaults to the signer
    pub to: Option<Address>,
    /// L2 bridge to withdraw through; the shared bridge is used when unset
    pub bridge_address: Option<Address>,
    pub overrides: TxOverrides,
}

impl WithdrawRequest {
    pub fn new(token: Address, amount: U256) -> Self {
        Self {
            token,
            amount,
            to: None,
            bridge_address: None,
            overrides: TxOverrides::default(),
        }
    }

    pub fn with_receiver(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_bridge(mut self, bridge: Address) -> Self {
        self.bridge_address = Some(bridge);
        self
    }
}

/// L2 address of the token being withdrawn, with the ETH markers resolved
/// against the chain's base token
pub async fn l2_withdrawal_token<R: ZksRpc + ?Sized>(
    l2: &R,
    token: Address,
) -> BridgeResult<Address> {
    if token != LEGACY_ETH_ADDRESS && token != ETH_ADDRESS_IN_CONTRACTS {
        return Ok(token);
    }
    let base_token = l2.base_token_l1_address().await?;
    if base_token == ETH_ADDRESS_IN_CONTRACTS {
        return Ok(L2_BASE_TOKEN_ADDRESS);
    }

    let shared_l2 = l2.bridge_contracts().await?.shared_l2;
    let bridged = read_contract(
        l2,
        shared_l2,
        IL2SharedBridge::l2TokenAddressCall {
            _l1Token: ETH_ADDRESS_IN_CONTRACTS,
        },
    )
    .await?;
    debug!(base_token = %base_token, l2_eth = %bridged._0, "ETH is bridged on this chain");
    Ok(bridged._0)
}

/// Submit the withdrawal on L2, returning the L2 transaction hash
pub async fn withdraw<R: ZksRpc + ?Sized>(
    l2: &R,
    request: WithdrawRequest,
) -> BridgeResult<TxHash> {
    let sender = l2.signer_address().ok_or(BridgeError::AccountNotFound)?;
    if request.amount.is_zero() {
        return Err(BridgeError::InvalidRequest(
            "withdrawal amount must be positive".to_string(),
        ));
    }
    let receiver = request.to.unwrap_or(sender);
    let token = l2_withdrawal_token(l2, request.token).await?;

    let (target, tx) = if token == L2_BASE_TOKEN_ADDRESS {
        let call = IL2BaseToken::withdrawCall {
            _l1Receiver: receiver,
        };
        (
            L2_BASE_TOKEN_ADDRESS,
            submit_request(L2_BASE_TOKEN_ADDRESS, &call, request.amount, &request.overrides),
        )
    } else {
        let bridge = match request.bridge_address {
            Some(bridge) => bridge,
            None => l2.bridge_contracts().await?.shared_l2,
        };
        let call = IL2SharedBridge::withdrawCall {
            _l1Receiver: receiver,
            _l2Token: token,
            _amount: request.amount,
        };
        (
            bridge,
            submit_request(bridge, &call, U256::ZERO, &request.overrides),
        )
    };

    let hash = l2.send_transaction(tx).await?;
    info!(
        tx_hash = %hash,
        token = %token,
        amount = %request.amount,
        l1_receiver = %receiver,
        via = %target,
        "Withdrawal submitted"
    );
    Ok(hash)
}
