//! Deposit Router
//!
//! Picks the hub call shape for a deposit from the chain/token topology:
//!
//! | Route                    | Base token | Token       | Hub call    | msg.value |
//! |--------------------------|------------|-------------|-------------|-----------|
//! | `NativeToNativeChain`    | ETH        | ETH         | direct      | mint      |
//! | `TokenToNativeChain`     | ETH        | ERC20       | two-bridges | mint      |
//! | `NativeToCustomChain`    | ERC20      | ETH         | two-bridges | amount    |
//! | `BaseTokenToCustomChain` | ERC20      | base token  | direct      | 0         |
//! | `TokenToCustomChain`     | ERC20      | other ERC20 | two-bridges | 0         |
//!
//! Planning is pure given the resolved topology, L2 gas limit and base cost;
//! [`deposit`] resolves those, performs the allowance-gated approvals and
//! submits. Approvals are a durable side effect and are not rolled back when
//! the deposit itself fails.

use alloy::{
    primitives::{Address, Bytes, TxHash, U256},
    sol_types::{SolCall, SolValue},
};
use tracing::{debug, info};

use crate::address_codec::{apply_l1_to_l2_alias, is_eth};
use crate::constants::{
    ETH_ADDRESS_IN_CONTRACTS, ETH_TOKEN_DECIMALS, ETH_TOKEN_NAME, ETH_TOKEN_SYMBOL,
};
use crate::error::{BridgeError, BridgeResult};
use crate::evm::calls::read_contract;
use crate::evm::client::{ChainRpc, ZksRpc};
use crate::evm::contracts::{IBridgehub, IL1Bridge, IL2SharedBridge};
use crate::evm::tokens::{ensure_allowance, get_token_info};
use crate::fees::{base_cost, resolve_fees};
use crate::priority::{check_mint_value, mint_value_sum, submit_hub_call};
use crate::topology::resolve_topology;
use crate::types::{
    BridgeAddressSet, ChainContext, DepositRequest, L1ToL2GasRequest, PriorityOperationParams,
    TxOverrides,
};

// ============================================================================
// Routes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositRoute {
    /// ETH into an ETH-based chain
    NativeToNativeChain,
    /// ERC20 into an ETH-based chain
    TokenToNativeChain,
    /// ETH into a chain with an ERC20 base token
    NativeToCustomChain,
    /// The base token into its own chain
    BaseTokenToCustomChain,
    /// An unrelated ERC20 into a chain with an ERC20 base token
    TokenToCustomChain,
}

impl DepositRoute {
    /// Route for depositing the (normalized) `token` into the chain
    pub fn classify(context: &ChainContext, token: Address) -> Self {
        let token_is_native = token == ETH_ADDRESS_IN_CONTRACTS;
        let token_is_base = token == context.base_token;
        match (context.is_base_layer_native, token_is_native, token_is_base) {
            (true, true, _) => Self::NativeToNativeChain,
            (true, false, _) => Self::TokenToNativeChain,
            (false, true, _) => Self::NativeToCustomChain,
            (false, false, true) => Self::BaseTokenToCustomChain,
            (false, false, false) => Self::TokenToCustomChain,
        }
    }

    /// Whether the route uses `requestL2TransactionDirect`
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::NativeToNativeChain | Self::BaseTokenToCustomChain)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeToNativeChain => "native_to_native_chain",
            Self::TokenToNativeChain => "token_to_native_chain",
            Self::NativeToCustomChain => "native_to_custom_chain",
            Self::BaseTokenToCustomChain => "base_token_to_custom_chain",
            Self::TokenToCustomChain => "token_to_custom_chain",
        }
    }

    /// Build the hub call and approvals for `request`
    pub fn plan(
        &self,
        request: &DepositRequest,
        resolved: &ResolvedDeposit,
    ) -> BridgeResult<DepositPlan> {
        let token = request.l1_token();
        let amount = request.amount;
        let tip = request.operator_tip;
        let cost = resolved.base_cost;
        let context = &resolved.context;
        let shared_l1 = resolved.bridges.shared_l1;
        let bridge = request.bridge_address.unwrap_or(shared_l1);

        let mint_value = match request.mint_value {
            Some(value) => value,
            None if self.is_direct() => mint_value_sum(&[cost, tip, amount])?,
            None => mint_value_sum(&[cost, tip])?,
        };
        check_mint_value(cost, mint_value)?;

        let mut approvals = Vec::new();
        let (call, value) = match self {
            Self::NativeToNativeChain => (self.direct(request, resolved, mint_value), mint_value),
            Self::TokenToNativeChain => {
                if let Some(overrides) = request.approve_token {
                    approvals.push(ApprovalRequirement::new(token, bridge, amount, overrides));
                }
                let call = self.two_bridges(
                    request,
                    resolved,
                    mint_value,
                    bridge,
                    U256::ZERO,
                    (token, amount, resolved.recipient).abi_encode_params(),
                );
                (call, mint_value)
            }
            Self::NativeToCustomChain => {
                if let Some(overrides) = request.approve_base_token {
                    approvals.push(ApprovalRequirement::new(
                        context.base_token,
                        shared_l1,
                        mint_value,
                        overrides,
                    ));
                }
                let call = self.two_bridges(
                    request,
                    resolved,
                    mint_value,
                    shared_l1,
                    amount,
                    (ETH_ADDRESS_IN_CONTRACTS, U256::ZERO, resolved.recipient).abi_encode_params(),
                );
                (call, amount)
            }
            Self::BaseTokenToCustomChain => {
                if let Some(overrides) = request.approve_base_token.or(request.approve_token) {
                    approvals.push(ApprovalRequirement::new(
                        context.base_token,
                        shared_l1,
                        mint_value,
                        overrides,
                    ));
                }
                (self.direct(request, resolved, mint_value), U256::ZERO)
            }
            Self::TokenToCustomChain => {
                if let Some(overrides) = request.approve_base_token {
                    approvals.push(ApprovalRequirement::new(
                        context.base_token,
                        shared_l1,
                        mint_value,
                        overrides,
                    ));
                }
                if let Some(overrides) = request.approve_token {
                    approvals.push(ApprovalRequirement::new(token, bridge, amount, overrides));
                }
                let call = self.two_bridges(
                    request,
                    resolved,
                    mint_value,
                    bridge,
                    U256::ZERO,
                    (token, amount, resolved.recipient).abi_encode_params(),
                );
                (call, U256::ZERO)
            }
        };

        Ok(DepositPlan {
            route: *self,
            base_cost: cost,
            mint_value,
            value,
            calldata: call,
            approvals,
        })
    }

    fn direct(
        &self,
        request: &DepositRequest,
        resolved: &ResolvedDeposit,
        mint_value: U256,
    ) -> Bytes {
        let params = PriorityOperationParams {
            chain_id: resolved.context.chain_id,
            mint_value,
            l2_target: resolved.recipient,
            l2_value: request.amount,
            l2_calldata: Bytes::new(),
            l2_gas_limit: resolved.l2_gas_limit,
            gas_per_pubdata_byte: request.gas_per_pubdata_byte,
            factory_deps: Vec::new(),
            refund_recipient: resolved.refund_recipient,
        };
        IBridgehub::requestL2TransactionDirectCall {
            _request: params.into(),
        }
        .abi_encode()
        .into()
    }

    fn two_bridges(
        &self,
        request: &DepositRequest,
        resolved: &ResolvedDeposit,
        mint_value: U256,
        second_bridge: Address,
        second_bridge_value: U256,
        second_bridge_calldata: Vec<u8>,
    ) -> Bytes {
        IBridgehub::requestL2TransactionTwoBridgesCall {
            _request: IBridgehub::L2TransactionRequestTwoBridgesOuter {
                chainId: U256::from(resolved.context.chain_id),
                mintValue: mint_value,
                l2Value: U256::ZERO,
                l2GasLimit: U256::from(resolved.l2_gas_limit),
                l2GasPerPubdataByteLimit: U256::from(request.gas_per_pubdata_byte),
                refundRecipient: resolved.refund_recipient,
                secondBridgeAddress: second_bridge,
                secondBridgeValue: second_bridge_value,
                secondBridgeCalldata: second_bridge_calldata.into(),
            },
        }
        .abi_encode()
        .into()
    }
}

// ============================================================================
// Plans
// ============================================================================

/// Chain state a deposit plan is built against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDeposit {
    pub context: ChainContext,
    pub bridges: BridgeAddressSet,
    pub sender: Address,
    pub recipient: Address,
    pub refund_recipient: Address,
    pub l2_gas_limit: u64,
    pub base_cost: U256,
}

/// An allowance the deposit needs before the hub call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalRequirement {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
    pub overrides: TxOverrides,
}

impl ApprovalRequirement {
    fn new(token: Address, spender: Address, amount: U256, overrides: TxOverrides) -> Self {
        Self {
            token,
            spender,
            amount,
            overrides,
        }
    }
}

/// Everything needed to submit a deposit, before any transaction is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositPlan {
    pub route: DepositRoute,
    pub base_cost: U256,
    pub mint_value: U256,
    /// `msg.value` of the hub call
    pub value: U256,
    /// Encoded hub call
    pub calldata: Bytes,
    pub approvals: Vec<ApprovalRequirement>,
}

// ============================================================================
// L2 Gas Limit
// ============================================================================

/// `finalizeDeposit` data for the default bridge: abi-encoded name, symbol, decimals
pub async fn default_bridge_data<R: ChainRpc + ?Sized>(
    l1: &R,
    token: Address,
) -> BridgeResult<Bytes> {
    let (name, symbol, decimals) = if is_eth(token) {
        (
            ETH_TOKEN_NAME.to_string(),
            ETH_TOKEN_SYMBOL.to_string(),
            ETH_TOKEN_DECIMALS,
        )
    } else {
        let info = get_token_info(l1, token).await?;
        (info.name, info.symbol, info.decimals)
    };
    Ok(encode_bridge_data(&name, &symbol, decimals))
}

pub fn encode_bridge_data(name: &str, symbol: &str, decimals: u8) -> Bytes {
    let name = Bytes::from(name.to_string().abi_encode());
    let symbol = Bytes::from(symbol.to_string().abi_encode());
    let decimals = Bytes::from(U256::from(decimals).abi_encode());
    (name, symbol, decimals).abi_encode_params().into()
}

/// Simulate the L2 side of the deposit to size its gas limit
///
/// The base token arrives as plain value. Anything else runs the L2 bridge's
/// `finalizeDeposit`, called by the aliased L1 bridge.
pub async fn estimate_l2_gas_limit<L1, L2>(
    l1: &L1,
    l2: &L2,
    request: &DepositRequest,
    context: &ChainContext,
    bridges: &BridgeAddressSet,
    sender: Address,
    recipient: Address,
) -> BridgeResult<u64>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    if let Some(limit) = request.l2_gas_limit {
        return Ok(limit);
    }
    let token = request.l1_token();

    let (from, to, bridge_data) = match request.bridge_address {
        Some(bridge) => {
            let l2_bridge = read_contract(
                l1,
                bridge,
                IL1Bridge::l2BridgeAddressCall {
                    _chainId: U256::from(context.chain_id),
                },
            )
            .await?
            ._0;
            let data = match &request.custom_bridge_data {
                Some(data) => data.clone(),
                None => default_bridge_data(l1, token).await?,
            };
            (apply_l1_to_l2_alias(bridge), l2_bridge, data)
        }
        None if token == context.base_token => {
            let gas = l2
                .estimate_gas_l1_to_l2(&L1ToL2GasRequest::new(
                    sender,
                    recipient,
                    Bytes::new(),
                    request.amount,
                    request.gas_per_pubdata_byte,
                ))
                .await?;
            return Ok(gas);
        }
        None => (
            apply_l1_to_l2_alias(bridges.shared_l1),
            bridges.shared_l2,
            default_bridge_data(l1, token).await?,
        ),
    };

    let calldata = IL2SharedBridge::finalizeDepositCall {
        _l1Sender: sender,
        _l2Receiver: recipient,
        _l1Token: token,
        _amount: request.amount,
        _data: bridge_data,
    }
    .abi_encode();

    l2.estimate_gas_l1_to_l2(&L1ToL2GasRequest::new(
        from,
        to,
        calldata.into(),
        U256::ZERO,
        request.gas_per_pubdata_byte,
    ))
    .await
}

// ============================================================================
// Operations
// ============================================================================

/// Resolve chain state and build the deposit plan without sending anything
pub async fn plan_deposit<L1, L2>(
    l1: &L1,
    l2: &L2,
    request: &DepositRequest,
) -> BridgeResult<(DepositPlan, ChainContext, TxOverrides)>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    request.validate()?;
    let sender = l1.signer_address().ok_or(BridgeError::AccountNotFound)?;
    let (context, bridges) = resolve_topology(l1, l2).await?;
    let recipient = request.recipient.unwrap_or(sender);
    let route = DepositRoute::classify(&context, request.l1_token());

    let l2_gas_limit =
        estimate_l2_gas_limit(l1, l2, request, &context, &bridges, sender, recipient).await?;

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

    let resolved = ResolvedDeposit {
        context,
        bridges,
        sender,
        recipient,
        refund_recipient: request.refund_recipient.unwrap_or(sender),
        l2_gas_limit,
        base_cost: cost,
    };
    let plan = route.plan(request, &resolved)?;

    debug!(
        route = route.as_str(),
        base_cost = %plan.base_cost,
        mint_value = %plan.mint_value,
        value = %plan.value,
        l2_gas_limit = l2_gas_limit,
        approvals = plan.approvals.len(),
        "Planned deposit"
    );

    Ok((plan, context, overrides))
}

/// Deposit `request.amount` of `request.token` from L1 into the L2 chain
///
/// Returns the L1 transaction hash; derive the L2 hash from its receipt with
/// [`crate::priority::derive_l2_hash`].
pub async fn deposit<L1, L2>(l1: &L1, l2: &L2, request: DepositRequest) -> BridgeResult<TxHash>
where
    L1: ChainRpc + ?Sized,
    L2: ZksRpc + ?Sized,
{
    let (plan, context, overrides) = plan_deposit(l1, l2, &request).await?;
    let sender = l1.signer_address().ok_or(BridgeError::AccountNotFound)?;

    for approval in &plan.approvals {
        ensure_allowance(
            l1,
            approval.token,
            sender,
            approval.spender,
            approval.amount,
            &approval.overrides,
        )
        .await?;
    }

    let hash = submit_hub_call(
        l1,
        context.bridgehub,
        plan.calldata,
        plan.value,
        &overrides,
        &request.margins,
    )
    .await?;

    info!(
        tx_hash = %hash,
        route = plan.route.as_str(),
        token = %request.l1_token(),
        amount = %request.amount,
        chain_id = context.chain_id,
        "Deposit submitted"
    );
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::contracts::ERC20;
    use crate::fees::scale_gas_limit;
    use crate::testing::fixtures::{self, word};
    use crate::testing::MockChain;
    use crate::types::SafetyMargins;
    use alloy::primitives::address;

    const BASE_COST: u64 = 250_000_000_000_000;
    const AMOUNT: u64 = 7_000_000_000;
    const TIP: u64 = 10;
    const RECEIVER: Address = address!("a61464658afeaf65cccaafd3a512b69a83b77618");

    fn eth_chain() -> ChainContext {
        ChainContext {
            chain_id: fixtures::L2_CHAIN_ID,
            base_token: ETH_ADDRESS_IN_CONTRACTS,
            bridgehub: fixtures::BRIDGEHUB,
            is_base_layer_native: true,
        }
    }

    fn custom_chain() -> ChainContext {
        ChainContext {
            base_token: fixtures::CUSTOM_BASE_TOKEN,
            is_base_layer_native: false,
            ..eth_chain()
        }
    }

    fn resolved(context: ChainContext) -> ResolvedDeposit {
        ResolvedDeposit {
            context,
            bridges: fixtures::bridge_addresses(),
            sender: fixtures::SIGNER,
            recipient: RECEIVER,
            refund_recipient: fixtures::SIGNER,
            l2_gas_limit: 600_000,
            base_cost: U256::from(BASE_COST),
        }
    }

    fn request(token: Address) -> DepositRequest {
        DepositRequest::new(token, U256::from(AMOUNT))
            .with_recipient(RECEIVER)
            .with_operator_tip(U256::from(TIP))
    }

    fn two_bridges(plan: &DepositPlan) -> IBridgehub::L2TransactionRequestTwoBridgesOuter {
        IBridgehub::requestL2TransactionTwoBridgesCall::abi_decode(&plan.calldata, true)
            .unwrap()
            ._request
    }

    fn second_bridge_args(
        call: &IBridgehub::L2TransactionRequestTwoBridgesOuter,
    ) -> (Address, U256, Address) {
        <(Address, U256, Address)>::abi_decode_params(&call.secondBridgeCalldata, true).unwrap()
    }

    fn direct(plan: &DepositPlan) -> IBridgehub::L2TransactionRequestDirect {
        IBridgehub::requestL2TransactionDirectCall::abi_decode(&plan.calldata, true)
            .unwrap()
            ._request
    }

    // ========================================================================
    // Classification
    // ========================================================================

    #[test]
    fn test_classify_routes() {
        let eth = eth_chain();
        let custom = custom_chain();
        assert_eq!(
            DepositRoute::classify(&eth, ETH_ADDRESS_IN_CONTRACTS),
            DepositRoute::NativeToNativeChain
        );
        assert_eq!(
            DepositRoute::classify(&eth, fixtures::DAI_L1),
            DepositRoute::TokenToNativeChain
        );
        assert_eq!(
            DepositRoute::classify(&custom, ETH_ADDRESS_IN_CONTRACTS),
            DepositRoute::NativeToCustomChain
        );
        assert_eq!(
            DepositRoute::classify(&custom, fixtures::CUSTOM_BASE_TOKEN),
            DepositRoute::BaseTokenToCustomChain
        );
        assert_eq!(
            DepositRoute::classify(&custom, fixtures::DAI_L1),
            DepositRoute::TokenToCustomChain
        );
    }

    // ========================================================================
    // Planning
    // ========================================================================

    #[test]
    fn test_plan_native_to_native_chain() {
        let req = request(Address::ZERO);
        let plan = DepositRoute::NativeToNativeChain
            .plan(&req, &resolved(eth_chain()))
            .unwrap();

        let expected_mint = U256::from(BASE_COST + TIP + AMOUNT);
        assert_eq!(plan.mint_value, expected_mint);
        assert_eq!(plan.value, expected_mint);
        assert!(plan.approvals.is_empty());

        let call = direct(&plan);
        assert_eq!(call.chainId, U256::from(fixtures::L2_CHAIN_ID));
        assert_eq!(call.l2Contract, RECEIVER);
        assert_eq!(call.l2Value, U256::from(AMOUNT));
        assert!(call.l2Calldata.is_empty());
        assert_eq!(call.l2GasLimit, U256::from(600_000u64));
        assert_eq!(call.l2GasPerPubdataByteLimit, U256::from(800u64));
        assert_eq!(call.refundRecipient, fixtures::SIGNER);
    }

    #[test]
    fn test_plan_token_to_native_chain() {
        let req = request(fixtures::DAI_L1).approving_token();
        let plan = DepositRoute::TokenToNativeChain
            .plan(&req, &resolved(eth_chain()))
            .unwrap();

        let expected_mint = U256::from(BASE_COST + TIP);
        assert_eq!(plan.mint_value, expected_mint);
        assert_eq!(plan.value, expected_mint);
        assert_eq!(
            plan.approvals,
            vec![ApprovalRequirement::new(
                fixtures::DAI_L1,
                fixtures::SHARED_L1,
                U256::from(AMOUNT),
                TxOverrides::default()
            )]
        );

        let call = two_bridges(&plan);
        assert_eq!(call.secondBridgeAddress, fixtures::SHARED_L1);
        assert_eq!(call.secondBridgeValue, U256::ZERO);
        assert_eq!(call.l2Value, U256::ZERO);
        let (token, amount, to) = second_bridge_args(&call);
        assert_eq!(token, fixtures::DAI_L1);
        assert_eq!(amount, U256::from(AMOUNT));
        assert_eq!(to, RECEIVER);
    }

    #[test]
    fn test_plan_token_uses_custom_bridge() {
        let custom_bridge = address!("1234567890123456789012345678901234567890");
        let req = request(fixtures::DAI_L1)
            .with_bridge(custom_bridge, None)
            .approving_token();
        let plan = DepositRoute::TokenToNativeChain
            .plan(&req, &resolved(eth_chain()))
            .unwrap();

        assert_eq!(two_bridges(&plan).secondBridgeAddress, custom_bridge);
        assert_eq!(plan.approvals[0].spender, custom_bridge);
    }

    #[test]
    fn test_plan_native_to_custom_chain() {
        let req = request(Address::ZERO).approving_base_token();
        let plan = DepositRoute::NativeToCustomChain
            .plan(&req, &resolved(custom_chain()))
            .unwrap();

        let expected_mint = U256::from(BASE_COST + TIP);
        assert_eq!(plan.mint_value, expected_mint);
        assert_eq!(plan.value, U256::from(AMOUNT));
        assert_eq!(plan.approvals.len(), 1);
        assert_eq!(plan.approvals[0].token, fixtures::CUSTOM_BASE_TOKEN);
        assert_eq!(plan.approvals[0].spender, fixtures::SHARED_L1);
        assert_eq!(plan.approvals[0].amount, expected_mint);

        let call = two_bridges(&plan);
        assert_eq!(call.secondBridgeValue, U256::from(AMOUNT));
        let (token, amount, to) = second_bridge_args(&call);
        assert_eq!(token, ETH_ADDRESS_IN_CONTRACTS);
        assert_eq!(amount, U256::ZERO);
        assert_eq!(to, RECEIVER);
    }

    #[test]
    fn test_plan_base_token_to_custom_chain() {
        let req = request(fixtures::CUSTOM_BASE_TOKEN).approving_token();
        let plan = DepositRoute::BaseTokenToCustomChain
            .plan(&req, &resolved(custom_chain()))
            .unwrap();

        let expected_mint = U256::from(BASE_COST + TIP + AMOUNT);
        assert_eq!(plan.mint_value, expected_mint);
        assert_eq!(plan.value, U256::ZERO);
        assert_eq!(plan.approvals.len(), 1);
        assert_eq!(plan.approvals[0].token, fixtures::CUSTOM_BASE_TOKEN);
        assert_eq!(plan.approvals[0].amount, expected_mint);

        let call = direct(&plan);
        assert_eq!(call.mintValue, expected_mint);
        assert_eq!(call.l2Value, U256::from(AMOUNT));
    }

    #[test]
    fn test_plan_token_to_custom_chain_needs_both_approvals() {
        let req = request(fixtures::DAI_L1)
            .approving_token()
            .approving_base_token();
        let plan = DepositRoute::TokenToCustomChain
            .plan(&req, &resolved(custom_chain()))
            .unwrap();

        let expected_mint = U256::from(BASE_COST + TIP);
        assert_eq!(plan.value, U256::ZERO);
        assert_eq!(plan.approvals.len(), 2);
        assert_eq!(plan.approvals[0].token, fixtures::CUSTOM_BASE_TOKEN);
        assert_eq!(plan.approvals[0].amount, expected_mint);
        assert_eq!(plan.approvals[1].token, fixtures::DAI_L1);
        assert_eq!(plan.approvals[1].amount, U256::from(AMOUNT));
        assert_eq!(two_bridges(&plan).secondBridgeValue, U256::ZERO);
    }

    #[test]
    fn test_plan_without_approval_flags_has_no_approvals() {
        let plan = DepositRoute::TokenToCustomChain
            .plan(&request(fixtures::DAI_L1), &resolved(custom_chain()))
            .unwrap();
        assert!(plan.approvals.is_empty());
    }

    #[test]
    fn test_every_route_rejects_mint_below_base_cost() {
        let cases = [
            (DepositRoute::NativeToNativeChain, Address::ZERO, eth_chain()),
            (DepositRoute::TokenToNativeChain, fixtures::DAI_L1, eth_chain()),
            (DepositRoute::NativeToCustomChain, Address::ZERO, custom_chain()),
            (DepositRoute::BaseTokenToCustomChain, fixtures::CUSTOM_BASE_TOKEN, custom_chain()),
            (DepositRoute::TokenToCustomChain, fixtures::DAI_L1, custom_chain()),
        ];
        let short = U256::from(BASE_COST - 1);
        for (route, token, context) in cases {
            let req = request(token).with_mint_value(short);
            match route.plan(&req, &resolved(context)) {
                Err(BridgeError::BaseCostExceedsValue { base_cost, value }) => {
                    assert_eq!(base_cost, U256::from(BASE_COST));
                    assert_eq!(value, short);
                }
                other => panic!("{}: unexpected {:?}", route.as_str(), other),
            }

            let plan = route
                .plan(&request(token), &resolved(context))
                .unwrap();
            assert!(plan.mint_value >= plan.base_cost);
        }
    }

    #[test]
    fn test_plan_rejects_overflowing_mint() {
        let req = DepositRequest::new(Address::ZERO, U256::MAX)
            .with_recipient(RECEIVER)
            .with_operator_tip(U256::from(1u64));
        for (route, context) in [
            (DepositRoute::NativeToNativeChain, eth_chain()),
            (DepositRoute::BaseTokenToCustomChain, custom_chain()),
        ] {
            let err = route.plan(&req, &resolved(context)).unwrap_err();
            assert!(matches!(err, BridgeError::InvalidRequest(_)), "{}", route.as_str());
        }

        let req = request(fixtures::DAI_L1).with_operator_tip(U256::MAX);
        let err = DepositRoute::TokenToNativeChain
            .plan(&req, &resolved(eth_chain()))
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidRequest(_)));
    }

    #[test]
    fn test_bridge_data_layout() {
        let data = encode_bridge_data("Ether", "ETH", 18);
        let (name, symbol, decimals) =
            <(Bytes, Bytes, Bytes)>::abi_decode_params(&data, true).unwrap();
        assert_eq!(String::abi_decode(&name, true).unwrap(), "Ether");
        assert_eq!(String::abi_decode(&symbol, true).unwrap(), "ETH");
        assert_eq!(U256::abi_decode(&decimals, true).unwrap(), U256::from(18u64));
    }

    // ========================================================================
    // End to end against mocks
    // ========================================================================

    fn chains(base_token: Address) -> (MockChain, MockChain) {
        let l1 = MockChain::l1();
        let l2 = MockChain::l2();
        l1.mock_call::<IBridgehub::baseTokenCall>(fixtures::BRIDGEHUB, word(base_token));
        l1.mock_call::<IBridgehub::l2TransactionBaseCostCall>(
            fixtures::BRIDGEHUB,
            word(U256::from(BASE_COST)),
        );
        (l1, l2)
    }

    #[tokio::test]
    async fn test_deposit_eth_to_eth_chain() {
        let (l1, l2) = chains(ETH_ADDRESS_IN_CONTRACTS);

        deposit(&l1, &l2, request(Address::ZERO)).await.unwrap();

        let sent = l1.sent();
        assert_eq!(sent.len(), 1);
        let expected_mint = U256::from(BASE_COST + TIP + AMOUNT);
        assert_eq!(sent[0].value, Some(expected_mint));
        assert_eq!(sent[0].gas, Some(scale_gas_limit(158_774, &SafetyMargins::default())));
        assert_eq!(sent[0].max_fee_per_gas, Some(151_000_000));

        // L1 gas estimated with the full mint value attached
        let estimates = l1.estimates();
        assert_eq!(estimates.len(), 1);
        assert_eq!(estimates[0].value, Some(expected_mint));

        // Base token arrives as plain value on L2
        let gas_requests = l2.l1_to_l2_requests();
        assert_eq!(gas_requests.len(), 1);
        assert_eq!(gas_requests[0].from, fixtures::SIGNER);
        assert_eq!(gas_requests[0].to, RECEIVER);
        assert_eq!(gas_requests[0].value, U256::from(AMOUNT));
        assert!(gas_requests[0].data.is_empty());
    }

    #[tokio::test]
    async fn test_deposit_erc20_simulates_aliased_bridge() {
        let (l1, l2) = chains(ETH_ADDRESS_IN_CONTRACTS);
        l1.mock_call::<ERC20::nameCall>(fixtures::DAI_L1, word("DAI".to_string()));
        l1.mock_call::<ERC20::symbolCall>(fixtures::DAI_L1, word("DAI".to_string()));
        l1.mock_call::<ERC20::decimalsCall>(fixtures::DAI_L1, word(alloy::primitives::U256::from(18u8)));
        l1.mock_call::<ERC20::allowanceCall>(fixtures::DAI_L1, word(U256::from(AMOUNT)));

        deposit(&l1, &l2, request(fixtures::DAI_L1).approving_token())
            .await
            .unwrap();

        // Allowance already covers the amount
        assert!(l1.sent_to(fixtures::DAI_L1).is_empty());
        assert_eq!(l1.sent_to(fixtures::BRIDGEHUB).len(), 1);

        let gas_requests = l2.l1_to_l2_requests();
        assert_eq!(gas_requests[0].from, apply_l1_to_l2_alias(fixtures::SHARED_L1));
        assert_eq!(gas_requests[0].to, fixtures::SHARED_L2);
        let call =
            IL2SharedBridge::finalizeDepositCall::abi_decode(&gas_requests[0].data, true).unwrap();
        assert_eq!(call._l1Sender, fixtures::SIGNER);
        assert_eq!(call._l2Receiver, RECEIVER);
        assert_eq!(call._l1Token, fixtures::DAI_L1);
        assert_eq!(call._amount, U256::from(AMOUNT));
    }

    #[tokio::test]
    async fn test_deposit_approves_when_allowance_short() {
        let (l1, l2) = chains(fixtures::CUSTOM_BASE_TOKEN);
        l1.mock_call::<ERC20::allowanceCall>(fixtures::CUSTOM_BASE_TOKEN, word(U256::ZERO));

        deposit(
            &l1,
            &l2,
            request(fixtures::CUSTOM_BASE_TOKEN).approving_base_token(),
        )
        .await
        .unwrap();

        let approvals = l1.sent_to(fixtures::CUSTOM_BASE_TOKEN);
        assert_eq!(approvals.len(), 1);
        let approve = ERC20::approveCall::abi_decode(&approvals[0], true).unwrap();
        assert_eq!(approve.spender, fixtures::SHARED_L1);
        assert_eq!(approve.amount, U256::from(BASE_COST + TIP + AMOUNT));

        // Approval first, then the hub call
        let sent = l1.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].value, Some(U256::ZERO));
    }

    #[tokio::test]
    async fn test_deposit_token_to_custom_chain_approves_only_short_allowance() {
        let (l1, l2) = chains(fixtures::CUSTOM_BASE_TOKEN);
        l1.mock_call::<ERC20::nameCall>(fixtures::DAI_L1, word("DAI".to_string()));
        l1.mock_call::<ERC20::symbolCall>(fixtures::DAI_L1, word("DAI".to_string()));
        l1.mock_call::<ERC20::decimalsCall>(fixtures::DAI_L1, word(alloy::primitives::U256::from(18u8)));
        l1.mock_call::<ERC20::allowanceCall>(fixtures::CUSTOM_BASE_TOKEN, word(U256::MAX));
        l1.mock_call::<ERC20::allowanceCall>(fixtures::DAI_L1, word(U256::from(AMOUNT - 1)));

        let req = request(fixtures::DAI_L1)
            .approving_base_token()
            .approving_token();
        deposit(&l1, &l2, req).await.unwrap();

        assert!(l1.sent_to(fixtures::CUSTOM_BASE_TOKEN).is_empty());
        let approvals = l1.sent_to(fixtures::DAI_L1);
        assert_eq!(approvals.len(), 1);
        let approve = ERC20::approveCall::abi_decode(&approvals[0], true).unwrap();
        assert_eq!(approve.spender, fixtures::SHARED_L1);
        assert_eq!(approve.amount, U256::from(AMOUNT));

        let sent = l1.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(l1.sent_to(fixtures::BRIDGEHUB).len(), 1);
        assert_eq!(sent[1].value, Some(U256::ZERO));
    }

    #[tokio::test]
    async fn test_deposit_through_custom_bridge() {
        let (l1, l2) = chains(ETH_ADDRESS_IN_CONTRACTS);
        let custom_bridge = address!("1234567890123456789012345678901234567890");
        let custom_l2_bridge = address!("0987654321098765432109876543210987654321");
        l1.mock_call::<IL1Bridge::l2BridgeAddressCall>(custom_bridge, word(custom_l2_bridge));

        let req = request(fixtures::DAI_L1)
            .with_bridge(custom_bridge, Some(Bytes::from_static(b"meta")));
        deposit(&l1, &l2, req).await.unwrap();

        let gas_requests = l2.l1_to_l2_requests();
        assert_eq!(gas_requests[0].from, apply_l1_to_l2_alias(custom_bridge));
        assert_eq!(gas_requests[0].to, custom_l2_bridge);
        let call =
            IL2SharedBridge::finalizeDepositCall::abi_decode(&gas_requests[0].data, true).unwrap();
        assert_eq!(call._data, Bytes::from_static(b"meta"));
    }

    #[tokio::test]
    async fn test_deposit_honours_pinned_limits() {
        let (l1, l2) = chains(ETH_ADDRESS_IN_CONTRACTS);
        let req = request(Address::ZERO)
            .with_l2_gas_limit(700_000)
            .with_overrides(TxOverrides {
                gas_limit: Some(300_000),
                max_fee_per_gas: Some(2_000_000_000),
                max_priority_fee_per_gas: Some(1_000_000),
                ..Default::default()
            });

        deposit(&l1, &l2, req).await.unwrap();

        assert!(l2.l1_to_l2_requests().is_empty());
        assert!(l1.estimates().is_empty());
        let sent = l1.sent();
        assert_eq!(sent[0].gas, Some(300_000));
        assert_eq!(sent[0].max_fee_per_gas, Some(2_000_000_000));
        assert_eq!(direct_from(&sent[0]).l2GasLimit, U256::from(700_000u64));
    }

    fn direct_from(
        tx: &alloy::rpc::types::TransactionRequest,
    ) -> IBridgehub::L2TransactionRequestDirect {
        let input = tx.input.input().unwrap();
        IBridgehub::requestL2TransactionDirectCall::abi_decode(input, true)
            .unwrap()
            ._request
    }

    #[tokio::test]
    async fn test_deposit_without_signer() {
        let l1 = MockChain::l1().without_signer();
        let l2 = MockChain::l2();
        let err = deposit(&l1, &l2, request(Address::ZERO)).await.unwrap_err();
        assert!(matches!(err, BridgeError::AccountNotFound));
        assert!(l2.l1_to_l2_requests().is_empty());
    }

    #[tokio::test]
    async fn test_deposit_short_mint_submits_nothing() {
        let (l1, l2) = chains(ETH_ADDRESS_IN_CONTRACTS);
        let req = request(Address::ZERO).with_mint_value(U256::from(1u64));

        let err = deposit(&l1, &l2, req).await.unwrap_err();
        assert!(matches!(err, BridgeError::BaseCostExceedsValue { .. }));
        assert!(l1.sent().is_empty());
    }
}
