//! ERC20 Token Helpers
//!
//! Balance, metadata and allowance reads plus the allowance-gated approval
//! used by the deposit paths.

use alloy::primitives::{Address, TxHash, U256};
use tracing::{debug, info};

use crate::error::{BridgeError, BridgeResult};
use crate::evm::calls::{read_contract, submit_request};
use crate::evm::client::ChainRpc;
use crate::evm::contracts::ERC20;
use crate::types::TxOverrides;

/// Token metadata forwarded to the L2 bridge on first deposit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Get the ERC20 token balance of an address
pub async fn get_token_balance<R: ChainRpc + ?Sized>(
    rpc: &R,
    token: Address,
    account: Address,
) -> BridgeResult<U256> {
    let balance = read_contract(rpc, token, ERC20::balanceOfCall { account }).await?;
    Ok(balance._0)
}

/// Get the ERC20 token allowance
pub async fn get_token_allowance<R: ChainRpc + ?Sized>(
    rpc: &R,
    token: Address,
    owner: Address,
    spender: Address,
) -> BridgeResult<U256> {
    let allowance = read_contract(rpc, token, ERC20::allowanceCall { owner, spender }).await?;
    Ok(allowance._0)
}

/// Get name, symbol and decimals in one go
pub async fn get_token_info<R: ChainRpc + ?Sized>(
    rpc: &R,
    token: Address,
) -> BridgeResult<TokenInfo> {
    let (name, symbol, decimals) = tokio::try_join!(
        read_contract(rpc, token, ERC20::nameCall {}),
        read_contract(rpc, token, ERC20::symbolCall {}),
        read_contract(rpc, token, ERC20::decimalsCall {}),
    )?;
    Ok(TokenInfo {
        name: name._0,
        symbol: symbol._0,
        decimals: decimals._0,
    })
}

/// Submit `approve(spender, amount)` without waiting for it
pub async fn approve<R: ChainRpc + ?Sized>(
    rpc: &R,
    token: Address,
    spender: Address,
    amount: U256,
    overrides: &TxOverrides,
) -> BridgeResult<TxHash> {
    let tx = submit_request(token, &ERC20::approveCall { spender, amount }, U256::ZERO, overrides);
    rpc.send_transaction(tx).await
}

/// Approve `spender` for `required` unless the current allowance already covers it
///
/// Returns the approval hash when one was mined, `None` when skipped. Waits for
/// the approval receipt so a following transfer sees the new allowance.
pub async fn ensure_allowance<R: ChainRpc + ?Sized>(
    rpc: &R,
    token: Address,
    owner: Address,
    spender: Address,
    required: U256,
    overrides: &TxOverrides,
) -> BridgeResult<Option<TxHash>> {
    let current = get_token_allowance(rpc, token, owner, spender).await?;
    if current >= required {
        debug!(
            token = %token,
            spender = %spender,
            allowance = %current,
            required = %required,
            "Allowance sufficient, skipping approval"
        );
        return Ok(None);
    }

    let hash = approve(rpc, token, spender, required, overrides).await?;
    info!(
        token = %token,
        spender = %spender,
        amount = %required,
        tx_hash = %hash,
        "Approval submitted"
    );

    if !rpc.wait_for_receipt_status(hash).await? {
        return Err(BridgeError::TransactionFailed { hash });
    }
    Ok(Some(hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockChain;
    use alloy::primitives::address;
    use alloy::sol_types::{SolCall, SolValue};

    const TOKEN: Address = address!("70a0F165d6f8054d0d0CF8dFd4DD2005f0AF6B55");
    const SPENDER: Address = address!("648afeaf09a3db988ac41b786001235bbdbc7640");

    fn owner(chain: &MockChain) -> Address {
        chain.signer_address().unwrap()
    }

    #[tokio::test]
    async fn test_allowance_sufficient_skips_approval() {
        let chain = MockChain::l1();
        chain.mock_call::<ERC20::allowanceCall>(TOKEN, U256::from(100u64).abi_encode());

        let result = ensure_allowance(
            &chain,
            TOKEN,
            owner(&chain),
            SPENDER,
            U256::from(100u64),
            &TxOverrides::default(),
        )
        .await
        .unwrap();

        assert!(result.is_none());
        assert!(chain.sent().is_empty());
    }

    #[tokio::test]
    async fn test_allowance_short_approves_once() {
        let chain = MockChain::l1();
        chain.mock_call::<ERC20::allowanceCall>(TOKEN, U256::from(99u64).abi_encode());

        let result = ensure_allowance(
            &chain,
            TOKEN,
            owner(&chain),
            SPENDER,
            U256::from(100u64),
            &TxOverrides::default(),
        )
        .await
        .unwrap();

        assert!(result.is_some());
        let sent = chain.sent_to(TOKEN);
        assert_eq!(sent.len(), 1);
        let call = ERC20::approveCall::abi_decode(&sent[0], true).unwrap();
        assert_eq!(call.spender, SPENDER);
        assert_eq!(call.amount, U256::from(100u64));
    }

    #[tokio::test]
    async fn test_failed_approval_is_reported() {
        let chain = MockChain::l1();
        chain.mock_call::<ERC20::allowanceCall>(TOKEN, U256::ZERO.abi_encode());
        chain.fail_receipts();

        let err = ensure_allowance(
            &chain,
            TOKEN,
            owner(&chain),
            SPENDER,
            U256::from(1u64),
            &TxOverrides::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BridgeError::TransactionFailed { .. }));
    }

    #[tokio::test]
    async fn test_token_info() {
        let chain = MockChain::l1();
        chain.mock_call::<ERC20::nameCall>(TOKEN, "Dai Stablecoin".to_string().abi_encode());
        chain.mock_call::<ERC20::symbolCall>(TOKEN, "DAI".to_string().abi_encode());
        chain.mock_call::<ERC20::decimalsCall>(TOKEN, alloy::primitives::U256::from(18u8).abi_encode());

        let info = get_token_info(&chain, TOKEN).await.unwrap();
        assert_eq!(info.name, "Dai Stablecoin");
        assert_eq!(info.symbol, "DAI");
        assert_eq!(info.decimals, 18);
    }
}
