//! In-memory chain for exercising bridge flows without a node
//!
//! Contract reads are answered from canned return data keyed by
//! `(address, selector)`. Submitted transactions are recorded and can be made
//! to revert per call, which is how tests model on-chain guards such as a
//! withdrawal that is already finalized.

use alloy::{
    primitives::{keccak256, Address, Bytes, TxHash, U256},
    rpc::types::{TransactionReceipt, TransactionRequest},
    sol_types::SolCall,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::constants::ETH_ADDRESS_IN_CONTRACTS;
use crate::error::{BridgeError, BridgeResult};
use crate::evm::client::{ChainRpc, ZksRpc};
use crate::testing::fixtures;
use crate::types::{BridgeAddressSet, L1ToL2GasRequest, L2ToL1LogProof, L2TransactionReceipt};

type CallKey = (Address, [u8; 4]);

struct MockState {
    calls: HashMap<CallKey, Bytes>,
    reverts: HashSet<CallKey>,
    sent: Vec<TransactionRequest>,
    estimates: Vec<TransactionRequest>,
    gas_estimate: u64,
    gas_price: u128,
    base_fee: Option<u128>,
    priority_fee: u128,
    receipt_status: bool,
    bridgehub: Address,
    base_token: Address,
    bridges: BridgeAddressSet,
    main_contract: Address,
    l1_to_l2_gas: u64,
    l1_to_l2_requests: Vec<L1ToL2GasRequest>,
    receipts: HashMap<TxHash, L2TransactionReceipt>,
    inputs: HashMap<TxHash, Bytes>,
    proofs: HashMap<(TxHash, usize), L2ToL1LogProof>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: HashMap::new(),
            reverts: HashSet::new(),
            sent: Vec::new(),
            estimates: Vec::new(),
            gas_estimate: 158_774,
            gas_price: 150_000_000,
            base_fee: Some(100_000_000),
            priority_fee: 1_000_000,
            receipt_status: true,
            bridgehub: fixtures::BRIDGEHUB,
            base_token: ETH_ADDRESS_IN_CONTRACTS,
            bridges: fixtures::bridge_addresses(),
            main_contract: fixtures::MAIN_CONTRACT,
            l1_to_l2_gas: 600_000,
            l1_to_l2_requests: Vec::new(),
            receipts: HashMap::new(),
            inputs: HashMap::new(),
            proofs: HashMap::new(),
        }
    }
}

/// Scriptable [`ChainRpc`] + [`ZksRpc`] implementation
pub struct MockChain {
    chain_id: Option<u64>,
    signer: Option<Address>,
    state: Mutex<MockState>,
}

fn selector_of(tx: &TransactionRequest) -> Option<CallKey> {
    let to = *tx.to.as_ref()?.to()?;
    let input = tx.input.input()?;
    if input.len() < 4 {
        return None;
    }
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&input[..4]);
    Some((to, selector))
}

impl MockChain {
    pub fn new(chain_id: Option<u64>, signer: Option<Address>) -> Self {
        Self {
            chain_id,
            signer,
            state: Mutex::new(MockState::default()),
        }
    }

    /// L1 with the fixture signer attached
    pub fn l1() -> Self {
        Self::new(Some(fixtures::L1_CHAIN_ID), Some(fixtures::SIGNER))
    }

    /// L2 with the fixture signer attached
    pub fn l2() -> Self {
        Self::new(Some(fixtures::L2_CHAIN_ID), Some(fixtures::SIGNER))
    }

    pub fn without_signer(mut self) -> Self {
        self.signer = None;
        self
    }

    pub fn without_chain_id(mut self) -> Self {
        self.chain_id = None;
        self
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ========================================================================
    // Scripting
    // ========================================================================

    /// Answer calls of `C` on `to` with the given return data
    pub fn mock_call<C: SolCall>(&self, to: Address, ret: Vec<u8>) {
        self.state().calls.insert((to, C::SELECTOR), Bytes::from(ret));
    }

    /// Make calls, estimates and submissions of `C` on `to` revert
    pub fn revert_on<C: SolCall>(&self, to: Address) {
        self.state().reverts.insert((to, C::SELECTOR));
    }

    pub fn set_fees(&self, gas_price: u128, base_fee: Option<u128>, priority_fee: u128) {
        let mut state = self.state();
        state.gas_price = gas_price;
        state.base_fee = base_fee;
        state.priority_fee = priority_fee;
    }

    /// Every awaited receipt reports failure
    pub fn fail_receipts(&self) {
        self.state().receipt_status = false;
    }

    /// Report `token` as the chain's base token on the `zks_` side
    pub fn set_base_token(&self, token: Address) {
        self.state().base_token = token;
    }

    pub fn set_l2_receipt(&self, receipt: L2TransactionReceipt) {
        self.state()
            .receipts
            .insert(receipt.transaction_hash, receipt);
    }

    pub fn set_l2_input(&self, hash: TxHash, input: Bytes) {
        self.state().inputs.insert(hash, input);
    }

    pub fn set_proof(&self, hash: TxHash, index: usize, proof: L2ToL1LogProof) {
        self.state().proofs.insert((hash, index), proof);
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.state().sent.clone()
    }

    /// Calldata of every transaction submitted to `to`
    pub fn sent_to(&self, to: Address) -> Vec<Bytes> {
        self.state()
            .sent
            .iter()
            .filter(|tx| tx.to.as_ref().and_then(|kind| kind.to()) == Some(&to))
            .filter_map(|tx| tx.input.input().cloned())
            .collect()
    }

    pub fn estimates(&self) -> Vec<TransactionRequest> {
        self.state().estimates.clone()
    }

    pub fn l1_to_l2_requests(&self) -> Vec<L1ToL2GasRequest> {
        self.state().l1_to_l2_requests.clone()
    }

    fn reverted(&self, tx: &TransactionRequest) -> bool {
        selector_of(tx).is_some_and(|key| self.state().reverts.contains(&key))
    }
}

#[async_trait]
impl ChainRpc for MockChain {
    fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    async fn call(&self, tx: &TransactionRequest) -> BridgeResult<Bytes> {
        if self.reverted(tx) {
            return Err(BridgeError::from_rpc("eth_call", "execution reverted"));
        }
        let key = selector_of(tx).ok_or_else(|| BridgeError::Rpc {
            method: "eth_call".to_string(),
            message: "missing target or selector".to_string(),
        })?;
        self.state()
            .calls
            .get(&key)
            .cloned()
            .ok_or_else(|| BridgeError::Rpc {
                method: "eth_call".to_string(),
                message: format!(
                    "no mocked return for {} selector 0x{}",
                    key.0,
                    alloy::hex::encode(key.1)
                ),
            })
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> BridgeResult<u64> {
        if self.reverted(tx) {
            return Err(BridgeError::from_rpc("eth_estimateGas", "execution reverted"));
        }
        let mut state = self.state();
        state.estimates.push(tx.clone());
        Ok(state.gas_estimate)
    }

    async fn gas_price(&self) -> BridgeResult<u128> {
        Ok(self.state().gas_price)
    }

    async fn latest_base_fee(&self) -> BridgeResult<Option<u128>> {
        Ok(self.state().base_fee)
    }

    async fn max_priority_fee(&self) -> BridgeResult<u128> {
        Ok(self.state().priority_fee)
    }

    async fn balance(&self, _address: Address) -> BridgeResult<U256> {
        Ok(U256::ZERO)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> BridgeResult<TxHash> {
        let from = self.signer.ok_or(BridgeError::AccountNotFound)?;
        if self.reverted(&tx) {
            return Err(BridgeError::from_rpc(
                "eth_sendRawTransaction",
                "execution reverted",
            ));
        }
        let mut state = self.state();
        state.sent.push(tx.from(from));
        let nonce = state.sent.len() as u64;
        Ok(keccak256(nonce.to_be_bytes()))
    }

    async fn wait_for_receipt_status(&self, _hash: TxHash) -> BridgeResult<bool> {
        Ok(self.state().receipt_status)
    }

    async fn transaction_receipt(
        &self,
        _hash: TxHash,
    ) -> BridgeResult<Option<TransactionReceipt>> {
        Ok(None)
    }
}

#[async_trait]
impl ZksRpc for MockChain {
    async fn bridgehub_contract(&self) -> BridgeResult<Address> {
        Ok(self.state().bridgehub)
    }

    async fn bridge_contracts(&self) -> BridgeResult<BridgeAddressSet> {
        Ok(self.state().bridges)
    }

    async fn main_contract(&self) -> BridgeResult<Address> {
        Ok(self.state().main_contract)
    }

    async fn base_token_l1_address(&self) -> BridgeResult<Address> {
        Ok(self.state().base_token)
    }

    async fn estimate_gas_l1_to_l2(&self, request: &L1ToL2GasRequest) -> BridgeResult<u64> {
        let mut state = self.state();
        state.l1_to_l2_requests.push(request.clone());
        Ok(state.l1_to_l2_gas)
    }

    async fn l2_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> BridgeResult<Option<L2TransactionReceipt>> {
        Ok(self.state().receipts.get(&hash).cloned())
    }

    async fn l2_transaction_input(&self, hash: TxHash) -> BridgeResult<Option<Bytes>> {
        Ok(self.state().inputs.get(&hash).cloned())
    }

    async fn l2_to_l1_log_proof(
        &self,
        hash: TxHash,
        index: usize,
    ) -> BridgeResult<Option<L2ToL1LogProof>> {
        Ok(self.state().proofs.get(&(hash, index)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::calls::{call_request, read_contract};
    use crate::evm::contracts::ERC20;
    use alloy::sol_types::SolValue;

    #[tokio::test]
    async fn test_mocked_read_round_trip() {
        let chain = MockChain::l1();
        chain.mock_call::<ERC20::decimalsCall>(fixtures::DAI_L1, alloy::primitives::U256::from(6u8).abi_encode());

        let decimals = read_contract(&chain, fixtures::DAI_L1, ERC20::decimalsCall {})
            .await
            .unwrap();
        assert_eq!(decimals._0, 6);
    }

    #[tokio::test]
    async fn test_unmocked_read_fails() {
        let chain = MockChain::l1();
        let err = chain
            .call(&call_request(fixtures::DAI_L1, &ERC20::nameCall {}))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Rpc { .. }));
    }

    #[tokio::test]
    async fn test_reverting_submission_is_not_recorded() {
        let chain = MockChain::l1();
        chain.revert_on::<ERC20::approveCall>(fixtures::DAI_L1);

        let tx = call_request(
            fixtures::DAI_L1,
            &ERC20::approveCall {
                spender: Address::ZERO,
                amount: U256::ZERO,
            },
        );
        let err = chain.send_transaction(tx).await.unwrap_err();
        assert!(matches!(err, BridgeError::TransactionReverted { .. }));
        assert!(chain.sent().is_empty());
    }
}
