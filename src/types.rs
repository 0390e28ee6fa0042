//! Common types for cross-layer bridge operations
//!
//! Holds the chain topology, request payloads and the L2 node's receipt and
//! proof shapes. Nothing here is persisted; every value is re-derived from
//! chain state per call.

use alloy::primitives::{Address, Bytes, TxHash, B256, U256, U64};
use alloy::rpc::types::Log;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::address_codec::normalize_token;
use crate::constants::{
    DEFAULT_BASE_FEE_MULTIPLIER_PERCENT, DEFAULT_GAS_LIMIT_SCALE_PERCENT,
    REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT,
};
use crate::error::{BridgeError, BridgeResult};
use crate::evm::contracts::IBridgehub;

// ============================================================================
// Topology
// ============================================================================

/// Identity of an L2 chain as seen from the L1 hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainContext {
    pub chain_id: u64,
    /// L1 address of the token the chain uses for fees
    pub base_token: Address,
    /// L1 hub contract
    pub bridgehub: Address,
    /// Whether the base token is ETH
    pub is_base_layer_native: bool,
}

/// Default bridge contracts, as reported by `zks_getBridgeContracts`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeAddressSet {
    #[serde(rename = "l1SharedDefaultBridge")]
    pub shared_l1: Address,
    #[serde(rename = "l2SharedDefaultBridge")]
    pub shared_l2: Address,
    #[serde(rename = "l1Erc20DefaultBridge", default)]
    pub legacy_l1: Option<Address>,
    #[serde(rename = "l2Erc20DefaultBridge", default)]
    pub legacy_l2: Option<Address>,
}

// ============================================================================
// Fees
// ============================================================================

/// Safety margins applied on top of node-reported fees and gas estimates
///
/// Both are heuristics, not protocol requirements. Values are percentages and
/// must be at least 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyMargins {
    pub base_fee_percent: u64,
    pub gas_limit_percent: u64,
}

impl Default for SafetyMargins {
    fn default() -> Self {
        Self {
            base_fee_percent: DEFAULT_BASE_FEE_MULTIPLIER_PERCENT,
            gas_limit_percent: DEFAULT_GAS_LIMIT_SCALE_PERCENT,
        }
    }
}

impl SafetyMargins {
    pub fn validate(&self) -> BridgeResult<()> {
        if self.base_fee_percent < 100 {
            return Err(BridgeError::InvalidRequest(format!(
                "base fee multiplier must be at least 100%, got {}%",
                self.base_fee_percent
            )));
        }
        if self.gas_limit_percent < 100 {
            return Err(BridgeError::InvalidRequest(format!(
                "gas limit scale must be at least 100%, got {}%",
                self.gas_limit_percent
            )));
        }
        Ok(())
    }
}

/// EIP-1559 fee pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeParams {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

/// Caller-supplied transaction parameters; unset fields are estimated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOverrides {
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

// ============================================================================
// Deposit Request
// ============================================================================

/// A deposit of `amount` of `token` from L1 into the L2 chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRequest {
    /// L1 token; the legacy zero address is read as ETH
    pub token: Address,
    pub amount: U256,
    /// L2 receiver, defaults to the signer
    pub recipient: Option<Address>,
    /// Receiver of unspent L2 gas, defaults to the signer
    pub refund_recipient: Option<Address>,
    pub operator_tip: U256,
    pub l2_gas_limit: Option<u64>,
    pub gas_per_pubdata_byte: u64,
    /// Custom L1 bridge; the shared bridge is used when unset
    pub bridge_address: Option<Address>,
    /// `finalizeDeposit` data for a custom bridge
    pub custom_bridge_data: Option<Bytes>,
    /// Approve the deposited token when allowance is short
    pub approve_token: Option<TxOverrides>,
    /// Approve the base token when allowance is short
    pub approve_base_token: Option<TxOverrides>,
    /// Value the caller is willing to mint; derived from the base cost when unset
    pub mint_value: Option<U256>,
    pub overrides: TxOverrides,
    pub margins: SafetyMargins,
}

impl DepositRequest {
    pub fn new(token: Address, amount: U256) -> Self {
        Self {
            token,
            amount,
            recipient: None,
            refund_recipient: None,
            operator_tip: U256::ZERO,
            l2_gas_limit: None,
            gas_per_pubdata_byte: REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT,
            bridge_address: None,
            custom_bridge_data: None,
            approve_token: None,
            approve_base_token: None,
            mint_value: None,
            overrides: TxOverrides::default(),
            margins: SafetyMargins::default(),
        }
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_refund_recipient(mut self, refund_recipient: Address) -> Self {
        self.refund_recipient = Some(refund_recipient);
        self
    }

    pub fn with_operator_tip(mut self, tip: U256) -> Self {
        self.operator_tip = tip;
        self
    }

    pub fn with_l2_gas_limit(mut self, l2_gas_limit: u64) -> Self {
        self.l2_gas_limit = Some(l2_gas_limit);
        self
    }

    pub fn with_bridge(mut self, bridge: Address, data: Option<Bytes>) -> Self {
        self.bridge_address = Some(bridge);
        self.custom_bridge_data = data;
        self
    }

    pub fn approving_token(mut self) -> Self {
        self.approve_token = Some(TxOverrides::default());
        self
    }

    pub fn approving_base_token(mut self) -> Self {
        self.approve_base_token = Some(TxOverrides::default());
        self
    }

    pub fn with_mint_value(mut self, mint_value: U256) -> Self {
        self.mint_value = Some(mint_value);
        self
    }

    pub fn with_overrides(mut self, overrides: TxOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_margins(mut self, margins: SafetyMargins) -> Self {
        self.margins = margins;
        self
    }

    /// Token with the ETH marker normalized
    pub fn l1_token(&self) -> Address {
        normalize_token(self.token)
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.gas_per_pubdata_byte == 0 {
            return Err(BridgeError::InvalidRequest(
                "gas per pubdata byte must be positive".to_string(),
            ));
        }
        if self.l2_gas_limit == Some(0) {
            return Err(BridgeError::InvalidRequest(
                "L2 gas limit must be positive".to_string(),
            ));
        }
        if self.custom_bridge_data.is_some() && self.bridge_address.is_none() {
            return Err(BridgeError::InvalidRequest(
                "custom bridge data requires a bridge address".to_string(),
            ));
        }
        self.margins.validate()
    }
}

// ============================================================================
// Priority Operations
// ============================================================================

/// Payload of a direct hub call; `mint_value` must cover the base cost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOperationParams {
    pub chain_id: u64,
    pub mint_value: U256,
    pub l2_target: Address,
    pub l2_value: U256,
    pub l2_calldata: Bytes,
    pub l2_gas_limit: u64,
    pub gas_per_pubdata_byte: u64,
    pub factory_deps: Vec<Bytes>,
    pub refund_recipient: Address,
}

impl From<PriorityOperationParams> for IBridgehub::L2TransactionRequestDirect {
    fn from(params: PriorityOperationParams) -> Self {
        IBridgehub::L2TransactionRequestDirect {
            chainId: U256::from(params.chain_id),
            mintValue: params.mint_value,
            l2Contract: params.l2_target,
            l2Value: params.l2_value,
            l2Calldata: params.l2_calldata,
            l2GasLimit: U256::from(params.l2_gas_limit),
            l2GasPerPubdataByteLimit: U256::from(params.gas_per_pubdata_byte),
            factoryDeps: params.factory_deps,
            refundRecipient: params.refund_recipient,
        }
    }
}

// ============================================================================
// L2 Receipts and Messages
// ============================================================================

/// One entry of an L2 receipt's `l2ToL1Logs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2ToL1Message {
    pub sender: Address,
    pub key: B256,
    pub value: B256,
    #[serde(default)]
    pub l1_batch_number: Option<U64>,
    #[serde(default)]
    pub tx_index_in_l1_batch: Option<U64>,
    /// Position within the receipt's `l2ToL1Logs`
    #[serde(skip)]
    pub log_index_in_receipt: usize,
}

impl L2ToL1Message {
    /// A zero value marks a failed priority operation
    pub fn signals_failure(&self) -> bool {
        self.value == B256::ZERO
    }
}

fn deserialize_indexed_messages<'de, D>(deserializer: D) -> Result<Vec<L2ToL1Message>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut messages: Vec<L2ToL1Message> = Vec::deserialize(deserializer)?;
    for (index, message) in messages.iter_mut().enumerate() {
        message.log_index_in_receipt = index;
    }
    Ok(messages)
}

/// Receipt returned by the L2 node, carrying its L2->L1 logs and batch position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2TransactionReceipt {
    pub transaction_hash: TxHash,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub status: Option<U64>,
    #[serde(default)]
    pub l1_batch_number: Option<U64>,
    #[serde(default)]
    pub l1_batch_tx_index: Option<U64>,
    #[serde(default)]
    pub logs: Vec<Log>,
    #[serde(default, deserialize_with = "deserialize_indexed_messages")]
    pub l2_to_l1_logs: Vec<L2ToL1Message>,
}

impl L2TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status == Some(U64::from(1u64))
    }

    pub fn batch_number(&self) -> Option<u64> {
        self.l1_batch_number.map(|n| n.to::<u64>())
    }

    pub fn batch_tx_index(&self) -> Option<u64> {
        self.l1_batch_tx_index.map(|n| n.to::<u64>())
    }
}

// ============================================================================
// Proofs
// ============================================================================

/// Raw `zks_getL2ToL1LogProof` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct L2ToL1LogProof {
    pub id: u64,
    pub proof: Vec<B256>,
    pub root: B256,
}

/// Merkle path proving a message's inclusion in a committed batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InclusionProof {
    pub batch_number: u64,
    /// Index of the message within the batch's message tree
    pub message_index: u64,
    pub sibling_hashes: Vec<B256>,
    pub root: B256,
}

impl InclusionProof {
    pub fn new(batch_number: u64, raw: L2ToL1LogProof) -> Self {
        Self {
            batch_number,
            message_index: raw.id,
            sibling_hashes: raw.proof,
            root: raw.root,
        }
    }
}

/// Withdrawal lifecycle as seen from L1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalFinalizationState {
    /// Message emitted but its batch is not yet provable on L1
    NotYetProcessable,
    /// Proof available, finalization not yet executed
    Processable,
    Finalized,
}

impl WithdrawalFinalizationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalFinalizationState::NotYetProcessable => "not_yet_processable",
            WithdrawalFinalizationState::Processable => "processable",
            WithdrawalFinalizationState::Finalized => "finalized",
        }
    }
}

impl fmt::Display for WithdrawalFinalizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// zks_estimateGasL1ToL2
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Meta {
    pub gas_per_pubdata: U256,
}

/// Call request for simulating an L1->L2 transaction on the L2 node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1ToL2GasRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub eip712_meta: Eip712Meta,
}

impl L1ToL2GasRequest {
    pub fn new(from: Address, to: Address, data: Bytes, value: U256, gas_per_pubdata: u64) -> Self {
        Self {
            from,
            to,
            data,
            value,
            eip712_meta: Eip712Meta {
                gas_per_pubdata: U256::from(gas_per_pubdata),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BOOTLOADER_FORMAL_ADDRESS, ETH_ADDRESS_IN_CONTRACTS};
    use alloy::primitives::address;

    #[test]
    fn test_bridge_address_set_from_rpc_json() {
        let json = r#"{
            "l1Erc20DefaultBridge": "0xbe270c78209cfda84310230aaa82e18936310b2e",
            "l2Erc20DefaultBridge": "0xfd61c893b903fa133908ce83dfef67c4c2350dd8",
            "l1WethBridge": "0x0000000000000000000000000000000000000000",
            "l2WethBridge": "0x0000000000000000000000000000000000000000",
            "l1SharedDefaultBridge": "0x648afeaf09a3db988ac41b786001235bbdbc7640",
            "l2SharedDefaultBridge": "0xfd61c893b903fa133908ce83dfef67c4c2350dd8"
        }"#;
        let set: BridgeAddressSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.shared_l1, address!("648afeaf09a3db988ac41b786001235bbdbc7640"));
        assert_eq!(set.shared_l2, address!("fd61c893b903fa133908ce83dfef67c4c2350dd8"));
        assert_eq!(
            set.legacy_l1,
            Some(address!("be270c78209cfda84310230aaa82e18936310b2e"))
        );
    }

    #[test]
    fn test_l2_receipt_indexes_messages() {
        let json = r#"{
            "transactionHash": "0x15c295874fe9ad8f6708def4208119c68999f7a76ac6447c111e658ba6bfaa1e",
            "from": "0x36615cf349d7f6344891b1e7ca7c72883f5dc049",
            "to": "0x000000000000000000000000000000000000800a",
            "status": "0x1",
            "l1BatchNumber": "0x7",
            "l1BatchTxIndex": "0x2",
            "logs": [],
            "l2ToL1Logs": [
                {
                    "blockNumber": "0x5",
                    "l1BatchNumber": "0x7",
                    "transactionIndex": "0x0",
                    "shardId": "0x0",
                    "isService": true,
                    "sender": "0x0000000000000000000000000000000000008008",
                    "key": "0x000000000000000000000000000000000000000000000000000000000000800a",
                    "value": "0x1111111111111111111111111111111111111111111111111111111111111111",
                    "transactionHash": "0x15c295874fe9ad8f6708def4208119c68999f7a76ac6447c111e658ba6bfaa1e",
                    "logIndex": "0x0"
                },
                {
                    "sender": "0x0000000000000000000000000000000000008001",
                    "key": "0x15c295874fe9ad8f6708def4208119c68999f7a76ac6447c111e658ba6bfaa1e",
                    "value": "0x0000000000000000000000000000000000000000000000000000000000000001"
                }
            ]
        }"#;
        let receipt: L2TransactionReceipt = serde_json::from_str(json).unwrap();
        assert!(receipt.succeeded());
        assert_eq!(receipt.batch_number(), Some(7));
        assert_eq!(receipt.batch_tx_index(), Some(2));
        assert_eq!(receipt.l2_to_l1_logs.len(), 2);
        assert_eq!(receipt.l2_to_l1_logs[0].log_index_in_receipt, 0);
        assert_eq!(receipt.l2_to_l1_logs[1].log_index_in_receipt, 1);
        assert_eq!(receipt.l2_to_l1_logs[1].sender, BOOTLOADER_FORMAL_ADDRESS);
        assert!(!receipt.l2_to_l1_logs[1].signals_failure());
    }

    #[test]
    fn test_l2_receipt_pending_batch() {
        let json = r#"{
            "transactionHash": "0x15c295874fe9ad8f6708def4208119c68999f7a76ac6447c111e658ba6bfaa1e",
            "from": "0x36615cf349d7f6344891b1e7ca7c72883f5dc049",
            "status": "0x0",
            "l1BatchNumber": null
        }"#;
        let receipt: L2TransactionReceipt = serde_json::from_str(json).unwrap();
        assert!(!receipt.succeeded());
        assert_eq!(receipt.batch_number(), None);
        assert!(receipt.l2_to_l1_logs.is_empty());
    }

    #[test]
    fn test_log_proof_json() {
        let json = r#"{
            "id": 112,
            "proof": ["0x010a000000000000000000000000000000000000000000000000000000000000"],
            "root": "0x00000000000000000000000000000000000000000000000000000000000000aa"
        }"#;
        let raw: L2ToL1LogProof = serde_json::from_str(json).unwrap();
        let proof = InclusionProof::new(9, raw);
        assert_eq!(proof.batch_number, 9);
        assert_eq!(proof.message_index, 112);
        assert_eq!(proof.sibling_hashes.len(), 1);
    }

    #[test]
    fn test_deposit_request_defaults() {
        let req = DepositRequest::new(Address::ZERO, U256::from(7_000_000_000u64));
        assert_eq!(req.l1_token(), ETH_ADDRESS_IN_CONTRACTS);
        assert_eq!(req.gas_per_pubdata_byte, REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT);
        assert_eq!(req.margins, SafetyMargins::default());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_deposit_request_validation() {
        let mut req = DepositRequest::new(Address::ZERO, U256::from(1u64));
        req.gas_per_pubdata_byte = 0;
        assert!(matches!(req.validate(), Err(BridgeError::InvalidRequest(_))));

        let mut req = DepositRequest::new(Address::ZERO, U256::from(1u64));
        req.custom_bridge_data = Some(Bytes::from_static(b"x"));
        assert!(matches!(req.validate(), Err(BridgeError::InvalidRequest(_))));

        let req = DepositRequest::new(Address::ZERO, U256::from(1u64)).with_margins(SafetyMargins {
            base_fee_percent: 99,
            gas_limit_percent: 120,
        });
        assert!(matches!(req.validate(), Err(BridgeError::InvalidRequest(_))));
    }

    #[test]
    fn test_withdrawal_state_display() {
        assert_eq!(
            WithdrawalFinalizationState::NotYetProcessable.to_string(),
            "not_yet_processable"
        );
        assert_eq!(WithdrawalFinalizationState::Finalized.as_str(), "finalized");
    }

    #[test]
    fn test_gas_request_serializes_eip712_meta() {
        let req =
            L1ToL2GasRequest::new(Address::ZERO, Address::ZERO, Bytes::new(), U256::ZERO, 800);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["eip712Meta"]["gasPerPubdata"], "0x320");
    }
}
