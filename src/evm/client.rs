//! EVM RPC Client Wrapper
//!
//! Defines the two RPC seams the bridge operations are written against:
//!
//! - [`ChainRpc`] - plain Ethereum JSON-RPC (reads, estimation, submission)
//! - [`ZksRpc`] - the L2 node's `zks_` namespace on top of it
//!
//! [`EvmClient`] implements both over an alloy HTTP provider. The same client
//! type serves the L1 and the L2 side.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, TxHash, U128, U256, U64},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use eyre::{eyre, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{BridgeError, BridgeResult};
use crate::redact::Redacted;
use crate::types::{BridgeAddressSet, L1ToL2GasRequest, L2ToL1LogProof, L2TransactionReceipt};

// ============================================================================
// RPC Seams
// ============================================================================

/// Ethereum JSON-RPC surface used by the bridge operations
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Chain id this client is bound to, if known
    fn chain_id(&self) -> Option<u64>;

    /// Address transactions are signed with, if a signer is attached
    fn signer_address(&self) -> Option<Address>;

    async fn call(&self, tx: &TransactionRequest) -> BridgeResult<Bytes>;

    async fn estimate_gas(&self, tx: &TransactionRequest) -> BridgeResult<u64>;

    async fn gas_price(&self) -> BridgeResult<u128>;

    /// Base fee of the latest block, `None` on pre-London chains
    async fn latest_base_fee(&self) -> BridgeResult<Option<u128>>;

    async fn max_priority_fee(&self) -> BridgeResult<u128>;

    async fn balance(&self, address: Address) -> BridgeResult<U256>;

    /// Sign and broadcast; unset nonce, gas and fee fields are filled in
    async fn send_transaction(&self, tx: TransactionRequest) -> BridgeResult<TxHash>;

    /// Block until the transaction is mined and report its status
    async fn wait_for_receipt_status(&self, hash: TxHash) -> BridgeResult<bool>;

    async fn transaction_receipt(&self, hash: TxHash) -> BridgeResult<Option<TransactionReceipt>>;
}

/// `zks_` namespace of the L2 node
#[async_trait]
pub trait ZksRpc: ChainRpc {
    async fn bridgehub_contract(&self) -> BridgeResult<Address>;

    async fn bridge_contracts(&self) -> BridgeResult<BridgeAddressSet>;

    async fn main_contract(&self) -> BridgeResult<Address>;

    /// L1 address of the chain's base token, the in-contract ETH marker on ETH chains
    async fn base_token_l1_address(&self) -> BridgeResult<Address>;

    async fn estimate_gas_l1_to_l2(&self, request: &L1ToL2GasRequest) -> BridgeResult<u64>;

    async fn l2_transaction_receipt(&self, hash: TxHash)
        -> BridgeResult<Option<L2TransactionReceipt>>;

    async fn l2_transaction_input(&self, hash: TxHash) -> BridgeResult<Option<Bytes>>;

    /// `None` until the batch holding the log is committed on L1
    async fn l2_to_l1_log_proof(
        &self,
        hash: TxHash,
        index: usize,
    ) -> BridgeResult<Option<L2ToL1LogProof>>;
}

// ============================================================================
// Configuration
// ============================================================================

/// EVM client configuration
#[derive(Debug, Clone)]
pub struct EvmClientConfig {
    /// RPC URL (e.g., "http://localhost:8545")
    pub rpc_url: String,
    /// Chain ID; queried from the node when unset
    pub chain_id: Option<u64>,
    /// Private key for signing (optional, required for write operations)
    pub private_key: Option<Redacted<String>>,
    /// How long to wait for a receipt before giving up
    pub receipt_timeout: Duration,
    /// Receipt polling interval
    pub poll_interval: Duration,
}

impl EvmClientConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id: None,
            private_key: None,
            receipt_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(500),
        }
    }
}

// ============================================================================
// Client
// ============================================================================

type SignerProvider = alloy::providers::fillers::FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        alloy::providers::fillers::WalletFiller<EthereumWallet>,
    >,
    RootProvider<Http<Client>>,
    Http<Client>,
    Ethereum,
>;

/// alloy-backed client for either layer
pub struct EvmClient {
    provider: RootProvider<Http<Client>>,
    signer: Option<(Address, SignerProvider)>,
    chain_id: Option<u64>,
    receipt_timeout: Duration,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlock {
    base_fee_per_gas: Option<U128>,
}

#[derive(Debug, Deserialize)]
struct TransactionInput {
    input: Bytes,
}

impl EvmClient {
    /// Connect to the node, resolving the chain id if the config leaves it unset
    pub async fn connect(config: &EvmClientConfig) -> Result<Self> {
        let url: url::Url = config
            .rpc_url
            .parse()
            .map_err(|e| eyre!("Invalid RPC URL: {}", e))?;
        let provider = ProviderBuilder::new().on_http(url.clone());

        let chain_id = match config.chain_id {
            Some(id) => id,
            None => provider
                .get_chain_id()
                .await
                .map_err(|e| eyre!("Failed to query chain id: {}", e))?,
        };

        let signer = match &config.private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key
                    .expose()
                    .parse()
                    .map_err(|e| eyre!("Invalid private key: {}", e))?;
                let address = signer.address();
                let wallet = EthereumWallet::from(signer);
                Some((address, ProviderBuilder::new().wallet(wallet).on_http(url)))
            }
            None => None,
        };

        info!(
            rpc_url = %config.rpc_url,
            chain_id = chain_id,
            signer = ?signer.as_ref().map(|(address, _)| *address),
            "Created EVM client"
        );

        Ok(Self {
            provider,
            signer,
            chain_id: Some(chain_id),
            receipt_timeout: config.receipt_timeout,
            poll_interval: config.poll_interval,
        })
    }

    pub fn provider(&self) -> &RootProvider<Http<Client>> {
        &self.provider
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }
}

#[async_trait]
impl ChainRpc for EvmClient {
    fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|(address, _)| *address)
    }

    async fn call(&self, tx: &TransactionRequest) -> BridgeResult<Bytes> {
        self.provider
            .call(tx)
            .await
            .map_err(|e| BridgeError::from_rpc("eth_call", e))
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> BridgeResult<u64> {
        self.provider
            .estimate_gas(tx)
            .await
            .map_err(|e| BridgeError::from_rpc("eth_estimateGas", e))
    }

    async fn gas_price(&self) -> BridgeResult<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| BridgeError::from_rpc("eth_gasPrice", e))
    }

    async fn latest_base_fee(&self) -> BridgeResult<Option<u128>> {
        let block: Option<LatestBlock> = self
            .provider
            .client()
            .request("eth_getBlockByNumber", ("latest", false))
            .await
            .map_err(|e| BridgeError::from_rpc("eth_getBlockByNumber", e))?;
        Ok(block
            .and_then(|b| b.base_fee_per_gas)
            .map(|fee| fee.to::<u128>()))
    }

    async fn max_priority_fee(&self) -> BridgeResult<u128> {
        self.provider
            .get_max_priority_fee_per_gas()
            .await
            .map_err(|e| BridgeError::from_rpc("eth_maxPriorityFeePerGas", e))
    }

    async fn balance(&self, address: Address) -> BridgeResult<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| BridgeError::from_rpc("eth_getBalance", e))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> BridgeResult<TxHash> {
        let (from, signer) = self.signer.as_ref().ok_or(BridgeError::AccountNotFound)?;
        let chain_id = self.chain_id.ok_or(BridgeError::ChainNotConfigured)?;

        let mut tx = tx.from(*from);
        tx.chain_id = Some(chain_id);
        if tx.nonce.is_none() {
            let nonce = self
                .provider
                .get_transaction_count(*from)
                .await
                .map_err(|e| BridgeError::from_rpc("eth_getTransactionCount", e))?;
            tx.nonce = Some(nonce);
        }
        if tx.gas.is_none() {
            tx.gas = Some(self.estimate_gas(&tx).await?);
        }
        if tx.gas_price.is_none() && tx.max_fee_per_gas.is_none() {
            let fees = self
                .provider
                .estimate_eip1559_fees(None)
                .await
                .map_err(|e| BridgeError::from_rpc("eth_feeHistory", e))?;
            tx.max_fee_per_gas = Some(fees.max_fee_per_gas);
            tx.max_priority_fee_per_gas = Some(fees.max_priority_fee_per_gas);
        }

        let pending = signer
            .send_transaction(tx)
            .await
            .map_err(|e| BridgeError::from_rpc("eth_sendRawTransaction", e))?;
        let hash = *pending.tx_hash();
        debug!(tx_hash = %hash, chain_id = chain_id, "Transaction submitted");
        Ok(hash)
    }

    async fn wait_for_receipt_status(&self, hash: TxHash) -> BridgeResult<bool> {
        let start = std::time::Instant::now();
        while start.elapsed() < self.receipt_timeout {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                return Ok(receipt.status());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        Err(BridgeError::ReceiptNotFound { hash })
    }

    async fn transaction_receipt(&self, hash: TxHash) -> BridgeResult<Option<TransactionReceipt>> {
        self.provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| BridgeError::from_rpc("eth_getTransactionReceipt", e))
    }
}

#[async_trait]
impl ZksRpc for EvmClient {
    async fn bridgehub_contract(&self) -> BridgeResult<Address> {
        self.provider
            .client()
            .request_noparams("zks_getBridgehubContract")
            .await
            .map_err(|e| BridgeError::from_rpc("zks_getBridgehubContract", e))
    }

    async fn bridge_contracts(&self) -> BridgeResult<BridgeAddressSet> {
        self.provider
            .client()
            .request_noparams("zks_getBridgeContracts")
            .await
            .map_err(|e| BridgeError::from_rpc("zks_getBridgeContracts", e))
    }

    async fn main_contract(&self) -> BridgeResult<Address> {
        self.provider
            .client()
            .request_noparams("zks_getMainContract")
            .await
            .map_err(|e| BridgeError::from_rpc("zks_getMainContract", e))
    }

    async fn base_token_l1_address(&self) -> BridgeResult<Address> {
        self.provider
            .client()
            .request_noparams("zks_getBaseTokenL1Address")
            .await
            .map_err(|e| BridgeError::from_rpc("zks_getBaseTokenL1Address", e))
    }

    async fn estimate_gas_l1_to_l2(&self, request: &L1ToL2GasRequest) -> BridgeResult<u64> {
        let gas: U64 = self
            .provider
            .client()
            .request("zks_estimateGasL1ToL2", (request.clone(),))
            .await
            .map_err(|e| BridgeError::from_rpc("zks_estimateGasL1ToL2", e))?;
        Ok(gas.to::<u64>())
    }

    async fn l2_transaction_receipt(
        &self,
        hash: TxHash,
    ) -> BridgeResult<Option<L2TransactionReceipt>> {
        self.provider
            .client()
            .request("eth_getTransactionReceipt", (hash,))
            .await
            .map_err(|e| BridgeError::from_rpc("eth_getTransactionReceipt", e))
    }

    async fn l2_transaction_input(&self, hash: TxHash) -> BridgeResult<Option<Bytes>> {
        let tx: Option<TransactionInput> = self
            .provider
            .client()
            .request("eth_getTransactionByHash", (hash,))
            .await
            .map_err(|e| BridgeError::from_rpc("eth_getTransactionByHash", e))?;
        Ok(tx.map(|t| t.input))
    }

    async fn l2_to_l1_log_proof(
        &self,
        hash: TxHash,
        index: usize,
    ) -> BridgeResult<Option<L2ToL1LogProof>> {
        self.provider
            .client()
            .request("zks_getL2ToL1LogProof", (hash, index))
            .await
            .map_err(|e| BridgeError::from_rpc("zks_getL2ToL1LogProof", e))
    }
}
