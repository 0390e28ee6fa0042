//! Bridge client configuration
//!
//! Loads RPC endpoints, signer and safety margins from the environment,
//! reading an optional `.env` file first.

use eyre::{eyre, Result, WrapErr};
use std::env;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::constants::{DEFAULT_BASE_FEE_MULTIPLIER_PERCENT, DEFAULT_GAS_LIMIT_SCALE_PERCENT};
use crate::evm::client::{EvmClient, EvmClientConfig};
use crate::redact::Redacted;
use crate::types::SafetyMargins;

fn default_receipt_timeout_secs() -> u64 {
    120
}

fn default_receipt_poll_interval_ms() -> u64 {
    500
}

/// Validate an RPC URL: http(s) scheme and a host are required
///
/// Plain http is accepted with a warning, since local node pairs run without TLS.
pub fn validate_rpc_url(url_str: &str, name: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url_str).map_err(|e| eyre!("{} must be a valid URL: {}", name, e))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(eyre!(
            "{} must use http:// or https:// scheme, got {}",
            name,
            scheme
        ));
    }

    if parsed.host_str().is_none() {
        return Err(eyre!("{} must have a host component", name));
    }

    if scheme == "http" {
        tracing::warn!(name = name, "RPC URL uses unencrypted http://");
    }

    Ok(())
}

/// Connection settings for an L1 + L2 node pair
#[derive(Clone)]
pub struct BridgeConfig {
    pub l1_rpc_url: String,
    pub l2_rpc_url: String,
    /// Queried from the node when unset
    pub l1_chain_id: Option<u64>,
    pub l2_chain_id: Option<u64>,
    /// Without a key both clients are read-only
    pub private_key: Option<Redacted<String>>,
    pub margins: SafetyMargins,
    pub receipt_timeout: Duration,
    pub receipt_poll_interval: Duration,
}

/// Custom Debug that redacts private_key to prevent accidental log leakage.
impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("l1_rpc_url", &self.l1_rpc_url)
            .field("l2_rpc_url", &self.l2_rpc_url)
            .field("l1_chain_id", &self.l1_chain_id)
            .field("l2_chain_id", &self.l2_chain_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("margins", &self.margins)
            .field("receipt_timeout", &self.receipt_timeout)
            .field("receipt_poll_interval", &self.receipt_poll_interval)
            .finish()
    }
}

impl BridgeConfig {
    /// Load configuration, reading `.env` if present
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env")
    }

    /// Load from a specific .env file path, then the environment
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::load_from_env()
    }

    /// Load configuration from environment variables
    pub fn load_from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| eyre!("{} environment variable is required", key))
        };
        let optional_u64 = |key: &str| -> Result<Option<u64>> {
            lookup(key)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .wrap_err_with(|| format!("{} must be a valid u64", key))
                })
                .transpose()
        };

        let config = BridgeConfig {
            l1_rpc_url: required("L1_RPC_URL")?,
            l2_rpc_url: required("L2_RPC_URL")?,
            l1_chain_id: optional_u64("L1_CHAIN_ID")?,
            l2_chain_id: optional_u64("L2_CHAIN_ID")?,
            private_key: lookup("PRIVATE_KEY")
                .filter(|v| !v.trim().is_empty())
                .map(Redacted),
            margins: SafetyMargins {
                base_fee_percent: optional_u64("BASE_FEE_MULTIPLIER_PERCENT")?
                    .unwrap_or(DEFAULT_BASE_FEE_MULTIPLIER_PERCENT),
                gas_limit_percent: optional_u64("GAS_LIMIT_SCALE_PERCENT")?
                    .unwrap_or(DEFAULT_GAS_LIMIT_SCALE_PERCENT),
            },
            receipt_timeout: Duration::from_secs(
                optional_u64("RECEIPT_TIMEOUT_SECS")?.unwrap_or(default_receipt_timeout_secs()),
            ),
            receipt_poll_interval: Duration::from_millis(
                optional_u64("RECEIPT_POLL_INTERVAL_MS")?
                    .unwrap_or(default_receipt_poll_interval_ms()),
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_rpc_url(&self.l1_rpc_url, "L1_RPC_URL")?;
        validate_rpc_url(&self.l2_rpc_url, "L2_RPC_URL")?;
        self.margins
            .validate()
            .map_err(|e| eyre!("Invalid safety margins: {}", e))?;
        if self.receipt_poll_interval.is_zero() {
            return Err(eyre!("RECEIPT_POLL_INTERVAL_MS must be positive"));
        }
        if self.receipt_timeout < self.receipt_poll_interval {
            return Err(eyre!(
                "RECEIPT_TIMEOUT_SECS must be at least the poll interval"
            ));
        }
        Ok(())
    }

    fn client_config(&self, rpc_url: &str, chain_id: Option<u64>) -> EvmClientConfig {
        EvmClientConfig {
            chain_id,
            private_key: self.private_key.clone(),
            receipt_timeout: self.receipt_timeout,
            poll_interval: self.receipt_poll_interval,
            ..EvmClientConfig::new(rpc_url)
        }
    }

    pub fn l1_client_config(&self) -> EvmClientConfig {
        self.client_config(&self.l1_rpc_url, self.l1_chain_id)
    }

    pub fn l2_client_config(&self) -> EvmClientConfig {
        self.client_config(&self.l2_rpc_url, self.l2_chain_id)
    }

    /// Connect the L1 and L2 clients
    pub async fn connect(&self) -> Result<(EvmClient, EvmClient)> {
        let l1 = EvmClient::connect(&self.l1_client_config())
            .await
            .wrap_err("Failed to connect L1 client")?;
        let l2 = EvmClient::connect(&self.l2_client_config())
            .await
            .wrap_err("Failed to connect L2 client")?;
        Ok((l1, l2))
    }
}
