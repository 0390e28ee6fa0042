//! Protocol Constants
//!
//! Fixed addresses and limits of the Bridgehub protocol. These values are
//! part of the deployed system contracts and never change per chain.

use alloy::primitives::{address, Address};

// ============================================================================
// Token Markers
// ============================================================================

/// Address the L1 contracts use to denote ETH
pub const ETH_ADDRESS_IN_CONTRACTS: Address = address!("0000000000000000000000000000000000000001");

/// Zero address historically used by clients to denote ETH
pub const LEGACY_ETH_ADDRESS: Address = Address::ZERO;

// ============================================================================
// L2 System Contracts
// ============================================================================

/// Formal address of the bootloader, the sender of priority-operation status logs
pub const BOOTLOADER_FORMAL_ADDRESS: Address =
    address!("0000000000000000000000000000000000008001");

/// L1 messenger system contract, sender of every user L2->L1 message
pub const L1_MESSENGER_ADDRESS: Address = address!("0000000000000000000000000000000000008008");

/// L2 base token system contract
pub const L2_BASE_TOKEN_ADDRESS: Address = address!("000000000000000000000000000000000000800a");

// ============================================================================
// Aliasing
// ============================================================================

/// Offset added to an L1 contract address when it acts as sender on L2
pub const L1_TO_L2_ALIAS_OFFSET: Address = address!("1111000000000000000000000000000000001111");

// ============================================================================
// Limits and Defaults
// ============================================================================

/// Gas per pubdata byte required by L1->L2 transactions
pub const REQUIRED_L1_TO_L2_GAS_PER_PUBDATA_LIMIT: u64 = 800;

/// Default multiplier applied to the L1 base fee, in percent
pub const DEFAULT_BASE_FEE_MULTIPLIER_PERCENT: u64 = 150;

/// Default scaling applied to raw L1 gas estimates, in percent
pub const DEFAULT_GAS_LIMIT_SCALE_PERCENT: u64 = 120;

/// Bridge metadata passed for ETH deposits
pub const ETH_TOKEN_NAME: &str = "Ether";
pub const ETH_TOKEN_SYMBOL: &str = "ETH";
pub const ETH_TOKEN_DECIMALS: u8 = 18;
