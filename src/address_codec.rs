//! Cross-Layer Address Codec
//!
//! When an L1 contract sends a message to L2, the L2 sees it as coming from
//! an aliased address:
//!
//! ```text
//! alias(x)   = (x + 0x1111000000000000000000000000000000001111) mod 2^160
//! dealias(y) = (y - 0x1111000000000000000000000000000000001111) mod 2^160
//! ```
//!
//! EOAs are never aliased. Also provides the ETH marker normalization used by
//! the deposit and withdrawal paths.

use alloy::primitives::{Address, B256, U160};

use crate::constants::{
    ETH_ADDRESS_IN_CONTRACTS, L1_TO_L2_ALIAS_OFFSET, L2_BASE_TOKEN_ADDRESS, LEGACY_ETH_ADDRESS,
};

fn to_u160(address: Address) -> U160 {
    U160::from_be_slice(address.as_slice())
}

fn from_u160(value: U160) -> Address {
    Address::from(value.to_be_bytes::<20>())
}

// ============================================================================
// Aliasing
// ============================================================================

/// Address under which an L1 contract appears on L2
pub fn apply_l1_to_l2_alias(address: Address) -> Address {
    from_u160(to_u160(address).wrapping_add(to_u160(L1_TO_L2_ALIAS_OFFSET)))
}

/// Recover the L1 contract address from its L2 alias
pub fn undo_l1_to_l2_alias(address: Address) -> Address {
    from_u160(to_u160(address).wrapping_sub(to_u160(L1_TO_L2_ALIAS_OFFSET)))
}

// ============================================================================
// Token Markers
// ============================================================================

/// Map the legacy zero ETH address to the marker the contracts expect
pub fn normalize_token(token: Address) -> Address {
    if token == LEGACY_ETH_ADDRESS {
        ETH_ADDRESS_IN_CONTRACTS
    } else {
        token
    }
}

/// Whether the address denotes ETH under any of its encodings
pub fn is_eth(token: Address) -> bool {
    token == LEGACY_ETH_ADDRESS
        || token == ETH_ADDRESS_IN_CONTRACTS
        || token == L2_BASE_TOKEN_ADDRESS
}

/// Address stored in the low 20 bytes of an indexed event topic
pub fn address_from_topic(topic: &B256) -> Address {
    Address::from_slice(&topic[12..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_alias_known_vector() {
        let l1 = address!("702942b8205e5dedcd3374e5f4419843adb0ae7f");
        assert_eq!(
            apply_l1_to_l2_alias(l1),
            address!("813a42b8205e5dedcd3374e5f4419843adb0bf90")
        );
    }

    #[test]
    fn test_dealias_inverts_alias() {
        let samples = [
            Address::ZERO,
            address!("648afeaf09a3db988ac41b786001235bbdbc7640"),
            address!("ffffffffffffffffffffffffffffffffffffffff"),
            address!("eeeeffffffffffffffffffffffffffffffffeeee"),
            L1_TO_L2_ALIAS_OFFSET,
        ];
        for x in samples {
            assert_eq!(undo_l1_to_l2_alias(apply_l1_to_l2_alias(x)), x);
            assert_eq!(apply_l1_to_l2_alias(undo_l1_to_l2_alias(x)), x);
        }
    }

    #[test]
    fn test_alias_wraps_around() {
        let high = address!("ffffffffffffffffffffffffffffffffffffffff");
        assert_eq!(
            apply_l1_to_l2_alias(high),
            address!("1111000000000000000000000000000000001110")
        );
        assert_eq!(
            undo_l1_to_l2_alias(Address::ZERO),
            address!("eeeeffffffffffffffffffffffffffffffffeeef")
        );
    }

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token(LEGACY_ETH_ADDRESS), ETH_ADDRESS_IN_CONTRACTS);
        let dai = address!("70a0F165d6f8054d0d0CF8dFd4DD2005f0AF6B55");
        assert_eq!(normalize_token(dai), dai);
    }

    #[test]
    fn test_is_eth() {
        assert!(is_eth(LEGACY_ETH_ADDRESS));
        assert!(is_eth(ETH_ADDRESS_IN_CONTRACTS));
        assert!(is_eth(L2_BASE_TOKEN_ADDRESS));
        assert!(!is_eth(address!("70a0F165d6f8054d0d0CF8dFd4DD2005f0AF6B55")));
    }

    #[test]
    fn test_address_from_topic() {
        let addr = address!("000000000000000000000000000000000000800a");
        let topic = addr.into_word();
        assert_eq!(address_from_topic(&topic), addr);
    }
}
