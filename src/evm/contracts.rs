//! Bridgehub protocol contract ABI definitions
//!
//! Uses alloy's sol! macro to generate call and event bindings for the L1 hub,
//! the shared bridges on both layers and the L2 system contracts. Calls are
//! encoded here and dispatched through the [`ChainRpc`](super::client::ChainRpc)
//! seam, so the bindings carry no provider.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

sol! {
    // ========================================================================
    // L1: Bridgehub
    // ========================================================================

    /// L1 hub routing priority operations to registered chains
    contract IBridgehub {
        struct L2TransactionRequestDirect {
            uint256 chainId;
            uint256 mintValue;
            address l2Contract;
            uint256 l2Value;
            bytes l2Calldata;
            uint256 l2GasLimit;
            uint256 l2GasPerPubdataByteLimit;
            bytes[] factoryDeps;
            address refundRecipient;
        }

        struct L2TransactionRequestTwoBridgesOuter {
            uint256 chainId;
            uint256 mintValue;
            uint256 l2Value;
            uint256 l2GasLimit;
            uint256 l2GasPerPubdataByteLimit;
            address refundRecipient;
            address secondBridgeAddress;
            uint256 secondBridgeValue;
            bytes secondBridgeCalldata;
        }

        function requestL2TransactionDirect(L2TransactionRequestDirect calldata _request) external payable returns (bytes32 canonicalTxHash);
        function requestL2TransactionTwoBridges(L2TransactionRequestTwoBridgesOuter calldata _request) external payable returns (bytes32 canonicalTxHash);
        function l2TransactionBaseCost(uint256 _chainId, uint256 _gasPrice, uint256 _l2GasLimit, uint256 _l2GasPerPubdataByteLimit) external view returns (uint256);
        function baseToken(uint256 _chainId) external view returns (address);
    }

    // ========================================================================
    // L1: Shared Bridge
    // ========================================================================

    /// L1 side of the shared bridge, holding deposited assets
    contract IL1SharedBridge {
        function finalizeWithdrawal(uint256 _chainId, uint256 _l2BatchNumber, uint256 _l2MessageIndex, uint16 _l2TxNumberInBatch, bytes calldata _message, bytes32[] calldata _merkleProof) external;
        function claimFailedDeposit(uint256 _chainId, address _depositSender, address _l1Token, uint256 _amount, bytes32 _l2TxHash, uint256 _l2BatchNumber, uint256 _l2MessageIndex, uint16 _l2TxNumberInBatch, bytes32[] calldata _merkleProof) external;
        function isWithdrawalFinalized(uint256 _chainId, uint256 _l2BatchNumber, uint256 _l2MessageIndex) external view returns (bool);
    }

    /// Any L1 bridge that pairs with an L2 counterpart (custom bridges included)
    contract IL1Bridge {
        function l2BridgeAddress(uint256 _chainId) external view returns (address);
    }

    /// Legacy ERC20 bridge; only its finalize selector is used to tag withdrawal messages
    contract IL1ERC20Bridge {
        function finalizeWithdrawal(uint256 _l2BatchNumber, uint256 _l2MessageIndex, uint16 _l2TxNumberInBatch, bytes calldata _message, bytes32[] calldata _merkleProof) external;
    }

    // ========================================================================
    // L1: Chain Diamond (Mailbox)
    // ========================================================================

    contract IMailbox {
        struct L2CanonicalTransaction {
            uint256 txType;
            uint256 from;
            uint256 to;
            uint256 gasLimit;
            uint256 gasPerPubdataByteLimit;
            uint256 maxFeePerGas;
            uint256 maxPriorityFeePerGas;
            uint256 paymaster;
            uint256 nonce;
            uint256 value;
            uint256[4] reserved;
            bytes data;
            bytes signature;
            uint256[] factoryDeps;
            bytes paymasterInput;
            bytes reservedDynamic;
        }

        /// Emitted for every priority operation queued for an L2 chain
        event NewPriorityRequest(uint256 txId, bytes32 txHash, uint64 expirationTimestamp, L2CanonicalTransaction transaction, bytes[] factoryDeps);

        function finalizeEthWithdrawal(uint256 _l2BatchNumber, uint256 _l2MessageIndex, uint16 _l2TxNumberInBatch, bytes calldata _message, bytes32[] calldata _merkleProof) external;
    }

    // ========================================================================
    // L2: Shared Bridge
    // ========================================================================

    contract IL2SharedBridge {
        function finalizeDeposit(address _l1Sender, address _l2Receiver, address _l1Token, uint256 _amount, bytes calldata _data) external;
        function withdraw(address _l1Receiver, address _l2Token, uint256 _amount) external;
        function l1SharedBridge() external view returns (address);
        function l2TokenAddress(address _l1Token) external view returns (address);
    }

    // ========================================================================
    // L2: System Contracts
    // ========================================================================

    contract IL2BaseToken {
        function withdraw(address _l1Receiver) external payable;
    }

    contract IL1Messenger {
        event L1MessageSent(address indexed _sender, bytes32 indexed _hash, bytes _message);
    }

    // ========================================================================
    // ERC20
    // ========================================================================

    contract ERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
