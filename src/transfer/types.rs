//! Core types for the transfer workflow
//!
//! Session-local entities plus the wire shapes the abstraction service
//! expects. Wire fields carry explicit camelCase renames so the structs stay
//! the single source of truth for the service contract.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use ethers::types::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// Attempt ID - correlates all log lines of one transfer attempt
///
/// Structure (u64):
/// - 48 bits: Timestamp (milliseconds since epoch)
/// - 16 bits: Sequence (per-process counter)
///
/// Time-sortable, unique within a process, cheap to format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl AttemptId {
    pub fn next() -> Self {
        let timestamp_ms = Utc::now().timestamp_millis() as u64;
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
        Self((timestamp_ms << 16) | seq)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Timestamp component (milliseconds since epoch)
    pub fn timestamp_ms(&self) -> u64 {
        self.0 >> 16
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Last observed token balance of the smart account, in base units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    /// Net balance scaled by the token's decimals
    pub net_balance: u128,
    /// Fetch completion time (ms since epoch)
    pub fetched_at: i64,
}

/// User-entered transfer intent, unvalidated
#[derive(Debug, Clone, Default)]
pub struct TransferRequest {
    pub recipient: String,
    pub amount: String,
}

/// Result of a successful submission
///
/// Overwritten by each new success, never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransfer {
    pub tx_hash: String,
    pub explorer_url: String,
}

/// One encoded call forwarded to the abstraction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetail {
    #[serde(rename = "encodedData")]
    pub encoded_data: Bytes,
    #[serde(rename = "targetContractAddress")]
    pub target_contract_address: Address,
    /// Native value sent with the call; token transfers carry none
    pub value: u64,
}

/// Order direction tag attached to a built operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "AMOUNT_OUT")]
    AmountOut,
}

/// Order metadata the service attaches to the built operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderMetadata {
    /// Token amount in base units, as a decimal string
    pub amount: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
}

impl OrderMetadata {
    pub fn amount_out(base_units: u128) -> Self {
        Self {
            amount: base_units.to_string(),
            order_type: OrderType::AmountOut,
        }
    }
}

/// Signature scheme used to authorize a user operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignMode {
    #[serde(rename = "ECDSA")]
    Ecdsa,
}

impl SignMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignMode::Ecdsa => "ECDSA",
        }
    }
}

/// User operation built by the service, awaiting signature and submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltTransaction {
    #[serde(rename = "messageToSign")]
    pub message_to_sign: String,
    /// Opaque to this client; signed and echoed back on submission
    #[serde(rename = "userOp")]
    pub user_op: serde_json::Value,
}

/// Block-explorer link for a submitted transaction
pub fn explorer_tx_url(explorer_base: &str, tx_hash: &str) -> String {
    format!("{}/tx/{}", explorer_base.trim_end_matches('/'), tx_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_ids_are_unique_and_sorted() {
        let a = AttemptId::next();
        let b = AttemptId::next();

        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
        assert!(a.timestamp_ms() > 0);
    }

    #[test]
    fn test_transaction_detail_wire_shape() {
        let detail = TransactionDetail {
            encoded_data: Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb]),
            target_contract_address: "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"
                .parse()
                .unwrap(),
            value: 0,
        };

        let json = serde_json::to_string(&detail).unwrap();
        assert!(json.contains("\"encodedData\":\"0xa9059cbb\""));
        assert!(json.contains("\"targetContractAddress\""));
        assert!(json.contains("\"value\":0"));
    }

    #[test]
    fn test_order_metadata_wire_shape() {
        let order = OrderMetadata::amount_out(10_000_000);

        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"amount\":\"10000000\""));
        assert!(json.contains("\"type\":\"AMOUNT_OUT\""));
    }

    #[test]
    fn test_sign_mode_wire_shape() {
        let json = serde_json::to_string(&SignMode::Ecdsa).unwrap();
        assert_eq!(json, "\"ECDSA\"");
        assert_eq!(SignMode::Ecdsa.as_str(), "ECDSA");
    }

    #[test]
    fn test_built_transaction_decode() {
        let json = r#"{"messageToSign":"0xabc123","userOp":{"nonce":"0x1"}}"#;
        let built: BuiltTransaction = serde_json::from_str(json).unwrap();

        assert_eq!(built.message_to_sign, "0xabc123");
        assert_eq!(built.user_op["nonce"], "0x1");
    }

    #[test]
    fn test_explorer_tx_url() {
        assert_eq!(
            explorer_tx_url("https://optimistic.etherscan.io", "0xdeadbeef"),
            "https://optimistic.etherscan.io/tx/0xdeadbeef"
        );
        // Trailing slash on the base is tolerated
        assert_eq!(
            explorer_tx_url("https://optimistic.etherscan.io/", "0xdeadbeef"),
            "https://optimistic.etherscan.io/tx/0xdeadbeef"
        );
    }
}
