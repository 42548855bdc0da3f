//! Typed response models.

use serde::{Deserialize, Deserializer, Serialize};

use crate::{ProviderError, ProviderResult};

/// On-chain account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    /// The account has no code or data yet.
    Uninitialized,
    /// The account is deployed and running.
    Active,
    /// The account is frozen.
    Frozen,
}

impl std::fmt::Display for AccountState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            AccountState::Uninitialized => "uninitialized",
            AccountState::Active => "active",
            AccountState::Frozen => "frozen",
        };
        f.write_str(text)
    }
}

/// Result of `getAddressInfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInfo {
    /// Balance in nanotons.
    #[serde(deserialize_with = "u128_from_string_or_number")]
    pub balance: u128,
    /// Account state.
    pub state: AccountState,
    /// Deployed code, base64 BoC (empty for uninitialized accounts).
    #[serde(default)]
    pub code: String,
    /// Persistent data, base64 BoC (empty for uninitialized accounts).
    #[serde(default)]
    pub data: String,
}

/// Parameters of `estimateFee`.
#[derive(Debug, Clone, Serialize)]
pub struct FeeRequest {
    /// Destination address text.
    pub address: String,
    /// Message body, base64 BoC.
    pub body: String,
    /// State-init code, base64 BoC, on deploying messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_code: Option<String>,
    /// State-init data, base64 BoC, on deploying messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_data: Option<String>,
}

/// Result of `estimateFee`.
#[derive(Debug, Clone, Deserialize)]
pub struct Fees {
    /// Fees charged on the source account.
    pub source_fees: SourceFees,
}

/// The fee components, in nanotons.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SourceFees {
    /// Gas fee.
    pub gas_fee: u64,
    /// Inbound forwarding fee.
    pub in_fwd_fee: u64,
    /// Forwarding fee.
    pub fwd_fee: u64,
    /// Storage fee.
    pub storage_fee: u64,
}

impl SourceFees {
    /// Sum of all components.
    pub fn total(&self) -> u64 {
        self.gas_fee + self.in_fwd_fee + self.fwd_fee + self.storage_fee
    }
}

/// One transaction from `getTransactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    /// Unix time of the transaction.
    #[serde(default)]
    pub utime: u64,
    /// Transaction id.
    pub transaction_id: TransactionId,
    /// Inbound message.
    pub in_msg: Option<TxMessage>,
    /// Outbound messages.
    #[serde(default)]
    pub out_msgs: Vec<TxMessage>,
}

/// Logical-time + hash transaction id.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionId {
    /// Logical time as a decimal string.
    pub lt: String,
    /// Base64 transaction hash.
    pub hash: String,
}

/// A message attached to a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TxMessage {
    /// Source address text (empty for external messages).
    #[serde(default)]
    pub source: String,
    /// Destination address text (empty for log messages).
    #[serde(default)]
    pub destination: String,
    /// Attached value in nanotons.
    #[serde(default)]
    pub value: String,
    /// Message text payload, when present.
    #[serde(default)]
    pub message: String,
}

/// Result of `runGetMethod`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetMethodResult {
    /// TVM exit code; 0 means the getter ran successfully.
    pub exit_code: i64,
    /// The result stack.
    #[serde(default)]
    pub stack: Vec<serde_json::Value>,
}

impl GetMethodResult {
    /// Whether the getter ran successfully.
    pub fn is_ok(&self) -> bool {
        self.exit_code == 0
    }

    /// Number of stack entries.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Read a numeric stack entry (`["num", "0x…"]`) as u64.
    pub fn num_u64(&self, index: usize) -> ProviderResult<u64> {
        let hex = self.num_hex(index)?;
        u64::from_str_radix(&hex, 16)
            .map_err(|_| bad_stack(index, "u64 out of range"))
    }

    /// Read a numeric stack entry as u128.
    pub fn num_u128(&self, index: usize) -> ProviderResult<u128> {
        let hex = self.num_hex(index)?;
        u128::from_str_radix(&hex, 16)
            .map_err(|_| bad_stack(index, "u128 out of range"))
    }

    /// Read a numeric stack entry as i64 (small signed values such as
    /// workchain ids).
    pub fn num_i64(&self, index: usize) -> ProviderResult<i64> {
        let hex = self.num_hex(index)?;
        if let Some(rest) = hex.strip_prefix('-') {
            i64::from_str_radix(rest, 16)
                .map(|v| -v)
                .map_err(|_| bad_stack(index, "i64 out of range"))
        } else {
            i64::from_str_radix(&hex, 16)
                .map_err(|_| bad_stack(index, "i64 out of range"))
        }
    }

    /// Read a 256-bit numeric stack entry as 32 big-endian bytes.
    pub fn num_bytes32(&self, index: usize) -> ProviderResult<[u8; 32]> {
        let hex = self.num_hex(index)?;
        if hex.len() > 64 {
            return Err(bad_stack(index, "value wider than 256 bits"));
        }
        let padded = format!("{:0>64}", hex);
        let mut out = [0u8; 32];
        for (i, chunk) in padded.as_bytes().chunks(2).enumerate() {
            let text = std::str::from_utf8(chunk).expect("hex digits are ascii");
            out[i] = u8::from_str_radix(text, 16)
                .map_err(|_| bad_stack(index, "bad hex digit"))?;
        }
        Ok(out)
    }

    fn num_hex(&self, index: usize) -> ProviderResult<String> {
        let entry = self
            .stack
            .get(index)
            .ok_or_else(|| bad_stack(index, "missing entry"))?;
        let pair = entry
            .as_array()
            .ok_or_else(|| bad_stack(index, "not a [type, value] pair"))?;
        let kind = pair.first().and_then(|v| v.as_str());
        if kind != Some("num") {
            return Err(bad_stack(index, "not a num entry"));
        }
        let value = pair
            .get(1)
            .and_then(|v| v.as_str())
            .ok_or_else(|| bad_stack(index, "missing value"))?;
        let trimmed = if let Some(rest) = value.strip_prefix("-0x") {
            format!("-{}", rest)
        } else if let Some(rest) = value.strip_prefix("0x") {
            rest.to_string()
        } else {
            value.to_string()
        };
        Ok(trimmed)
    }
}

fn bad_stack(index: usize, reason: &str) -> ProviderError {
    ProviderError::UnexpectedResponse(format!("stack entry {}: {}", index, reason))
}

fn u128_from_string_or_number<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_json::Value::deserialize(deserializer)?;
    match &value {
        serde_json::Value::String(s) => {
            s.parse().map_err(|_| D::Error::custom("bad balance string"))
        }
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| D::Error::custom("bad balance number")),
        _ => Err(D::Error::custom("balance must be string or number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_info_with_string_balance() {
        let json = r#"{
            "balance": "1234567890",
            "state": "active",
            "code": "te6cc…",
            "data": "te6cc…"
        }"#;
        let info: AddressInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.balance, 1_234_567_890);
        assert_eq!(info.state, AccountState::Active);
    }

    #[test]
    fn test_address_info_uninitialized() {
        let json = r#"{"balance": 0, "state": "uninitialized"}"#;
        let info: AddressInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.balance, 0);
        assert_eq!(info.state, AccountState::Uninitialized);
        assert!(info.code.is_empty());
    }

    #[test]
    fn test_fees_parsing_and_total() {
        let json = r#"{
            "@type": "query.fees",
            "source_fees": {
                "@type": "fees",
                "gas_fee": 2994000,
                "in_fwd_fee": 1260000,
                "fwd_fee": 0,
                "storage_fee": 276
            }
        }"#;
        let fees: Fees = serde_json::from_str(json).unwrap();
        assert_eq!(fees.source_fees.gas_fee, 2_994_000);
        assert_eq!(fees.source_fees.total(), 2_994_000 + 1_260_000 + 276);
    }

    #[test]
    fn test_fee_request_skips_absent_state_init() {
        let request = FeeRequest {
            address: "EQabc".to_string(),
            body: "te6".to_string(),
            init_code: None,
            init_data: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("init_code"));

        let request = FeeRequest {
            init_code: Some("code".to_string()),
            ..request
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("init_code"));
    }

    #[test]
    fn test_get_method_stack_parsing() {
        let json = r#"{
            "exit_code": 0,
            "stack": [
                ["num", "0x3"],
                ["num", "0x0101010101010101010101010101010101010101010101010101010101010101"],
                ["num", "-0x1"]
            ]
        }"#;
        let result: GetMethodResult = serde_json::from_str(json).unwrap();
        assert!(result.is_ok());
        assert_eq!(result.num_u64(0).unwrap(), 3);
        assert_eq!(result.num_bytes32(1).unwrap(), [0x01; 32]);
        assert_eq!(result.num_i64(2).unwrap(), -1);
    }

    #[test]
    fn test_get_method_failed_exit_code() {
        let json = r#"{"exit_code": -13, "stack": []}"#;
        let result: GetMethodResult = serde_json::from_str(json).unwrap();
        assert!(!result.is_ok());
        assert!(result.num_u64(0).is_err());
    }

    #[test]
    fn test_transaction_parsing() {
        let json = r#"{
            "utime": 1700000000,
            "transaction_id": {"lt": "123", "hash": "q83v"},
            "in_msg": {"source": "EQsrc", "destination": "EQdst", "value": "1"},
            "out_msgs": [
                {"source": "EQdst", "destination": "", "value": "0", "message": "bG9nCg=="}
            ]
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.transaction_id.lt, "123");
        assert_eq!(tx.out_msgs.len(), 1);
        assert!(tx.out_msgs[0].destination.is_empty());
    }
}
