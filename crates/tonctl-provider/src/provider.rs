//! The HTTP provider client.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use crate::types::{AddressInfo, FeeRequest, Fees, GetMethodResult, Transaction};
use crate::{ProviderError, ProviderResult};

/// JSON-RPC client for a node HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    host: String,
    client: reqwest::Client,
}

impl HttpProvider {
    /// Create a client for the given endpoint URL.
    pub fn new(host: impl Into<String>) -> Self {
        HttpProvider {
            host: host.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The endpoint URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Send a raw JSON-RPC request and unwrap the result payload.
    pub async fn send_request(&self, method: &str, params: Value) -> ProviderResult<Value> {
        let payload = json!({
            "id": "1",
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });

        let response: Value = self
            .client
            .post(&self.host)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if response.get("ok").and_then(Value::as_bool) == Some(false) {
            return Err(ProviderError::Remote {
                code: response.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: response
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        let result = response.get("result").cloned().unwrap_or(response);

        if result.get("@type").and_then(Value::as_str) == Some("error") {
            return Err(ProviderError::Remote {
                code: result.get("code").and_then(Value::as_i64).unwrap_or(0),
                message: result
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            });
        }

        Ok(result)
    }

    /// Fetch balance, state and code/data of an account.
    pub async fn get_address_info(&self, address: &str) -> ProviderResult<AddressInfo> {
        let result = self
            .send_request("getAddressInfo", json!({ "address": address }))
            .await?;
        parse(result)
    }

    /// Fetch the balance of an account, in nanotons.
    pub async fn get_balance(&self, address: &str) -> ProviderResult<u128> {
        Ok(self.get_address_info(address).await?.balance)
    }

    /// Fetch recent transactions of an account.
    pub async fn get_transactions(
        &self,
        address: &str,
        limit: u32,
    ) -> ProviderResult<Vec<Transaction>> {
        let result = self
            .send_request(
                "getTransactions",
                json!({ "address": address, "limit": limit }),
            )
            .await?;
        parse(result)
    }

    /// Estimate the fees a message would incur.
    pub async fn estimate_fee(&self, request: &FeeRequest) -> ProviderResult<Fees> {
        let params = serde_json::to_value(request)
            .map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))?;
        let result = self.send_request("estimateFee", params).await?;
        parse(result)
    }

    /// Submit a serialized message.
    pub async fn send_boc(&self, boc: &[u8]) -> ProviderResult<()> {
        let result = self
            .send_request("sendBoc", json!({ "boc": STANDARD.encode(boc) }))
            .await?;
        match result.get("@type").and_then(Value::as_str) {
            Some("ok") => Ok(()),
            other => Err(ProviderError::UnexpectedResponse(format!(
                "sendBoc returned {:?}",
                other
            ))),
        }
    }

    /// Run a read-only getter on a deployed contract.
    pub async fn run_get_method(
        &self,
        address: &str,
        method: &str,
    ) -> ProviderResult<GetMethodResult> {
        let result = self
            .send_request(
                "runGetMethod",
                json!({ "address": address, "method": method, "stack": [] }),
            )
            .await?;
        parse(result)
    }

    /// Read the account's seqno counter.
    ///
    /// Returns `None` when the getter does not produce a value (for example
    /// on an account that has not been deployed); the caller decides whether
    /// that is the deploy case or an error.
    pub async fn seqno(&self, address: &str) -> ProviderResult<Option<u32>> {
        let result = self.run_get_method(address, "seqno").await?;
        if !result.is_ok() || result.is_empty() {
            return Ok(None);
        }
        let seqno = result.num_u64(0)?;
        Ok(Some(seqno as u32))
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> ProviderResult<T> {
    serde_json::from_value(value).map_err(|e| ProviderError::UnexpectedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fees_result() {
        let value = json!({
            "@type": "query.fees",
            "source_fees": {
                "@type": "fees",
                "gas_fee": 1, "in_fwd_fee": 2, "fwd_fee": 3, "storage_fee": 4
            }
        });
        let fees: Fees = parse(value).unwrap();
        assert_eq!(fees.source_fees.total(), 10);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let value = json!({"unrelated": true});
        assert!(parse::<Fees>(value).is_err());
    }
}
