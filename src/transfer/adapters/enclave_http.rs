//! HTTP client for the hosted account-abstraction service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use ethers::types::Address;
use ethers::utils::to_checksum;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::traits::AbstractionService;
use crate::errors::TransferError;
use crate::transfer::types::{
    BalanceSnapshot, BuiltTransaction, OrderMetadata, SignMode, TransactionDetail,
};

pub struct EnclaveHttp {
    client: Client,
    base_url: String,
    api_key: String,
}

impl EnclaveHttp {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn post_json<T>(
        &self,
        operation: &str,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, TransferError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("X-API-Key", &self.api_key)
            .json(body);
        self.execute(operation, request).await
    }

    async fn get_json<T>(&self, operation: &str, path: &str) -> Result<T, TransferError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("X-API-Key", &self.api_key);
        self.execute(operation, request).await
    }

    /// Transport and HTTP-status failures map to `Service`; a 2xx body that
    /// does not match the typed contract maps to `Decode`.
    async fn execute<T>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TransferError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = request.send().await.map_err(|e| TransferError::Service {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| TransferError::Service {
            operation: operation.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(TransferError::Service {
                operation: operation.to_string(),
                reason: format!("HTTP {} - {}", status, body),
            });
        }

        serde_json::from_str(&body).map_err(|e| TransferError::Decode {
            operation: operation.to_string(),
            reason: e.to_string(),
        })
    }
}

// Response shapes as the service returns them. Account creation nests the
// smart-account address under wallet.scw_address.

#[derive(Debug, Deserialize)]
struct CreateAccountResponse {
    wallet: AccountWallet,
}

#[derive(Debug, Deserialize)]
struct AccountWallet {
    scw_address: String,
}

#[derive(Debug, Deserialize)]
struct BalanceResponse {
    #[serde(rename = "netBalance")]
    net_balance: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "txHash")]
    tx_hash: String,
}

#[async_trait]
impl AbstractionService for EnclaveHttp {
    async fn create_smart_account(&self, owner: Address) -> Result<Address, TransferError> {
        let body = json!({ "ownerAddress": to_checksum(&owner, None) });
        let resp: CreateAccountResponse = self
            .post_json("create_smart_account", "/v1/smart-account", &body)
            .await?;

        resp.wallet
            .scw_address
            .parse()
            .map_err(|e| TransferError::Decode {
                operation: "create_smart_account".to_string(),
                reason: format!("bad scw_address {:?}: {}", resp.wallet.scw_address, e),
            })
    }

    async fn get_balance(&self, account: Address) -> Result<BalanceSnapshot, TransferError> {
        let path = format!("/v1/smart-balance/{}", to_checksum(&account, None));
        let resp: BalanceResponse = self.get_json("get_balance", &path).await?;

        let net_balance = resp
            .net_balance
            .parse::<u128>()
            .map_err(|e| TransferError::Decode {
                operation: "get_balance".to_string(),
                reason: format!("bad netBalance {:?}: {}", resp.net_balance, e),
            })?;

        Ok(BalanceSnapshot {
            net_balance,
            fetched_at: Utc::now().timestamp_millis(),
        })
    }

    async fn build_transaction(
        &self,
        details: &[TransactionDetail],
        network_id: u64,
        account: Address,
        order: &OrderMetadata,
        session_key: Option<&str>,
        sign_mode: SignMode,
    ) -> Result<BuiltTransaction, TransferError> {
        let mut body = json!({
            "transactionDetails": details,
            "network": network_id,
            "smartAccountAddress": to_checksum(&account, None),
            "orderData": order,
            "signMode": sign_mode,
        });
        if let Some(key) = session_key {
            body["sessionKey"] = json!(key);
        }

        self.post_json("build_transaction", "/v1/transaction/build", &body)
            .await
    }

    async fn submit_transaction(
        &self,
        signature: &str,
        user_op: &serde_json::Value,
        network_id: u64,
        account: Address,
        sign_mode: SignMode,
    ) -> Result<String, TransferError> {
        let body = json!({
            "signature": signature,
            "userOp": user_op,
            "network": network_id,
            "smartAccountAddress": to_checksum(&account, None),
            "signMode": sign_mode,
        });

        let resp: SubmitResponse = self
            .post_json("submit_transaction", "/v1/transaction/submit", &body)
            .await?;
        Ok(resp.tx_hash)
    }

    fn name(&self) -> &str {
        "enclave-http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_normalizes_base_url() {
        let service = EnclaveHttp::new(
            "https://api.enclave.money/".to_string(),
            "test_key".to_string(),
        );
        assert_eq!(service.base_url, "https://api.enclave.money");
    }

    #[test]
    fn test_create_account_response_shape() {
        let json = r#"{"wallet":{"scw_address":"0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"}}"#;
        let resp: CreateAccountResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            resp.wallet.scw_address,
            "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"
        );
    }

    #[test]
    fn test_balance_response_shape() {
        let json = r#"{"netBalance":"2000000"}"#;
        let resp: BalanceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.net_balance, "2000000");
    }

    #[test]
    fn test_submit_response_shape() {
        let json = r#"{"txHash":"0xdeadbeef"}"#;
        let resp: SubmitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.tx_hash, "0xdeadbeef");
    }
}
