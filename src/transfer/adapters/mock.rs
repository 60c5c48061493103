//! Scripted collaborators for testing
//!
//! Allow setting expected results per operation, record every call, and
//! optionally inject latency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use ethers::types::Address;
use tokio::time::sleep;

use super::traits::{AbstractionService, WalletProvider};
use crate::errors::TransferError;
use crate::transfer::types::{
    BalanceSnapshot, BuiltTransaction, OrderMetadata, SignMode, TransactionDetail,
};

/// Mock wallet provider
pub struct MockWallet {
    accounts: Vec<Address>,
    signature: Mutex<String>,
    connect_error: Mutex<Option<TransferError>>,
    sign_error: Mutex<Option<TransferError>>,
    connect_calls: AtomicU64,
    sign_calls: AtomicU64,
    last_signed_message: Mutex<Option<String>>,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>) -> Self {
        Self {
            accounts,
            signature: Mutex::new(format!("0x{}", "11".repeat(65))),
            connect_error: Mutex::new(None),
            sign_error: Mutex::new(None),
            connect_calls: AtomicU64::new(0),
            sign_calls: AtomicU64::new(0),
            last_signed_message: Mutex::new(None),
        }
    }

    pub fn set_signature(&self, signature: &str) {
        *self.signature.lock().unwrap() = signature.to_string();
    }

    /// Script `request_accounts` to fail until cleared
    pub fn fail_connect(&self, error: Option<TransferError>) {
        *self.connect_error.lock().unwrap() = error;
    }

    /// Script `personal_sign` to fail until cleared
    pub fn fail_sign(&self, error: Option<TransferError>) {
        *self.sign_error.lock().unwrap() = error;
    }

    pub fn connect_calls(&self) -> u64 {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn sign_calls(&self) -> u64 {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn last_signed_message(&self) -> Option<String> {
        self.last_signed_message.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, TransferError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        log::debug!("[mock-wallet] request_accounts()");

        if let Some(error) = self.connect_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.accounts.clone())
    }

    async fn personal_sign(
        &self,
        message: &str,
        address: Address,
    ) -> Result<String, TransferError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        log::debug!("[mock-wallet] personal_sign({}, {:#x})", message, address);

        if let Some(error) = self.sign_error.lock().unwrap().clone() {
            return Err(error);
        }

        *self.last_signed_message.lock().unwrap() = Some(message.to_string());
        Ok(self.signature.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "mock-wallet"
    }
}

/// Captured arguments of a `build_transaction` call
#[derive(Debug, Clone)]
pub struct BuildCall {
    pub details: Vec<TransactionDetail>,
    pub network_id: u64,
    pub account: Address,
    pub order: OrderMetadata,
    pub session_key: Option<String>,
    pub sign_mode: SignMode,
}

/// Captured arguments of a `submit_transaction` call
#[derive(Debug, Clone)]
pub struct SubmitCall {
    pub signature: String,
    pub user_op: serde_json::Value,
    pub network_id: u64,
    pub account: Address,
    pub sign_mode: SignMode,
}

/// Mock abstraction service
pub struct MockService {
    smart_account: Mutex<Address>,
    net_balance: Mutex<u128>,
    message_to_sign: Mutex<String>,
    tx_hash: Mutex<String>,
    create_error: Mutex<Option<TransferError>>,
    balance_error: Mutex<Option<TransferError>>,
    build_error: Mutex<Option<TransferError>>,
    submit_error: Mutex<Option<TransferError>>,
    build_delay: Mutex<Option<Duration>>,
    create_calls: AtomicU64,
    balance_calls: AtomicU64,
    build_calls: AtomicU64,
    submit_calls: AtomicU64,
    last_create: Mutex<Option<Address>>,
    last_build: Mutex<Option<BuildCall>>,
    last_submit: Mutex<Option<SubmitCall>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            smart_account: Mutex::new(
                "0x00000000000000000000000000000000000000Aa"
                    .parse()
                    .unwrap(),
            ),
            net_balance: Mutex::new(2_000_000),
            message_to_sign: Mutex::new("0x6d6573736167652d746f2d7369676e".to_string()),
            tx_hash: Mutex::new(format!("0x{}", "ab".repeat(32))),
            create_error: Mutex::new(None),
            balance_error: Mutex::new(None),
            build_error: Mutex::new(None),
            submit_error: Mutex::new(None),
            build_delay: Mutex::new(None),
            create_calls: AtomicU64::new(0),
            balance_calls: AtomicU64::new(0),
            build_calls: AtomicU64::new(0),
            submit_calls: AtomicU64::new(0),
            last_create: Mutex::new(None),
            last_build: Mutex::new(None),
            last_submit: Mutex::new(None),
        }
    }

    pub fn set_smart_account(&self, account: Address) {
        *self.smart_account.lock().unwrap() = account;
    }

    pub fn set_net_balance(&self, net_balance: u128) {
        *self.net_balance.lock().unwrap() = net_balance;
    }

    pub fn set_message_to_sign(&self, message: &str) {
        *self.message_to_sign.lock().unwrap() = message.to_string();
    }

    pub fn set_tx_hash(&self, tx_hash: &str) {
        *self.tx_hash.lock().unwrap() = tx_hash.to_string();
    }

    /// Script an operation to fail until cleared with `None`
    pub fn fail_create(&self, error: Option<TransferError>) {
        *self.create_error.lock().unwrap() = error;
    }

    pub fn fail_balance(&self, error: Option<TransferError>) {
        *self.balance_error.lock().unwrap() = error;
    }

    pub fn fail_build(&self, error: Option<TransferError>) {
        *self.build_error.lock().unwrap() = error;
    }

    pub fn fail_submit(&self, error: Option<TransferError>) {
        *self.submit_error.lock().unwrap() = error;
    }

    /// Delay every `build_transaction` call, for exercising the busy flag
    pub fn set_build_delay(&self, delay: Duration) {
        *self.build_delay.lock().unwrap() = Some(delay);
    }

    pub fn create_calls(&self) -> u64 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn balance_calls(&self) -> u64 {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn build_calls(&self) -> u64 {
        self.build_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> u64 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn last_create(&self) -> Option<Address> {
        *self.last_create.lock().unwrap()
    }

    pub fn last_build(&self) -> Option<BuildCall> {
        self.last_build.lock().unwrap().clone()
    }

    pub fn last_submit(&self) -> Option<SubmitCall> {
        self.last_submit.lock().unwrap().clone()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AbstractionService for MockService {
    async fn create_smart_account(&self, owner: Address) -> Result<Address, TransferError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        log::debug!("[mock-service] create_smart_account({:#x})", owner);

        if let Some(error) = self.create_error.lock().unwrap().clone() {
            return Err(error);
        }

        *self.last_create.lock().unwrap() = Some(owner);
        Ok(*self.smart_account.lock().unwrap())
    }

    async fn get_balance(&self, account: Address) -> Result<BalanceSnapshot, TransferError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        log::debug!("[mock-service] get_balance({:#x})", account);

        if let Some(error) = self.balance_error.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(BalanceSnapshot {
            net_balance: *self.net_balance.lock().unwrap(),
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
        self.build_calls.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "[mock-service] build_transaction(network={}, {:#x})",
            network_id,
            account
        );

        let delay = *self.build_delay.lock().unwrap();
        if let Some(delay) = delay {
            sleep(delay).await;
        }

        if let Some(error) = self.build_error.lock().unwrap().clone() {
            return Err(error);
        }

        *self.last_build.lock().unwrap() = Some(BuildCall {
            details: details.to_vec(),
            network_id,
            account,
            order: order.clone(),
            session_key: session_key.map(str::to_string),
            sign_mode,
        });

        Ok(BuiltTransaction {
            message_to_sign: self.message_to_sign.lock().unwrap().clone(),
            user_op: serde_json::json!({ "sender": format!("{:#x}", account), "nonce": "0x1" }),
        })
    }

    async fn submit_transaction(
        &self,
        signature: &str,
        user_op: &serde_json::Value,
        network_id: u64,
        account: Address,
        sign_mode: SignMode,
    ) -> Result<String, TransferError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "[mock-service] submit_transaction(network={}, {:#x})",
            network_id,
            account
        );

        if let Some(error) = self.submit_error.lock().unwrap().clone() {
            return Err(error);
        }

        *self.last_submit.lock().unwrap() = Some(SubmitCall {
            signature: signature.to_string(),
            user_op: user_op.clone(),
            network_id,
            account,
            sign_mode,
        });

        Ok(self.tx_hash.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "mock-service"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Address {
        "0x1111111111111111111111111111111111111111"
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_mock_service_defaults() {
        let service = MockService::new();

        let account = service.create_smart_account(owner()).await.unwrap();
        let snapshot = service.get_balance(account).await.unwrap();

        assert_eq!(snapshot.net_balance, 2_000_000);
        assert_eq!(service.create_calls(), 1);
        assert_eq!(service.last_create(), Some(owner()));
    }

    #[tokio::test]
    async fn test_mock_service_scripted_failure() {
        let service = MockService::new();
        service.fail_create(Some(TransferError::Service {
            operation: "create_smart_account".to_string(),
            reason: "HTTP 503".to_string(),
        }));

        let result = service.create_smart_account(owner()).await;
        assert!(matches!(result, Err(TransferError::Service { .. })));

        service.fail_create(None);
        assert!(service.create_smart_account(owner()).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_wallet_records_signed_message() {
        let wallet = MockWallet::new(vec![owner()]);

        let signature = wallet.personal_sign("0xabc", owner()).await.unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(wallet.last_signed_message(), Some("0xabc".to_string()));
        assert_eq!(wallet.sign_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_wallet_scripted_rejection() {
        let wallet = MockWallet::new(vec![owner()]);
        wallet.fail_connect(Some(TransferError::WalletRejected(
            "user denied".to_string(),
        )));

        let result = wallet.request_accounts().await;
        assert!(matches!(result, Err(TransferError::WalletRejected(_))));
    }
}
