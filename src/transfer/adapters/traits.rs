//! Collaborator traits
//!
//! Defines the interfaces for the two external collaborators: the wallet
//! provider (signer) and the hosted account-abstraction service. Both are
//! injected into the orchestrator; nothing in this crate constructs them
//! globally.

use async_trait::async_trait;
use ethers::types::Address;

use crate::errors::TransferError;
use crate::transfer::types::{
    BalanceSnapshot, BuiltTransaction, OrderMetadata, SignMode, TransactionDetail,
};

/// Wallet provider - account discovery and message signing
///
/// Absence of a provider is modeled by the orchestrator holding no instance
/// at all, and is reported distinctly from a rejected request.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request the wallet's accounts. The first returned address becomes the
    /// session's wallet identity.
    async fn request_accounts(&self) -> Result<Vec<Address>, TransferError>;

    /// Produce an EIP-191 personal signature over `message`, authenticated
    /// as `address`. Returns the 0x-prefixed signature hex.
    async fn personal_sign(&self, message: &str, address: Address)
        -> Result<String, TransferError>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Account-abstraction service - provisioning, balances, build and submit
#[async_trait]
pub trait AbstractionService: Send + Sync {
    /// Create-or-fetch the smart account bound to `owner`.
    async fn create_smart_account(&self, owner: Address) -> Result<Address, TransferError>;

    /// Latest net token balance of the smart account.
    async fn get_balance(&self, account: Address) -> Result<BalanceSnapshot, TransferError>;

    /// Build a user operation wrapping `details` for the given network,
    /// tagged with `order` metadata. `session_key` is unused by this flow
    /// and passed as `None`.
    async fn build_transaction(
        &self,
        details: &[TransactionDetail],
        network_id: u64,
        account: Address,
        order: &OrderMetadata,
        session_key: Option<&str>,
        sign_mode: SignMode,
    ) -> Result<BuiltTransaction, TransferError>;

    /// Submit the signature plus the built user operation. Returns the
    /// transaction hash.
    async fn submit_transaction(
        &self,
        signature: &str,
        user_op: &serde_json::Value,
        network_id: u64,
        account: Address,
        sign_mode: SignMode,
    ) -> Result<String, TransferError>;

    /// Get service name for logging
    fn name(&self) -> &str;
}
