//! Wallet provider backed by an in-process signing key.
//!
//! Stands in for a browser-injected signer in headless environments. Signing
//! for any address other than the key's own is refused, matching how an
//! injected provider scopes its accounts.

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;

use super::traits::WalletProvider;
use crate::errors::TransferError;

pub struct LocalWalletSigner {
    wallet: LocalWallet,
}

impl LocalWalletSigner {
    pub fn new(wallet: LocalWallet) -> Self {
        Self { wallet }
    }

    pub fn from_private_key(key: &str) -> Result<Self, TransferError> {
        key.trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map(Self::new)
            .map_err(|e| TransferError::WalletRejected(format!("invalid signing key: {}", e)))
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

#[async_trait]
impl WalletProvider for LocalWalletSigner {
    async fn request_accounts(&self) -> Result<Vec<Address>, TransferError> {
        Ok(vec![self.wallet.address()])
    }

    async fn personal_sign(
        &self,
        message: &str,
        address: Address,
    ) -> Result<String, TransferError> {
        if address != self.wallet.address() {
            return Err(TransferError::WalletRejected(format!(
                "account {:#x} is not available to this wallet",
                address
            )));
        }

        let signature = self
            .wallet
            .sign_message(message)
            .await
            .map_err(|e| TransferError::WalletRejected(e.to_string()))?;

        Ok(format!("0x{}", signature))
    }

    fn name(&self) -> &str {
        "local-wallet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[tokio::test]
    async fn test_request_accounts_returns_key_address() {
        let signer = LocalWalletSigner::from_private_key(TEST_KEY).unwrap();
        let accounts = signer.request_accounts().await.unwrap();

        assert_eq!(accounts, vec![signer.address()]);
    }

    #[tokio::test]
    async fn test_personal_sign_produces_hex_signature() {
        let signer = LocalWalletSigner::from_private_key(TEST_KEY).unwrap();
        let signature = signer
            .personal_sign("0xabc123", signer.address())
            .await
            .unwrap();

        assert!(signature.starts_with("0x"));
        // 65-byte signature = 130 hex chars
        assert_eq!(signature.len(), 132);
    }

    #[tokio::test]
    async fn test_personal_sign_refuses_foreign_address() {
        let signer = LocalWalletSigner::from_private_key(TEST_KEY).unwrap();
        let foreign: Address = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"
            .parse()
            .unwrap();

        let result = signer.personal_sign("0xabc123", foreign).await;
        assert!(matches!(result, Err(TransferError::WalletRejected(_))));
    }

    #[test]
    fn test_rejects_malformed_key() {
        assert!(LocalWalletSigner::from_private_key("not-a-key").is_err());
    }
}
