//! Transfer Orchestrator
//!
//! Sequences the five-stage workflow: wallet connection, smart-account
//! provisioning, balance polling, transfer build/sign/submit, and result
//! display. Owns all transient session state; collaborators are injected at
//! construction and never reached through globals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use ethers::types::{Address, U256};

use crate::amount;
use crate::erc20;
use crate::errors::TransferError;
use crate::transfer::adapters::traits::{AbstractionService, WalletProvider};
use crate::transfer::poller::{BalancePoller, BalanceSlot, PollerHandle};
use crate::transfer::state::{transition, AttemptEvent, AttemptState};
use crate::transfer::types::{
    explorer_tx_url, AttemptId, BalanceSnapshot, OrderMetadata, SignMode, SubmittedTransfer,
    TransactionDetail, TransferRequest,
};

/// Fixed parameters of the transfer flow
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub network_id: u64,
    pub token_address: Address,
    pub token_decimals: u32,
    pub poll_interval: Duration,
    pub explorer_url: String,
}

/// Addresses established by a successful connect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedAccounts {
    pub wallet: Address,
    pub smart_account: Address,
}

/// Releases the busy flag on every exit path
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then(|| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

pub struct TransferOrchestrator {
    service: Arc<dyn AbstractionService>,
    wallet: Option<Arc<dyn WalletProvider>>,
    config: OrchestratorConfig,

    wallet_address: Mutex<Option<Address>>,
    smart_account: Mutex<Option<Address>>,
    balance: BalanceSlot,
    submitted: Mutex<Option<SubmittedTransfer>>,
    poller: Mutex<Option<PollerHandle>>,

    busy: AtomicBool,
    attempt_state: Mutex<AttemptState>,
}

impl TransferOrchestrator {
    /// `wallet` is `None` when no provider is injected into the session;
    /// `connect` reports that distinctly from a rejected request.
    pub fn new(
        service: Arc<dyn AbstractionService>,
        wallet: Option<Arc<dyn WalletProvider>>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            service,
            wallet,
            config,
            wallet_address: Mutex::new(None),
            smart_account: Mutex::new(None),
            balance: Arc::new(RwLock::new(None)),
            submitted: Mutex::new(None),
            poller: Mutex::new(None),
            busy: AtomicBool::new(false),
            attempt_state: Mutex::new(AttemptState::Idle),
        }
    }

    /// Stages 1-3: connect the wallet, provision the smart account, start
    /// balance polling.
    ///
    /// Provisioning fires immediately and unconditionally after a successful
    /// connect; there is no connect-only terminal state. A rejected wallet
    /// request leaves the session untouched. A provisioning failure keeps
    /// the wallet identity but no smart account, so balance and transfers
    /// stay unavailable.
    pub async fn connect(&self) -> Result<ConnectedAccounts, TransferError> {
        let wallet = self
            .wallet
            .clone()
            .ok_or(TransferError::ProviderUnavailable)?;

        let accounts = match wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                log::error!("Wallet connect failed: {}", e);
                return Err(e);
            }
        };
        let owner = accounts.first().copied().ok_or_else(|| {
            TransferError::WalletRejected("wallet returned no accounts".to_string())
        })?;

        *self.wallet_address.lock().unwrap() = Some(owner);
        log::info!("Wallet connected: {:#x}", owner);

        let account = match self.service.create_smart_account(owner).await {
            Ok(account) => account,
            Err(e) => {
                log::error!("Smart account provisioning failed for {:#x}: {}", owner, e);
                return Err(e);
            }
        };

        *self.smart_account.lock().unwrap() = Some(account);
        log::info!("Smart account ready: {:#x}", account);

        self.start_polling(account);

        Ok(ConnectedAccounts {
            wallet: owner,
            smart_account: account,
        })
    }

    fn start_polling(&self, account: Address) {
        let poller = BalancePoller::new(
            self.service.clone(),
            account,
            self.config.poll_interval,
            self.balance.clone(),
        );
        // Replacing the handle cancels any previous poll on drop
        *self.poller.lock().unwrap() = Some(poller.spawn());
    }

    /// Stages 4-5: validate, build, sign, and submit one transfer attempt.
    ///
    /// Steps run strictly in order and the first failure aborts the rest.
    /// The busy flag spans the whole attempt and is released on every exit
    /// path; a second call while one is in flight is rejected here without
    /// touching any collaborator.
    pub async fn transfer(
        &self,
        request: &TransferRequest,
    ) -> Result<SubmittedTransfer, TransferError> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or(TransferError::AttemptInFlight)?;

        let attempt = AttemptId::next();
        self.apply(AttemptEvent::Start);

        match self.run_attempt(attempt, request).await {
            Ok(submitted) => Ok(submitted),
            Err(e) => {
                self.apply(AttemptEvent::Fault);
                log::error!("[{}] Transfer failed ({}): {}", attempt, e.error_code(), e);
                Err(e)
            }
        }
    }

    async fn run_attempt(
        &self,
        attempt: AttemptId,
        request: &TransferRequest,
    ) -> Result<SubmittedTransfer, TransferError> {
        // Preconditions: a provisioned account and both form fields
        let account =
            (*self.smart_account.lock().unwrap()).ok_or(TransferError::NoSmartAccount)?;
        let owner = (*self.wallet_address.lock().unwrap()).ok_or(TransferError::NoSmartAccount)?;
        let wallet = self
            .wallet
            .clone()
            .ok_or(TransferError::ProviderUnavailable)?;

        if request.recipient.trim().is_empty() {
            return Err(TransferError::MissingRecipient);
        }
        if request.amount.trim().is_empty() {
            return Err(TransferError::MissingAmount);
        }

        let to: Address = request
            .recipient
            .trim()
            .parse()
            .map_err(|_| TransferError::InvalidRecipient(request.recipient.clone()))?;

        // 1. Decimal string -> fixed-point base units
        let units = amount::to_base_units(&request.amount, self.config.token_decimals)?;
        self.apply(AttemptEvent::Validated);

        // 2-3. Encode the token transfer as a single zero-value call
        let details = vec![TransactionDetail {
            encoded_data: erc20::encode_transfer(to, U256::from(units)),
            target_contract_address: self.config.token_address,
            value: 0,
        }];

        // 4. Build the user operation
        log::info!(
            "[{}] Building transfer of {} base units to {:#x}",
            attempt,
            units,
            to
        );
        let order = OrderMetadata::amount_out(units);
        let built = self
            .service
            .build_transaction(
                &details,
                self.config.network_id,
                account,
                &order,
                None,
                SignMode::Ecdsa,
            )
            .await?;
        self.apply(AttemptEvent::Built);

        // 5. Sign as the wallet identity
        let signature = wallet.personal_sign(&built.message_to_sign, owner).await?;
        self.apply(AttemptEvent::Signed);

        // 6. Submit
        let tx_hash = self
            .service
            .submit_transaction(
                &signature,
                &built.user_op,
                self.config.network_id,
                account,
                SignMode::Ecdsa,
            )
            .await?;
        self.apply(AttemptEvent::Submitted);

        let submitted = SubmittedTransfer {
            explorer_url: explorer_tx_url(&self.config.explorer_url, &tx_hash),
            tx_hash,
        };
        *self.submitted.lock().unwrap() = Some(submitted.clone());
        log::info!("[{}] Transfer submitted: {}", attempt, submitted.tx_hash);

        Ok(submitted)
    }

    /// Cancel balance polling. Safe to call more than once.
    pub fn shutdown(&self) {
        if let Some(handle) = self.poller.lock().unwrap().take() {
            handle.cancel();
        }
    }

    fn apply(&self, event: AttemptEvent) {
        let mut state = self.attempt_state.lock().unwrap();
        *state = transition(*state, event);
    }

    pub fn attempt_state(&self) -> AttemptState {
        *self.attempt_state.lock().unwrap()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn wallet_address(&self) -> Option<Address> {
        *self.wallet_address.lock().unwrap()
    }

    pub fn smart_account(&self) -> Option<Address> {
        *self.smart_account.lock().unwrap()
    }

    pub fn balance(&self) -> Option<BalanceSnapshot> {
        *self.balance.read().unwrap()
    }

    /// Latest balance formatted at the token's decimals, e.g. "2.0"
    pub fn formatted_balance(&self) -> Option<String> {
        self.balance()
            .map(|snapshot| amount::from_base_units(snapshot.net_balance, self.config.token_decimals))
    }

    pub fn last_submitted(&self) -> Option<SubmittedTransfer> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Drop for TransferOrchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
