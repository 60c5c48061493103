//! Transfer module - main module file
//!
//! Client-side transfer workflow for a hosted smart account: wallet
//! connection, account provisioning, balance polling, and FSM-tracked
//! transfer submission through injected collaborators.

pub mod adapters;
pub mod orchestrator;
pub mod poller;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use adapters::traits::{AbstractionService, WalletProvider};
pub use orchestrator::{ConnectedAccounts, OrchestratorConfig, TransferOrchestrator};
pub use poller::{BalancePoller, BalanceSlot, PollerHandle};
pub use state::{transition, AttemptEvent, AttemptState};
pub use types::{
    explorer_tx_url, AttemptId, BalanceSnapshot, BuiltTransaction, OrderMetadata, OrderType,
    SignMode, SubmittedTransfer, TransactionDetail, TransferRequest,
};
