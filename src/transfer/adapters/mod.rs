//! Adapters module - collaborator implementations behind the trait seams

pub mod enclave_http;
pub mod local_wallet;
pub mod mock;
pub mod traits;

pub use traits::{AbstractionService, WalletProvider};

// Live collaborators
pub use enclave_http::EnclaveHttp;
pub use local_wallet::LocalWalletSigner;

// Scripted collaborators (tests and --mock demo runs)
pub use mock::{MockService, MockWallet};
