// Error types for the transfer workflow
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // Wallet provider errors
    ProviderUnavailable,
    WalletRejected(String),

    // Validation errors
    MissingRecipient,
    MissingAmount,
    InvalidRecipient(String),
    InvalidAmount(String),
    NoSmartAccount,
    AttemptInFlight,

    // Collaborator errors
    Service { operation: String, reason: String },
    Decode { operation: String, reason: String },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable => write!(f, "No wallet provider available"),
            Self::WalletRejected(msg) => write!(f, "Wallet request rejected: {}", msg),
            Self::MissingRecipient => write!(f, "Recipient address is required"),
            Self::MissingAmount => write!(f, "Transfer amount is required"),
            Self::InvalidRecipient(addr) => write!(f, "Invalid recipient address: {}", addr),
            Self::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            Self::NoSmartAccount => write!(f, "No smart account provisioned"),
            Self::AttemptInFlight => write!(f, "A transfer attempt is already in flight"),
            Self::Service { operation, reason } => {
                write!(f, "Service call {} failed: {}", operation, reason)
            }
            Self::Decode { operation, reason } => {
                write!(f, "Malformed response from {}: {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for TransferError {}

// Error code mapping for diagnostics
impl TransferError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            Self::WalletRejected(_) => "WALLET_REJECTED",
            Self::MissingRecipient => "MISSING_RECIPIENT",
            Self::MissingAmount => "MISSING_AMOUNT",
            Self::InvalidRecipient(_) => "INVALID_RECIPIENT",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::NoSmartAccount => "NO_SMART_ACCOUNT",
            Self::AttemptInFlight => "ATTEMPT_IN_FLIGHT",
            Self::Service { .. } => "SERVICE_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
        }
    }

    /// Failures caused by user input rather than a collaborator.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRecipient
                | Self::MissingAmount
                | Self::InvalidRecipient(_)
                | Self::InvalidAmount(_)
                | Self::NoSmartAccount
                | Self::AttemptInFlight
        )
    }

    /// Notification text shown to the user.
    ///
    /// Provider absence and validation failures keep a specific message;
    /// wallet rejections and collaborator failures collapse into one generic
    /// notice and keep their detail in the logs only.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable => {
                "No wallet detected. Please install or unlock a wallet."
            }
            Self::MissingRecipient | Self::MissingAmount => "Please fill in all fields",
            Self::InvalidRecipient(_) => "Recipient address is not valid",
            Self::InvalidAmount(_) => "Amount is not a valid token quantity",
            Self::NoSmartAccount => "Connect a wallet before transferring",
            Self::AttemptInFlight => "A transfer is already in progress",
            Self::WalletRejected(_) | Self::Service { .. } | Self::Decode { .. } => {
                "Transfer failed. See logs for details."
            }
        }
    }
}
