//! Error types for azfleet.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for azfleet.
#[derive(Error, Debug)]
pub enum Error {
    // Preflight errors
    #[error("Azure CLI not found. Install it: https://aka.ms/installazurecli")]
    AzCliNotFound,

    #[error("Not logged in to Azure. Run: az login")]
    NotLoggedIn,

    #[error("No Azure subscriptions available for the signed-in account")]
    NoSubscriptions,

    #[error("No virtual machines found in subscription: {0}")]
    EmptyInventory(String),

    #[error("Failed to list virtual machines: {0}")]
    ListingFailed(String),

    // Provider errors
    #[error("Command failed: {command}: {message}")]
    Provider { command: String, message: String },

    #[error("Unexpected output from Azure CLI: {0}")]
    UnexpectedOutput(String),

    // Artifact errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Invalid tag CSV: {0}")]
    InvalidCsv(String),

    #[error("Checksum mismatch for {path}: expected {expected}, found {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    // Prompt errors
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // CSV errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Create a provider error for a failed command.
    pub fn provider<C: ToString, M: Into<String>>(command: C, message: M) -> Self {
        Error::Provider {
            command: command.to_string(),
            message: message.into(),
        }
    }
}
