//! Error types for the batch transfer tool

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the batch transfer tool
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Insecure keypair permissions: {0}")]
    InsecureKeypair(String),

    // Recipient list errors
    #[error("Recipient list error: {0}")]
    RecipientList(String),

    // RPC errors
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("RPC connection failed: {0}")]
    RpcConnection(String),

    // Transaction errors
    #[error("Transaction build failed: {0}")]
    TransactionBuild(String),

    #[error("Transaction signing failed: {0}")]
    Signing(String),

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Transaction outcome unknown: {0}")]
    ConfirmationUnknown(String),

    // Safety errors
    #[error("Insufficient balance: {available}SOL available, {required}SOL required")]
    InsufficientBalance { available: f64, required: f64 },

    // Result log errors
    #[error("Result log error: {0}")]
    ResultLog(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl Error {
    /// Check if the transaction may have landed despite the error.
    ///
    /// Ambiguous failures must not be resubmitted blindly: the transfer could
    /// be executed twice.
    pub fn is_ambiguous(&self) -> bool {
        matches!(
            self,
            Error::Rpc(_) | Error::RpcConnection(_) | Error::ConfirmationUnknown(_)
        )
    }

    /// Check if this error is a safety violation
    pub fn is_safety_violation(&self) -> bool {
        matches!(
            self,
            Error::InsecureKeypair(_) | Error::InsufficientBalance { .. }
        )
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_classification() {
        assert!(Error::ConfirmationUnknown("timeout".into()).is_ambiguous());
        assert!(Error::RpcConnection("reset".into()).is_ambiguous());
        assert!(!Error::TransactionRejected("preflight".into()).is_ambiguous());
        assert!(!Error::Signing("mismatch".into()).is_ambiguous());
    }

    #[test]
    fn test_insufficient_balance_display() {
        let err = Error::InsufficientBalance {
            available: 0.02,
            required: 0.035,
        };
        assert!(err.is_safety_violation());
        assert_eq!(
            err.to_string(),
            "Insufficient balance: 0.02SOL available, 0.035SOL required"
        );
    }
}
