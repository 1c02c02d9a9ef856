//! Error types for Sanctum core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these to
//! user-facing messages via [`crate::gate::failure_message`].

use thiserror::Error;

use crate::crypto::DecryptFailure;

/// Result type alias for Sanctum operations.
pub type Result<T> = std::result::Result<T, SanctumError>;

/// Core error type for Sanctum operations.
#[derive(Debug, Error)]
pub enum SanctumError {
    /// A guarded action needs a PIN but none has been set up
    #[error("PIN is not configured")]
    PinNotConfigured,

    /// Candidate PIN does not match the stored hash
    #[error("Incorrect PIN")]
    PinMismatch {
        /// Attempts left before lockout, `None` when attempts are unbounded
        remaining: Option<u32>,
    },

    /// Attempt limit reached; the pending action was abandoned
    #[error("Too many incorrect PIN attempts")]
    TooManyAttempts,

    /// PIN does not have the required shape
    #[error("Invalid PIN: {0}")]
    InvalidPin(String),

    /// First-time setup requested while a PIN already exists
    #[error("PIN is already configured")]
    PinAlreadyConfigured,

    /// Ciphertext could not be recovered under the supplied key
    #[error("Decryption failed: {0}")]
    DecryptFailure(#[from] DecryptFailure),

    /// Remote store call failed or timed out
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// User abandoned the PIN prompt
    #[error("Cancelled")]
    Cancelled,

    /// A PIN was submitted with no prompt open
    #[error("No action is waiting for a PIN")]
    NoPendingAction,

    /// A second guarded action was requested while a prompt is open
    #[error("Another action is already waiting for a PIN")]
    PromptAlreadyOpen,

    /// Encryption error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl SanctumError {
    /// Whether the user can retry the same prompt after this error.
    pub fn is_retryable_prompt(&self) -> bool {
        matches!(
            self,
            SanctumError::PinMismatch { .. } | SanctumError::InvalidPin(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_prompt_errors() {
        assert!(SanctumError::PinMismatch { remaining: Some(2) }.is_retryable_prompt());
        assert!(SanctumError::InvalidPin("too short".to_string()).is_retryable_prompt());
        assert!(!SanctumError::TooManyAttempts.is_retryable_prompt());
        assert!(!SanctumError::DecryptFailure(DecryptFailure::WrongKey).is_retryable_prompt());
    }

    #[test]
    fn test_decrypt_failure_not_reported_as_pin_mismatch() {
        let message = SanctumError::from(DecryptFailure::WrongKey).to_string();
        assert!(message.contains("Decryption failed"));
        assert!(!message.contains("Incorrect PIN"));
    }
}
