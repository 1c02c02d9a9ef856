//! Errors the CLI reports with their own exit codes.
//!
//! Typed errors map to specific exit codes. Core errors from the access gate
//! are translated here so every command reports them the same way.

use thiserror::Error;

use sanctum_core::gate::{failure_message, ActionKind};
use sanctum_core::SanctumError;

use crate::constants::exit_codes;

/// Which exit code a [`CliError`] ends the process with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Config, store or record missing
    NotFound,
    InvalidInput,
    /// Wrong PIN, lockout, no PIN available
    AuthFailed,
}

/// Error reported to the user with a dedicated exit code.
#[derive(Debug, Error)]
#[error("{}{}", .message, hint_suffix(.hint))]
pub struct CliError {
    failure: Failure,
    message: String,
    hint: Option<String>,
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map(|h| format!("\n{}", h)).unwrap_or_default()
}

impl CliError {
    fn new(failure: Failure, message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            failure,
            message: message.into(),
            hint,
        }
    }

    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::new(Failure::NotFound, message, Some(hint.into()))
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(Failure::AuthFailed, message, None)
    }

    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::new(Failure::AuthFailed, message, Some(hint.into()))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(Failure::InvalidInput, message, None)
    }

    pub fn exit_code(&self) -> i32 {
        match self.failure {
            Failure::NotFound => exit_codes::NOT_FOUND,
            Failure::InvalidInput => exit_codes::INVALID_INPUT,
            Failure::AuthFailed => exit_codes::AUTH_FAILED,
        }
    }

    /// Report on stderr and end the process.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(self.exit_code())
    }
}

/// Translate a failed guarded action into a CLI error.
pub fn gate_error(action: ActionKind, err: SanctumError) -> anyhow::Error {
    let message = failure_message(action, &err);
    match err {
        SanctumError::NotFound(_) => CliError::not_found(
            message,
            "Hint: Run the matching `list` command to find IDs.",
        )
        .into(),
        SanctumError::PinNotConfigured => CliError::auth_failed_with_hint(
            message,
            "Hint: Run `sanctum pin setup` first.",
        )
        .into(),
        SanctumError::PinMismatch { .. } | SanctumError::TooManyAttempts => {
            CliError::auth_failed(message).into()
        }
        SanctumError::InvalidPin(_)
        | SanctumError::InvalidInput(_)
        | SanctumError::PinAlreadyConfigured => CliError::invalid_input(message).into(),
        _ => anyhow::anyhow!(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit_code_of(err: anyhow::Error) -> Option<i32> {
        err.downcast_ref::<CliError>().map(CliError::exit_code)
    }

    #[test]
    fn test_gate_error_exit_codes() {
        assert_eq!(
            exit_code_of(gate_error(
                ActionKind::ViewCredential,
                SanctumError::NotFound("Credential x".to_string())
            )),
            Some(exit_codes::NOT_FOUND)
        );
        assert_eq!(
            exit_code_of(gate_error(
                ActionKind::UnlockNote,
                SanctumError::TooManyAttempts
            )),
            Some(exit_codes::AUTH_FAILED)
        );
        assert_eq!(
            exit_code_of(gate_error(
                ActionKind::SetupPin,
                SanctumError::PinAlreadyConfigured
            )),
            Some(exit_codes::INVALID_INPUT)
        );
        assert_eq!(
            exit_code_of(gate_error(
                ActionKind::RevealLinks,
                SanctumError::RemoteUnavailable("timeout".to_string())
            )),
            None
        );
    }

    #[test]
    fn test_hint_printed_on_its_own_line() {
        let err = CliError::not_found("Config not found", "Hint: Run `sanctum init`.");
        assert_eq!(err.to_string(), "Config not found\nHint: Run `sanctum init`.");
        assert_eq!(CliError::invalid_input("bad").to_string(), "bad");
    }

    #[test]
    fn test_gate_error_message_names_action() {
        let err = gate_error(
            ActionKind::DeleteCredential,
            SanctumError::PinMismatch { remaining: None },
        );
        assert_eq!(err.to_string(), "Could not delete credential: incorrect PIN.");
    }
}
