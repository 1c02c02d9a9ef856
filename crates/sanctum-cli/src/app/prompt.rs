//! PIN and password entry.

use std::collections::VecDeque;

use dialoguer::Password;
use secrecy::SecretString;
use zeroize::Zeroizing;

use sanctum_core::gate::{failure_message, ActionKind, PromptKind, PromptRequest};
use sanctum_core::PinPrompt;

use crate::errors::CliError;

enum PinSource {
    /// `SANCTUM_PIN`, answered once and never re-tried
    Env(Zeroizing<String>),
    /// `SANCTUM_TEST_PIN_ATTEMPTS` in test-support builds
    Scripted(VecDeque<Zeroizing<String>>),
    Terminal,
    Unavailable,
}

/// [`PinPrompt`] backed by the environment or the terminal.
pub struct TerminalPrompt {
    source: PinSource,
    quiet: bool,
    last_rejection: Option<String>,
}

impl TerminalPrompt {
    pub fn new(interactive: bool, quiet: bool) -> Self {
        let source = if let Some(pin) = env_value("SANCTUM_PIN") {
            PinSource::Env(pin)
        } else if let Some(attempts) = test_attempts(interactive) {
            PinSource::Scripted(attempts)
        } else if interactive {
            PinSource::Terminal
        } else {
            PinSource::Unavailable
        };
        Self {
            source,
            quiet,
            last_rejection: None,
        }
    }

    /// Error to report once the prompt stopped answering.
    pub fn cancelled_error(&self, action: ActionKind) -> anyhow::Error {
        match (&self.source, &self.last_rejection) {
            (PinSource::Terminal, _) => anyhow::anyhow!("Cancelled: did not {}.", action),
            (_, Some(message)) => CliError::auth_failed(message.clone()).into(),
            _ => CliError::auth_failed_with_hint(
                "No PIN provided and no TTY available.",
                "Hint: Set SANCTUM_PIN to answer PIN prompts non-interactively.",
            )
            .into(),
        }
    }
}

impl PinPrompt for TerminalPrompt {
    fn ask(&mut self, request: &PromptRequest<'_>) -> Option<Zeroizing<String>> {
        if let Some(reason) = request.retry_reason {
            let message = failure_message(request.action, reason);
            if matches!(self.source, PinSource::Terminal) && !self.quiet {
                eprintln!("{}", message);
            }
            self.last_rejection = Some(message);
        }

        match &mut self.source {
            PinSource::Env(pin) if request.retry_reason.is_none() => Some(pin.clone()),
            PinSource::Env(_) => None,
            PinSource::Scripted(attempts) => attempts.pop_front(),
            PinSource::Terminal => read_pin(request.kind),
            PinSource::Unavailable => None,
        }
    }
}

fn read_pin(kind: PromptKind) -> Option<Zeroizing<String>> {
    let result = match kind {
        PromptKind::Verify => Password::new().with_prompt("PIN").interact(),
        PromptKind::Establish => Password::new()
            .with_prompt("Choose a 4-digit PIN")
            .with_confirmation("Confirm PIN", "PINs do not match")
            .interact(),
    };
    match result {
        Ok(pin) => Some(Zeroizing::new(pin)),
        Err(err) => {
            tracing::debug!(error = %err, "PIN prompt aborted");
            None
        }
    }
}

/// Read the replacement PIN for `pin change` from `SANCTUM_NEW_PIN` or the
/// terminal.
pub fn read_new_pin(interactive: bool) -> anyhow::Result<SecretString> {
    if let Some(pin) = env_value("SANCTUM_NEW_PIN") {
        return Ok(SecretString::from(pin.as_str().to_owned()));
    }
    if !interactive {
        return Err(CliError::invalid_input(
            "No new PIN provided and no TTY available. Set SANCTUM_NEW_PIN.",
        )
        .into());
    }
    let pin = Password::new()
        .with_prompt("New 4-digit PIN")
        .with_confirmation("Confirm new PIN", "PINs do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read PIN: {}", e))?;
    Ok(SecretString::from(pin))
}

/// Read a credential password from the terminal.
pub fn read_password(interactive: bool) -> anyhow::Result<String> {
    if !interactive {
        return Err(CliError::invalid_input(
            "No password provided and no TTY available. Use --password or SANCTUM_CRED_PASSWORD.",
        )
        .into());
    }
    Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

fn env_value(name: &str) -> Option<Zeroizing<String>> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(Zeroizing::new)
}

fn test_attempts(interactive: bool) -> Option<VecDeque<Zeroizing<String>>> {
    if interactive || !cfg!(feature = "test-support") {
        return None;
    }
    std::env::var("SANCTUM_TEST_PIN_ATTEMPTS").ok().map(|value| {
        value
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .map(Zeroizing::new)
            .collect()
    })
}
