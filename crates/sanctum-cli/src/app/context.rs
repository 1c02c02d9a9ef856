//! Application context for the Sanctum CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config, and opens the store and access gate on demand.

use std::io::IsTerminal;
use std::sync::Arc;

use once_cell::unsync::OnceCell;

use sanctum_core::cache::FileCache;
use sanctum_core::storage::SqliteStore;
use sanctum_core::{AccessGate, ActionOutcome, GuardedAction, PinCache, SanctumError};

use crate::cli::Cli;
use crate::config::SanctumConfig;
use crate::errors::{gate_error, CliError};

use super::prompt::TerminalPrompt;
use super::resolver::{load_config, missing_store_message};

/// The gate as the CLI runs it: SQLite store, JSON file cache.
pub type Gate = AccessGate<SqliteStore, FileCache>;

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<SanctumConfig>,
}

impl<'a> AppContext<'a> {
    /// Create a new application context from CLI arguments.
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    /// Get the CLI arguments.
    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Whether prompts may be shown on the terminal.
    pub fn interactive(&self) -> bool {
        std::io::stdin().is_terminal() && !self.cli.no_input
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&SanctumConfig> {
        self.config.get_or_try_init(|| load_config(self.cli))
    }

    /// Open the store named in the config. It must already exist.
    pub fn open_store(&self) -> anyhow::Result<Arc<SqliteStore>> {
        let path = self.config()?.store_path();
        if !path.exists() {
            return Err(CliError::not_found(
                missing_store_message(&path),
                "Hint: Run `sanctum init` to create it.",
            )
            .into());
        }
        Ok(Arc::new(SqliteStore::open(&path)?))
    }

    /// Open the store and settle the PIN state into a ready gate.
    pub async fn open_gate(&self) -> anyhow::Result<Gate> {
        let config = self.config()?;
        let store = self.open_store()?;
        let local = FileCache::open(&config.cache_path());
        let pins = PinCache::bootstrap(
            local,
            store.as_ref(),
            config.store.user_id,
            config.remote_timeout(),
        )
        .await?;
        tracing::debug!(
            user_id = %config.store.user_id,
            configured = pins.is_configured(),
            "gate ready"
        );
        Ok(AccessGate::new(store, pins, config.gate_config()))
    }

    /// PIN prompt matching how this process was started.
    pub fn prompt(&self) -> TerminalPrompt {
        TerminalPrompt::new(self.interactive(), self.quiet())
    }

    /// Run a guarded action, prompting for the PIN when the gate asks.
    pub async fn run_guarded(
        &self,
        gate: &mut Gate,
        action: GuardedAction,
    ) -> anyhow::Result<ActionOutcome> {
        let kind = action.kind();
        let mut prompt = self.prompt();
        match gate.request_guarded_action(action, &mut prompt).await {
            Ok(outcome) => Ok(outcome),
            Err(SanctumError::Cancelled) => Err(prompt.cancelled_error(kind)),
            Err(err) => Err(gate_error(kind, err)),
        }
    }
}
