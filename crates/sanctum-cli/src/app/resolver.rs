//! Path resolution and argument parsing shared by commands.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, SanctumConfig};
use crate::errors::CliError;

/// Resolve the config file path from `--config` / `SANCTUM_CONFIG`, falling
/// back to the XDG default.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(value) = cli.config.as_deref() {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config, failing with a not-found hint before `init` has run.
pub fn load_config(cli: &Cli) -> anyhow::Result<SanctumConfig> {
    let path = resolve_config_path(cli)?;
    if !path.exists() {
        return Err(CliError::not_found(
            missing_config_message(&path),
            "Hint: Run `sanctum init` to create it.",
        )
        .into());
    }
    read_config(&path)
}

/// Error message when the config file is missing.
pub fn missing_config_message(config_path: &Path) -> String {
    format!("No Sanctum config found at {}", config_path.display())
}

/// Error message when the store database is missing.
pub fn missing_store_message(store_path: &Path) -> String {
    format!("No Sanctum store found at {}", store_path.display())
}

/// Parse a record ID given on the command line.
pub fn parse_id(what: &str, raw: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|e| CliError::invalid_input(format!("Invalid {} ID '{}': {}", what, raw, e)).into())
}
