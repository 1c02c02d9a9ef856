use std::path::PathBuf;

use sanctum_core::storage::SqliteStore;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_cache_path, default_store_path, read_config, write_config, SanctumConfig};
use crate::errors::CliError;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path(ctx.cli())?;
    let existing = if config_path.exists() {
        if !args.force {
            return Err(CliError::invalid_input(format!(
                "Sanctum is already initialized ({}).\nUse --force to rewrite the config.",
                config_path.display()
            ))
            .into());
        }
        read_config(&config_path).ok()
    } else {
        None
    };

    let store_path = match args.store.as_deref() {
        Some(path) => PathBuf::from(path),
        None => default_store_path()?,
    };
    let mut config = SanctumConfig::new(store_path, default_cache_path()?);
    // Rewriting the config must not orphan an existing PIN record
    if let Some(existing) = existing {
        config.store.user_id = existing.store.user_id;
        config.security = existing.security;
    }

    SqliteStore::open(&config.store_path())?;
    write_config(&config_path, &config)?;
    tracing::info!(
        store = %config.store.path,
        config = %config_path.display(),
        "initialized"
    );

    if !ctx.quiet() {
        println!("Initialized Sanctum store at {}", config.store.path);
        println!("Config written to {}", config_path.display());
        println!();
        println!("Next: run `sanctum pin setup` to choose a PIN.");
    }
    Ok(())
}
