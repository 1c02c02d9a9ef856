//! Sanctum CLI - PIN-gated credentials, notes and links
//!
//! This is the command-line interface for Sanctum. Every action that reveals
//! a secret or changes a protection flag goes through the core access gate.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use app::AppContext;
use cli::{Cli, Commands};
use constants::DEFAULT_LOG_FILTER;
use errors::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(&cli).await {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            cli_err.exit()
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `SANCTUM_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SANCTUM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli);

    match &cli.command {
        Some(Commands::Init(args)) => commands::handle_init(&ctx, args),
        Some(Commands::Pin { command }) => commands::handle_pin(&ctx, command).await,
        Some(Commands::Cred { command }) => commands::handle_cred(&ctx, command).await,
        Some(Commands::Note { command }) => commands::handle_note(&ctx, command).await,
        Some(Commands::Link { command }) => commands::handle_link(&ctx, command).await,
        Some(Commands::Reset(args)) => commands::handle_reset(&ctx, args).await,
        Some(Commands::Completions { shell }) => {
            commands::handle_completions(*shell);
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
