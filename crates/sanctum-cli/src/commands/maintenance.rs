use dialoguer::Confirm;

use sanctum_core::{ActionOutcome, GuardedAction};

use crate::app::AppContext;
use crate::cli::ResetArgs;
use crate::errors::CliError;

use super::unexpected_outcome;

pub async fn handle_reset(ctx: &AppContext<'_>, args: &ResetArgs) -> anyhow::Result<()> {
    if !args.yes {
        if !ctx.interactive() {
            return Err(CliError::invalid_input(
                "Refusing to reset without confirmation. Pass --yes to proceed.",
            )
            .into());
        }
        let proceed = Confirm::new()
            .with_prompt("Delete ALL credentials, notes, links and the PIN?")
            .default(false)
            .interact()?;
        if !proceed {
            if !ctx.quiet() {
                println!("Cancelled.");
            }
            return Ok(());
        }
    }

    let mut gate = ctx.open_gate().await?;
    match ctx.run_guarded(&mut gate, GuardedAction::ResetData).await? {
        ActionOutcome::DataReset => {
            if !ctx.quiet() {
                println!("All data deleted.");
            }
            Ok(())
        }
        other => Err(unexpected_outcome(other)),
    }
}
