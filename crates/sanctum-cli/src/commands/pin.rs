use sanctum_core::{ActionOutcome, GuardedAction};

use crate::app::{read_new_pin, AppContext};
use crate::cli::PinCommand;

use super::unexpected_outcome;

pub async fn handle_pin(ctx: &AppContext<'_>, command: &PinCommand) -> anyhow::Result<()> {
    match command {
        PinCommand::Status { json } => handle_status(ctx, *json).await,
        PinCommand::Setup => handle_setup(ctx).await,
        PinCommand::Change => handle_change(ctx).await,
    }
}

async fn handle_status(ctx: &AppContext<'_>, json: bool) -> anyhow::Result<()> {
    let gate = ctx.open_gate().await?;
    let configured = gate.is_pin_configured();
    if json {
        let output = serde_json::json!({
            "configured": configured,
            "user_id": gate.user_id(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "PIN: {}",
            if configured { "set up" } else { "not set up" }
        );
    }
    Ok(())
}

async fn handle_setup(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let mut gate = ctx.open_gate().await?;
    match ctx.run_guarded(&mut gate, GuardedAction::SetupPin).await? {
        ActionOutcome::PinEstablished => {
            if !ctx.quiet() {
                println!("PIN set up.");
            }
            Ok(())
        }
        other => Err(unexpected_outcome(other)),
    }
}

async fn handle_change(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let mut gate = ctx.open_gate().await?;
    let new_pin = read_new_pin(ctx.interactive())?;
    match ctx
        .run_guarded(&mut gate, GuardedAction::ChangePin { new_pin })
        .await?
    {
        ActionOutcome::PinChanged => {
            if !ctx.quiet() {
                println!("PIN changed.");
            }
            Ok(())
        }
        other => Err(unexpected_outcome(other)),
    }
}
