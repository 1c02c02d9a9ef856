use sanctum_core::storage::{CredentialUpdate, NewCredential};
use sanctum_core::{ActionOutcome, GuardedAction, SecretStore};

use crate::app::{parse_id, read_password, AppContext};
use crate::cli::{CredAddArgs, CredCommand, CredEditArgs};
use crate::output::{credential_table, credentials_json, print_revealed, revealed_json};

use super::unexpected_outcome;

pub async fn handle_cred(ctx: &AppContext<'_>, command: &CredCommand) -> anyhow::Result<()> {
    match command {
        CredCommand::Add(args) => handle_add(ctx, args).await,
        CredCommand::List { json } => handle_list(ctx, *json).await,
        CredCommand::Show { id, json } => handle_show(ctx, id, *json).await,
        CredCommand::Edit(args) => handle_edit(ctx, args).await,
        CredCommand::Delete { id } => handle_delete(ctx, id).await,
    }
}

async fn handle_add(ctx: &AppContext<'_>, args: &CredAddArgs) -> anyhow::Result<()> {
    let mut gate = ctx.open_gate().await?;
    let password = match args.password.clone() {
        Some(password) => password,
        None => read_password(ctx.interactive())?,
    };
    let action = GuardedAction::AddCredential(NewCredential::new(
        args.name.clone(),
        args.username.clone(),
        password,
    ));

    match ctx.run_guarded(&mut gate, action).await? {
        ActionOutcome::CredentialAdded(credential) => {
            if ctx.quiet() {
                println!("{}", credential.id);
            } else {
                println!("Added credential '{}' ({})", credential.name, credential.id);
            }
            Ok(())
        }
        other => Err(unexpected_outcome(other)),
    }
}

async fn handle_list(ctx: &AppContext<'_>, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let credentials = store.list_credentials().await?;

    if json {
        let output = serde_json::to_string_pretty(&credentials_json(&credentials))?;
        println!("{}", output);
    } else if credentials.is_empty() {
        if !ctx.quiet() {
            println!("No credentials.");
        }
    } else {
        println!("{}", credential_table(&credentials));
    }
    Ok(())
}

async fn handle_show(ctx: &AppContext<'_>, id: &str, json: bool) -> anyhow::Result<()> {
    let id = parse_id("credential", id)?;
    let mut gate = ctx.open_gate().await?;

    match ctx
        .run_guarded(&mut gate, GuardedAction::ViewCredential { id })
        .await?
    {
        ActionOutcome::CredentialRevealed {
            credential,
            password,
        } => {
            if json {
                let output = serde_json::to_string_pretty(&revealed_json(&credential, &password))?;
                println!("{}", output);
            } else {
                print_revealed(&credential, &password);
            }
            Ok(())
        }
        other => Err(unexpected_outcome(other)),
    }
}

async fn handle_edit(ctx: &AppContext<'_>, args: &CredEditArgs) -> anyhow::Result<()> {
    let id = parse_id("credential", &args.id)?;
    let mut update = CredentialUpdate::new();
    if let Some(name) = args.name.as_deref() {
        update = update.name(name);
    }
    if let Some(username) = args.username.as_deref() {
        update = update.username(username);
    }
    if let Some(password) = args.password.as_deref() {
        update = update.password(password);
    }

    let mut gate = ctx.open_gate().await?;
    match ctx
        .run_guarded(&mut gate, GuardedAction::EditCredential { id, update })
        .await?
    {
        ActionOutcome::CredentialUpdated(credential) => {
            if !ctx.quiet() {
                println!("Updated credential '{}'", credential.name);
            }
            Ok(())
        }
        other => Err(unexpected_outcome(other)),
    }
}

async fn handle_delete(ctx: &AppContext<'_>, id: &str) -> anyhow::Result<()> {
    let id = parse_id("credential", id)?;
    let mut gate = ctx.open_gate().await?;

    match ctx
        .run_guarded(&mut gate, GuardedAction::DeleteCredential { id })
        .await?
    {
        ActionOutcome::CredentialDeleted(id) => {
            if !ctx.quiet() {
                println!("Deleted credential {}", id);
            }
            Ok(())
        }
        other => Err(unexpected_outcome(other)),
    }
}
