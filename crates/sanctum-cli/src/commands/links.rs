use sanctum_core::storage::Link;
use sanctum_core::{ActionOutcome, GuardedAction, RecordStore};

use crate::app::{parse_id, AppContext};
use crate::cli::LinkCommand;
use crate::output::{link_table, links_json};

use super::unexpected_outcome;

pub async fn handle_link(ctx: &AppContext<'_>, command: &LinkCommand) -> anyhow::Result<()> {
    match command {
        LinkCommand::Add { url, title } => handle_add(ctx, url, title.clone()).await,
        LinkCommand::List { reveal, json } => handle_list(ctx, *reveal, *json).await,
        LinkCommand::Hide(args) => {
            let id = parse_id("link", &args.id)?;
            run_link_action(ctx, GuardedAction::HideLink { id }, "Link hidden.").await
        }
        LinkCommand::Unhide(args) => {
            let id = parse_id("link", &args.id)?;
            run_link_action(ctx, GuardedAction::UnhideLink { id }, "Link unhidden.").await
        }
    }
}

async fn handle_add(ctx: &AppContext<'_>, url: &str, title: Option<String>) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let link = Link::new(url, title);
    store.put_link(&link).await?;

    if ctx.quiet() {
        println!("{}", link.id);
    } else {
        println!("Added link {}", link.id);
    }
    Ok(())
}

async fn handle_list(ctx: &AppContext<'_>, reveal: bool, json: bool) -> anyhow::Result<()> {
    let links = if reveal {
        let mut gate = ctx.open_gate().await?;
        match ctx.run_guarded(&mut gate, GuardedAction::RevealLinks).await? {
            ActionOutcome::LinksRevealed(links) => links,
            other => return Err(unexpected_outcome(other)),
        }
    } else {
        let store = ctx.open_store()?;
        let mut links = store.list_links().await?;
        links.retain(|link| !link.is_hide);
        links
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&links_json(&links))?);
    } else if links.is_empty() {
        if !ctx.quiet() {
            println!("No links.");
        }
    } else {
        println!("{}", link_table(&links));
    }
    Ok(())
}

async fn run_link_action(
    ctx: &AppContext<'_>,
    action: GuardedAction,
    done: &str,
) -> anyhow::Result<()> {
    let mut gate = ctx.open_gate().await?;
    match ctx.run_guarded(&mut gate, action).await? {
        ActionOutcome::LinkUpdated(_) => {
            if !ctx.quiet() {
                println!("{}", done);
            }
            Ok(())
        }
        other => Err(unexpected_outcome(other)),
    }
}
