use sanctum_core::storage::Note;
use sanctum_core::{ActionOutcome, GuardedAction, RecordStore};

use crate::app::{parse_id, AppContext};
use crate::cli::NoteCommand;
use crate::output::{note_table, notes_json};

use super::unexpected_outcome;

pub async fn handle_note(ctx: &AppContext<'_>, command: &NoteCommand) -> anyhow::Result<()> {
    match command {
        NoteCommand::Add { content, pin } => handle_add(ctx, content, *pin).await,
        NoteCommand::List { json } => handle_list(ctx, *json).await,
        NoteCommand::Lock(args) => {
            let id = parse_id("note", &args.id)?;
            run_note_action(ctx, GuardedAction::LockNote { id }, "Note locked.").await
        }
        NoteCommand::Unlock(args) => {
            let id = parse_id("note", &args.id)?;
            run_note_action(ctx, GuardedAction::UnlockNote { id }, "Note unlocked.").await
        }
        NoteCommand::Pin(args) => {
            let id = parse_id("note", &args.id)?;
            run_note_action(ctx, GuardedAction::PinNote { id }, "Note pinned.").await
        }
        NoteCommand::Unpin(args) => {
            let id = parse_id("note", &args.id)?;
            run_note_action(ctx, GuardedAction::UnpinNote { id }, "Note unpinned.").await
        }
        NoteCommand::Delete(args) => {
            let id = parse_id("note", &args.id)?;
            run_note_action(ctx, GuardedAction::DeleteNote { id }, "Note deleted.").await
        }
    }
}

async fn handle_add(ctx: &AppContext<'_>, content: &str, pin: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let mut note = Note::new(content);
    note.is_pinned = pin;
    store.put_note(&note).await?;

    if ctx.quiet() {
        println!("{}", note.id);
    } else {
        println!("Added note {}", note.id);
    }
    Ok(())
}

async fn handle_list(ctx: &AppContext<'_>, json: bool) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let notes = store.list_notes().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notes_json(&notes))?);
    } else if notes.is_empty() {
        if !ctx.quiet() {
            println!("No notes.");
        }
    } else {
        println!("{}", note_table(&notes));
    }
    Ok(())
}

async fn run_note_action(
    ctx: &AppContext<'_>,
    action: GuardedAction,
    done: &str,
) -> anyhow::Result<()> {
    let mut gate = ctx.open_gate().await?;
    let had_pin = gate.is_pin_configured();

    match ctx.run_guarded(&mut gate, action).await? {
        ActionOutcome::NoteUpdated(_) | ActionOutcome::NoteDeleted(_) => {
            if !ctx.quiet() {
                if !had_pin && gate.is_pin_configured() {
                    println!("PIN set up.");
                }
                println!("{}", done);
            }
            Ok(())
        }
        other => Err(unexpected_outcome(other)),
    }
}
