//! Output formatting helpers for the CLI.
//!
//! This module provides formatting utilities for displaying credentials,
//! notes and links as tables, plain text or JSON.

mod json;
mod text;

// Re-export public API
pub use json::{credential_json, credentials_json, links_json, notes_json, revealed_json};
pub use text::{credential_table, link_table, note_table, print_revealed};
