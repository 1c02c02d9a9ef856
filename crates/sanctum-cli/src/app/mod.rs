//! Application-level utilities for the Sanctum CLI.
//!
//! This module provides:
//! - Path resolution for the config file
//! - The application context that opens the store and the access gate
//! - Terminal and environment PIN entry

mod context;
mod prompt;
mod resolver;

// Re-export public API
pub use context::AppContext;
pub use prompt::{read_new_pin, read_password};
pub use resolver::{parse_id, resolve_config_path};
