//! # Sanctum Core
//!
//! Core library for Sanctum - the PIN-gated secrecy layer of a personal
//! productivity vault (credentials, notes, links).
//!
//! A 4-digit PIN held by the user gates decryption of stored credential
//! passwords and the transitions of "protected" flags on notes and links.
//! The PIN itself is never stored; only its one-way digest is.
//!
//! ## Architecture
//!
//! - **crypto**: PIN hashing and credential password encryption
//! - **cache**: Namespaced local key/value persistence
//! - **pin_cache**: Session mirror of the canonical PIN hash
//! - **gate**: The access gate state machine and its action catalogue
//! - **storage**: Remote collaborator traits plus memory and SQLite backends

pub mod cache;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod gate;
pub mod pin_cache;
pub mod storage;

pub use error::{Result, SanctumError};
pub use gate::{AccessGate, ActionOutcome, GateConfig, GateStep, GuardedAction, PinPrompt};
pub use pin_cache::PinCache;
pub use storage::{RecordStore, SecretStore, VaultStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
