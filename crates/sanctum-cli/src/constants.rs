//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (config, store, credential, note, link).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong PIN, too many attempts, no PIN set up).
    pub const AUTH_FAILED: i32 = 5;
}

/// Consecutive wrong PINs before a lockout when the config does not say otherwise.
pub const DEFAULT_MAX_PIN_ATTEMPTS: u32 = 3;

/// Lockout length after too many wrong PINs.
pub const DEFAULT_LOCKOUT_SECONDS: u64 = 30;

/// Store call deadline when the config does not say otherwise.
pub const DEFAULT_REMOTE_TIMEOUT_SECONDS: u64 = 10;

/// Log filter used when `SANCTUM_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";
