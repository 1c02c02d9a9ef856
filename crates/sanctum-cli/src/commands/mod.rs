//! Command handlers, one module per command group.

mod credentials;
mod init;
mod links;
mod maintenance;
mod misc;
mod notes;
mod pin;

pub use credentials::handle_cred;
pub use init::handle_init;
pub use links::handle_link;
pub use maintenance::handle_reset;
pub use misc::handle_completions;
pub use notes::handle_note;
pub use pin::handle_pin;

use sanctum_core::ActionOutcome;

/// The gate answered an action with an outcome belonging to another one.
fn unexpected_outcome(outcome: ActionOutcome) -> anyhow::Error {
    anyhow::anyhow!("Unexpected result: {:?}", outcome)
}
