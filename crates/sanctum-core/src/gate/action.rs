//! The catalogue of guarded actions and their outcomes.

use std::fmt;

use secrecy::SecretString;
use uuid::Uuid;

use crate::error::SanctumError;
use crate::storage::{Credential, CredentialUpdate, Link, NewCredential, Note};

/// An action routed through the access gate.
#[derive(Debug)]
pub enum GuardedAction {
    /// First-time PIN setup
    SetupPin,
    /// Replace the PIN; the current one must be entered
    ChangePin { new_pin: SecretString },
    /// Store a new credential, encrypting its password under its username
    AddCredential(NewCredential),
    /// Decrypt a credential's password for display or copy
    ViewCredential { id: Uuid },
    /// Edit a credential, re-encrypting under the resulting username
    EditCredential { id: Uuid, update: CredentialUpdate },
    DeleteCredential { id: Uuid },
    /// Lock a note; establishes the PIN when none exists yet
    LockNote { id: Uuid },
    UnlockNote { id: Uuid },
    PinNote { id: Uuid },
    UnpinNote { id: Uuid },
    DeleteNote { id: Uuid },
    HideLink { id: Uuid },
    UnhideLink { id: Uuid },
    /// List every link, hidden ones included
    RevealLinks,
    /// Delete every credential, note, link and the PIN record
    ResetData,
}

impl GuardedAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            GuardedAction::SetupPin => ActionKind::SetupPin,
            GuardedAction::ChangePin { .. } => ActionKind::ChangePin,
            GuardedAction::AddCredential(_) => ActionKind::AddCredential,
            GuardedAction::ViewCredential { .. } => ActionKind::ViewCredential,
            GuardedAction::EditCredential { .. } => ActionKind::EditCredential,
            GuardedAction::DeleteCredential { .. } => ActionKind::DeleteCredential,
            GuardedAction::LockNote { .. } => ActionKind::LockNote,
            GuardedAction::UnlockNote { .. } => ActionKind::UnlockNote,
            GuardedAction::PinNote { .. } => ActionKind::PinNote,
            GuardedAction::UnpinNote { .. } => ActionKind::UnpinNote,
            GuardedAction::DeleteNote { .. } => ActionKind::DeleteNote,
            GuardedAction::HideLink { .. } => ActionKind::HideLink,
            GuardedAction::UnhideLink { .. } => ActionKind::UnhideLink,
            GuardedAction::RevealLinks => ActionKind::RevealLinks,
            GuardedAction::ResetData => ActionKind::ResetData,
        }
    }
}

/// Fieldless tag of a [`GuardedAction`], safe to log and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    SetupPin,
    ChangePin,
    AddCredential,
    ViewCredential,
    EditCredential,
    DeleteCredential,
    LockNote,
    UnlockNote,
    PinNote,
    UnpinNote,
    DeleteNote,
    HideLink,
    UnhideLink,
    RevealLinks,
    ResetData,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionKind::SetupPin => "set up PIN",
            ActionKind::ChangePin => "change PIN",
            ActionKind::AddCredential => "add credential",
            ActionKind::ViewCredential => "view credential",
            ActionKind::EditCredential => "edit credential",
            ActionKind::DeleteCredential => "delete credential",
            ActionKind::LockNote => "lock note",
            ActionKind::UnlockNote => "unlock note",
            ActionKind::PinNote => "pin note",
            ActionKind::UnpinNote => "unpin note",
            ActionKind::DeleteNote => "delete note",
            ActionKind::HideLink => "hide link",
            ActionKind::UnhideLink => "unhide link",
            ActionKind::RevealLinks => "reveal hidden links",
            ActionKind::ResetData => "reset data",
        };
        f.write_str(label)
    }
}

/// What an action needs before it may run, given the record it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Requirement {
    /// Runs immediately
    Open,
    /// A PIN must exist, but no prompt is shown
    Configured,
    /// A PIN must exist and be entered
    Verify,
    /// The PIN is entered only when one exists
    VerifyIfConfigured,
    /// A new PIN is chosen; fails if one exists
    Establish,
    /// A new PIN is chosen when none exists; otherwise runs immediately
    EstablishIfUnconfigured,
}

/// Result of a completed guarded action.
#[derive(Debug)]
pub enum ActionOutcome {
    PinEstablished,
    PinChanged,
    CredentialAdded(Credential),
    /// The decrypted password; drop it as soon as it is no longer shown
    CredentialRevealed {
        credential: Credential,
        password: SecretString,
    },
    CredentialUpdated(Credential),
    CredentialDeleted(Uuid),
    NoteUpdated(Note),
    NoteDeleted(Uuid),
    LinkUpdated(Link),
    LinksRevealed(Vec<Link>),
    DataReset,
}

/// Render a failure for the user, naming the action and never echoing
/// backend error text.
pub fn failure_message(action: ActionKind, err: &SanctumError) -> String {
    let reason = match err {
        SanctumError::PinNotConfigured => "no PIN is set up yet".to_string(),
        SanctumError::PinMismatch {
            remaining: Some(remaining),
        } => format!(
            "incorrect PIN ({} attempt{} remaining)",
            remaining,
            if *remaining == 1 { "" } else { "s" }
        ),
        SanctumError::PinMismatch { remaining: None } => "incorrect PIN".to_string(),
        SanctumError::TooManyAttempts => {
            "too many incorrect PIN attempts, try again later".to_string()
        }
        SanctumError::InvalidPin(_) => "a PIN must be exactly 4 digits".to_string(),
        SanctumError::PinAlreadyConfigured => "a PIN is already set up".to_string(),
        SanctumError::DecryptFailure(_) => {
            "the stored password could not be decrypted".to_string()
        }
        SanctumError::RemoteUnavailable(_) => "the store could not be reached".to_string(),
        SanctumError::Cancelled => "cancelled".to_string(),
        SanctumError::NoPendingAction => "no action is waiting for a PIN".to_string(),
        SanctumError::PromptAlreadyOpen => "another action is waiting for a PIN".to_string(),
        SanctumError::NotFound(what) => format!("{} not found", what),
        SanctumError::InvalidInput(message) => message.clone(),
        SanctumError::Crypto(_)
        | SanctumError::Storage(_)
        | SanctumError::Sqlite { .. }
        | SanctumError::Io { .. }
        | SanctumError::Json { .. } => "an internal storage error occurred".to_string(),
    };
    format!("Could not {}: {}.", action, reason)
}
