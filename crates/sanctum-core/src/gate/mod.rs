//! The access gate.
//!
//! Every secret-revealing or protection-changing action goes through
//! [`AccessGate`]. The gate decides whether the action needs a PIN, holds it
//! while a prompt is open, checks the submitted PIN against the cached
//! digest, and only then runs the action against the stores.
//!
//! The gate can be driven step by step (`request`, `submit`, `cancel`) or
//! end to end with [`AccessGate::request_guarded_action`] and a
//! [`PinPrompt`] implementation.

mod action;
mod config;
mod state;

use std::mem;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::cache::LocalCache;
use crate::crypto::{decrypt, encrypt, hash_pin, validate_pin, verify_pin, PinHash};
use crate::error::{Result, SanctumError};
use crate::pin_cache::PinCache;
use crate::storage::{within, Credential, Link, Note, VaultStore};

use action::Requirement;

pub use action::{failure_message, ActionKind, ActionOutcome, GuardedAction};
pub use config::{AttemptLimit, GateConfig, DEFAULT_LOCKOUT, DEFAULT_REMOTE_TIMEOUT};
pub use state::{GateState, GateStep, PromptKind};

/// What a [`PinPrompt`] is being asked for.
#[derive(Debug)]
pub struct PromptRequest<'a> {
    pub action: ActionKind,
    pub kind: PromptKind,
    /// Why the previous answer was rejected, on a re-prompt
    pub retry_reason: Option<&'a SanctumError>,
}

/// Source of PIN entries, e.g. a terminal prompt.
pub trait PinPrompt {
    /// Ask for a PIN. Returning `None` abandons the pending action.
    fn ask(&mut self, request: &PromptRequest<'_>) -> Option<Zeroizing<String>>;
}

enum Decision {
    Execute,
    Prompt(PromptKind),
}

/// Gate over a backend holding both secrets and records.
pub struct AccessGate<B, L>
where
    B: VaultStore,
    L: LocalCache,
{
    store: Arc<B>,
    pins: PinCache<L>,
    config: GateConfig,
    state: GateState,
}

impl<B, L> AccessGate<B, L>
where
    B: VaultStore,
    L: LocalCache,
{
    pub fn new(store: Arc<B>, pins: PinCache<L>, config: GateConfig) -> Self {
        Self {
            store,
            pins,
            config,
            state: GateState::Idle,
        }
    }

    /// Whether a PIN exists, as of the last bootstrap or refresh.
    pub fn is_pin_configured(&self) -> bool {
        self.pins.is_configured()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn user_id(&self) -> &Uuid {
        self.pins.user_id()
    }

    /// The backing store, for unguarded reads and creates.
    pub fn store(&self) -> &Arc<B> {
        &self.store
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Consecutive wrong PINs not yet cleared by a correct one.
    pub fn failed_attempts(&self) -> u32 {
        self.pins.failed_attempts()
    }

    /// End of the current lockout, if one is in force.
    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        self.pins
            .locked_until()
            .filter(|_| self.pins.is_locked_out(Utc::now()))
    }

    /// Route an action through the gate.
    ///
    /// Runs the action straight away when it needs no PIN, otherwise opens a
    /// prompt and parks the action until [`Self::submit`] or [`Self::cancel`].
    ///
    /// # Errors
    ///
    /// - `PromptAlreadyOpen` if another action is waiting for a PIN
    /// - `TooManyAttempts` while a lockout is in force
    /// - `PinNotConfigured` / `PinAlreadyConfigured` when the PIN state does
    ///   not allow the action
    /// - `NotFound` / `InvalidInput` / `InvalidPin` for a bad action
    /// - `RemoteUnavailable` when the store cannot be reached
    pub async fn request(&mut self, action: GuardedAction) -> Result<GateStep> {
        match self.state {
            GateState::PromptShown { .. } => return Err(SanctumError::PromptAlreadyOpen),
            // An abandoned verification never ran its action
            GateState::Verifying { action } => {
                tracing::debug!(%action, "discarding abandoned verification");
            }
            GateState::Idle => {}
        }
        self.reset();

        let kind = action.kind();
        let requirement = self.requirement(&action).await?;
        match self.resolve(requirement).await? {
            Decision::Execute => {
                tracing::debug!(action = %kind, "running action without PIN");
                let outcome = self.execute(action).await?;
                Ok(GateStep::Completed(outcome))
            }
            Decision::Prompt(prompt) => {
                tracing::debug!(action = %kind, ?prompt, "PIN required");
                self.state = GateState::PromptShown { action, prompt };
                Ok(GateStep::PinRequired(prompt))
            }
        }
    }

    /// Answer the open prompt.
    ///
    /// A wrong or malformed PIN leaves the prompt open for another try
    /// unless the attempt limit is reached. Wrong PINs count towards the
    /// limit across requests until a correct one is entered. Any other
    /// outcome, including an unreachable store, returns the gate to idle.
    pub async fn submit(&mut self, candidate: &str) -> Result<ActionOutcome> {
        let (action, prompt) = match mem::take(&mut self.state) {
            GateState::PromptShown { action, prompt } => (action, prompt),
            _ => return Err(SanctumError::NoPendingAction),
        };
        let kind = action.kind();

        match prompt {
            PromptKind::Establish => {
                if let Err(err) = validate_pin(candidate) {
                    self.state = GateState::PromptShown { action, prompt };
                    return Err(err);
                }
                self.state = GateState::Verifying { action: kind };
                let result = self.establish(candidate, action).await;
                self.finish(kind, result)
            }
            PromptKind::Verify => {
                // Malformed entries do not count as attempts
                if let Err(err) = validate_pin(candidate) {
                    self.state = GateState::PromptShown { action, prompt };
                    return Err(err);
                }
                // Another session may have locked out since the prompt opened
                if self.pins.is_locked_out(Utc::now()) {
                    self.reset();
                    return Err(SanctumError::TooManyAttempts);
                }
                self.state = GateState::Verifying { action: kind };
                match self.verify(candidate).await {
                    Ok(true) => {
                        self.pins.clear_failures();
                        let result = self.execute(action).await;
                        self.finish(kind, result)
                    }
                    Ok(false) => {
                        let failures = self.pins.record_failure();
                        tracing::info!(action = %kind, failures, "incorrect PIN");
                        match self.config.max_attempts.remaining(failures) {
                            Some(0) => {
                                let until = lockout_deadline(Utc::now(), self.config.lockout);
                                tracing::warn!(action = %kind, %until, "PIN attempt limit reached");
                                self.pins.lock_out(until);
                                self.reset();
                                Err(SanctumError::TooManyAttempts)
                            }
                            remaining => {
                                self.state = GateState::PromptShown { action, prompt };
                                Err(SanctumError::PinMismatch { remaining })
                            }
                        }
                    }
                    Err(err) => self.finish(kind, Err(err)),
                }
            }
        }
    }

    /// Close the open prompt without running its action.
    pub fn cancel(&mut self) {
        if let Some(action) = self.state.pending_action() {
            tracing::debug!(%action, "PIN prompt cancelled");
        }
        self.reset();
    }

    /// Request an action and drive any prompt it opens to completion.
    ///
    /// Wrong and malformed PINs are re-asked with the rejection passed back
    /// to the prompt. A prompt that returns `None` cancels the action.
    pub async fn request_guarded_action<P>(
        &mut self,
        action: GuardedAction,
        prompt: &mut P,
    ) -> Result<ActionOutcome>
    where
        P: PinPrompt + ?Sized,
    {
        let kind = action.kind();
        let prompt_kind = match self.request(action).await? {
            GateStep::Completed(outcome) => return Ok(outcome),
            GateStep::PinRequired(prompt_kind) => prompt_kind,
        };

        let mut rejection: Option<SanctumError> = None;
        loop {
            let request = PromptRequest {
                action: kind,
                kind: prompt_kind,
                retry_reason: rejection.as_ref(),
            };
            let Some(candidate) = prompt.ask(&request) else {
                self.cancel();
                return Err(SanctumError::Cancelled);
            };
            match self.submit(candidate.as_str()).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) if err.is_retryable_prompt() => rejection = Some(err),
                Err(err) => return Err(err),
            }
        }
    }

    fn reset(&mut self) {
        self.state = GateState::Idle;
    }

    fn finish(&mut self, kind: ActionKind, result: Result<ActionOutcome>) -> Result<ActionOutcome> {
        self.reset();
        match &result {
            Ok(_) => tracing::debug!(action = %kind, "guarded action completed"),
            Err(err) => tracing::debug!(action = %kind, error = %err, "guarded action failed"),
        }
        result
    }

    async fn requirement(&self, action: &GuardedAction) -> Result<Requirement> {
        let requirement = match action {
            GuardedAction::SetupPin => Requirement::Establish,
            GuardedAction::ChangePin { new_pin } => {
                validate_pin(new_pin.expose_secret())?;
                Requirement::Verify
            }
            GuardedAction::AddCredential(new) => {
                require_text("Credential name", &new.name)?;
                require_text("Username", &new.username)?;
                Requirement::Configured
            }
            GuardedAction::ViewCredential { id } | GuardedAction::DeleteCredential { id } => {
                self.load_credential(id).await?;
                Requirement::Verify
            }
            GuardedAction::EditCredential { id, update } => {
                if update.is_empty() {
                    return Err(SanctumError::InvalidInput(
                        "Nothing to change".to_string(),
                    ));
                }
                if let Some(name) = &update.name {
                    require_text("Credential name", name)?;
                }
                if let Some(username) = &update.username {
                    require_text("Username", username)?;
                }
                self.load_credential(id).await?;
                Requirement::Verify
            }
            GuardedAction::LockNote { id } => {
                self.load_note(id).await?;
                Requirement::EstablishIfUnconfigured
            }
            GuardedAction::UnlockNote { id } | GuardedAction::DeleteNote { id } => {
                if self.load_note(id).await?.is_locked {
                    Requirement::Verify
                } else {
                    Requirement::Open
                }
            }
            GuardedAction::PinNote { id } => {
                self.load_note(id).await?;
                Requirement::Open
            }
            GuardedAction::UnpinNote { id } => {
                let note = self.load_note(id).await?;
                if note.is_locked && note.is_pinned {
                    Requirement::Verify
                } else {
                    Requirement::Open
                }
            }
            GuardedAction::HideLink { id } => {
                self.load_link(id).await?;
                Requirement::Open
            }
            GuardedAction::UnhideLink { id } => {
                if self.load_link(id).await?.is_hide {
                    Requirement::VerifyIfConfigured
                } else {
                    Requirement::Open
                }
            }
            GuardedAction::RevealLinks | GuardedAction::ResetData => {
                Requirement::VerifyIfConfigured
            }
        };
        Ok(requirement)
    }

    async fn resolve(&mut self, requirement: Requirement) -> Result<Decision> {
        if requirement == Requirement::Open {
            return Ok(Decision::Execute);
        }
        let configured = self.configured_now().await?;
        let decision = match (requirement, configured) {
            (Requirement::Open, _)
            | (Requirement::Configured, true)
            | (Requirement::VerifyIfConfigured, false)
            | (Requirement::EstablishIfUnconfigured, true) => Ok(Decision::Execute),
            (Requirement::Verify, true) | (Requirement::VerifyIfConfigured, true) => {
                Ok(Decision::Prompt(PromptKind::Verify))
            }
            (Requirement::Establish, false) | (Requirement::EstablishIfUnconfigured, false) => {
                Ok(Decision::Prompt(PromptKind::Establish))
            }
            (Requirement::Configured, false) | (Requirement::Verify, false) => {
                Err(SanctumError::PinNotConfigured)
            }
            (Requirement::Establish, true) => Err(SanctumError::PinAlreadyConfigured),
        }?;
        if matches!(decision, Decision::Prompt(PromptKind::Verify))
            && self.pins.is_locked_out(Utc::now())
        {
            tracing::debug!(until = ?self.pins.locked_until(), "PIN entry locked out");
            return Err(SanctumError::TooManyAttempts);
        }
        Ok(decision)
    }

    // A local "not configured" may predate a PIN set on another device.
    async fn configured_now(&mut self) -> Result<bool> {
        if self.pins.is_configured() {
            return Ok(true);
        }
        let timeout = self.config.remote_timeout;
        Ok(self.pins.refresh(self.store.as_ref(), timeout).await?.is_some())
    }

    // The store decides. The cached digest only stands in while the store is
    // unreachable, and then only to accept: a mismatch it cannot confirm is
    // reported as the outage, not as a wrong PIN.
    async fn verify(&mut self, candidate: &str) -> Result<bool> {
        let timeout = self.config.remote_timeout;
        let refreshed = self
            .pins
            .refresh(self.store.as_ref(), timeout)
            .await
            .map(|hash| hash.map(|hash| verify_pin(candidate, hash)));
        match refreshed {
            Ok(Some(matched)) => Ok(matched),
            Ok(None) => Err(SanctumError::PinNotConfigured),
            Err(err) => match self.pins.current_hash() {
                Some(hash) if verify_pin(candidate, hash) => {
                    tracing::warn!(error = %err, "store unreachable, PIN checked against local cache");
                    Ok(true)
                }
                _ => {
                    tracing::warn!(error = %err, "store unreachable, PIN could not be checked");
                    Err(err)
                }
            },
        }
    }

    async fn establish(&mut self, candidate: &str, action: GuardedAction) -> Result<ActionOutcome> {
        // The PIN record lands before anything it protects
        self.write_pin(hash_pin(candidate)).await?;
        tracing::info!(user_id = %self.pins.user_id(), "PIN established");
        self.execute(action).await
    }

    async fn write_pin(&mut self, hash: PinHash) -> Result<()> {
        let timeout = self.config.remote_timeout;
        within(
            timeout,
            "set_pin_hash",
            self.store.set_pin_hash(self.pins.user_id(), &hash),
        )
        .await?;
        self.pins.remember(hash);
        Ok(())
    }

    async fn execute(&mut self, action: GuardedAction) -> Result<ActionOutcome> {
        let timeout = self.config.remote_timeout;
        match action {
            GuardedAction::SetupPin => Ok(ActionOutcome::PinEstablished),
            GuardedAction::ChangePin { new_pin } => {
                self.write_pin(hash_pin(new_pin.expose_secret())).await?;
                tracing::info!(user_id = %self.pins.user_id(), "PIN changed");
                Ok(ActionOutcome::PinChanged)
            }
            GuardedAction::AddCredential(new) => {
                let now = Utc::now();
                let credential = Credential {
                    id: Uuid::new_v4(),
                    password: encrypt(new.password.expose_secret(), &new.username)?,
                    name: new.name,
                    username: new.username,
                    created_at: now,
                    updated_at: now,
                };
                within(timeout, "put_credential", self.store.put_credential(&credential)).await?;
                Ok(ActionOutcome::CredentialAdded(credential))
            }
            GuardedAction::ViewCredential { id } => {
                let credential = self.load_credential(&id).await?;
                let password = open_credential(&credential)?;
                Ok(ActionOutcome::CredentialRevealed {
                    credential,
                    password,
                })
            }
            GuardedAction::EditCredential { id, update } => {
                let mut credential = self.load_credential(&id).await?;
                let password = match update.password {
                    Some(password) => password,
                    None => open_credential(&credential)?,
                };
                if let Some(name) = update.name {
                    credential.name = name;
                }
                if let Some(username) = update.username {
                    credential.username = username;
                }
                credential.password = encrypt(password.expose_secret(), &credential.username)?;
                credential.updated_at = Utc::now();
                within(timeout, "put_credential", self.store.put_credential(&credential)).await?;
                Ok(ActionOutcome::CredentialUpdated(credential))
            }
            GuardedAction::DeleteCredential { id } => {
                if !within(timeout, "delete_credential", self.store.delete_credential(&id)).await? {
                    return Err(not_found("Credential", &id));
                }
                Ok(ActionOutcome::CredentialDeleted(id))
            }
            GuardedAction::LockNote { id } => self.update_note(&id, |note| note.is_locked = true).await,
            GuardedAction::UnlockNote { id } => {
                self.update_note(&id, |note| note.is_locked = false).await
            }
            GuardedAction::PinNote { id } => self.update_note(&id, |note| note.is_pinned = true).await,
            GuardedAction::UnpinNote { id } => {
                self.update_note(&id, |note| note.is_pinned = false).await
            }
            GuardedAction::DeleteNote { id } => {
                if !within(timeout, "delete_note", self.store.delete_note(&id)).await? {
                    return Err(not_found("Note", &id));
                }
                Ok(ActionOutcome::NoteDeleted(id))
            }
            GuardedAction::HideLink { id } => self.update_link(&id, true).await,
            GuardedAction::UnhideLink { id } => self.update_link(&id, false).await,
            GuardedAction::RevealLinks => {
                let links = within(timeout, "list_links", self.store.list_links()).await?;
                Ok(ActionOutcome::LinksRevealed(links))
            }
            GuardedAction::ResetData => {
                within(timeout, "wipe", self.store.wipe(self.pins.user_id())).await?;
                self.pins.forget();
                tracing::info!(user_id = %self.pins.user_id(), "all data reset");
                Ok(ActionOutcome::DataReset)
            }
        }
    }

    async fn update_note<F>(&self, id: &Uuid, change: F) -> Result<ActionOutcome>
    where
        F: FnOnce(&mut Note),
    {
        let mut note = self.load_note(id).await?;
        change(&mut note);
        note.touch();
        within(self.config.remote_timeout, "put_note", self.store.put_note(&note)).await?;
        Ok(ActionOutcome::NoteUpdated(note))
    }

    async fn update_link(&self, id: &Uuid, hidden: bool) -> Result<ActionOutcome> {
        let mut link = self.load_link(id).await?;
        link.is_hide = hidden;
        within(self.config.remote_timeout, "put_link", self.store.put_link(&link)).await?;
        Ok(ActionOutcome::LinkUpdated(link))
    }

    async fn load_credential(&self, id: &Uuid) -> Result<Credential> {
        within(self.config.remote_timeout, "get_credential", self.store.get_credential(id))
            .await?
            .ok_or_else(|| not_found("Credential", id))
    }

    async fn load_note(&self, id: &Uuid) -> Result<Note> {
        within(self.config.remote_timeout, "get_note", self.store.get_note(id))
            .await?
            .ok_or_else(|| not_found("Note", id))
    }

    async fn load_link(&self, id: &Uuid) -> Result<Link> {
        within(self.config.remote_timeout, "get_link", self.store.get_link(id))
            .await?
            .ok_or_else(|| not_found("Link", id))
    }
}

// The PIN has already been verified here, so a failure is about the stored
// ciphertext and must not read as a wrong PIN.
fn open_credential(credential: &Credential) -> Result<SecretString> {
    decrypt(&credential.password, &credential.username).map_err(|failure| {
        tracing::warn!(
            credential_id = %credential.id,
            error = %failure,
            "credential password could not be decrypted"
        );
        SanctumError::DecryptFailure(failure)
    })
}

fn lockout_deadline(now: DateTime<Utc>, lockout: std::time::Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(lockout)
        .ok()
        .and_then(|lockout| now.checked_add_signed(lockout))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn not_found(what: &str, id: &Uuid) -> SanctumError {
    SanctumError::NotFound(format!("{} {}", what, id))
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SanctumError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}
