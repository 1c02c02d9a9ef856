//! Gate states and the steps reported to the caller.

use super::action::{ActionKind, ActionOutcome, GuardedAction};

/// Which PIN the open prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Enter the existing PIN
    Verify,
    /// Choose a new PIN (first-time setup)
    Establish,
}

/// Gate state: `Idle → PromptShown → Verifying → Idle`.
#[derive(Debug, Default)]
pub enum GateState {
    #[default]
    Idle,
    PromptShown {
        action: GuardedAction,
        prompt: PromptKind,
    },
    /// A submitted PIN is being checked; the action has been taken out of
    /// the prompt and runs only if the check succeeds
    Verifying { action: ActionKind },
}

impl GateState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GateState::Idle)
    }

    pub fn prompt(&self) -> Option<PromptKind> {
        match self {
            GateState::PromptShown { prompt, .. } => Some(*prompt),
            _ => None,
        }
    }

    pub fn pending_action(&self) -> Option<ActionKind> {
        match self {
            GateState::Idle => None,
            GateState::PromptShown { action, .. } => Some(action.kind()),
            GateState::Verifying { action } => Some(*action),
        }
    }
}

/// What [`super::AccessGate::request`] did with an action.
#[derive(Debug)]
pub enum GateStep {
    /// No PIN was needed; the action already ran
    Completed(ActionOutcome),
    /// A prompt is open; answer it with `submit` or `cancel`
    PinRequired(PromptKind),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_state_accessors() {
        assert!(GateState::default().is_idle());

        let shown = GateState::PromptShown {
            action: GuardedAction::DeleteNote { id: Uuid::new_v4() },
            prompt: PromptKind::Verify,
        };
        assert_eq!(shown.prompt(), Some(PromptKind::Verify));
        assert_eq!(shown.pending_action(), Some(ActionKind::DeleteNote));

        let verifying = GateState::Verifying {
            action: ActionKind::ViewCredential,
        };
        assert!(verifying.prompt().is_none());
        assert_eq!(verifying.pending_action(), Some(ActionKind::ViewCredential));
    }
}
