//! Gate configuration.

use std::num::NonZeroU32;
use std::time::Duration;

/// Default deadline for a single store call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long verification is refused once the attempt limit is reached.
pub const DEFAULT_LOCKOUT: Duration = Duration::from_secs(30);

/// How many consecutive wrong PINs are accepted before a lockout.
///
/// The count spans requests and is only reset by a correct PIN or by the
/// lockout itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttemptLimit {
    /// Re-prompt forever
    #[default]
    Unbounded,
    Limited(NonZeroU32),
}

impl AttemptLimit {
    /// Build from a count where zero means unbounded.
    pub fn from_count(count: u32) -> Self {
        match NonZeroU32::new(count) {
            Some(limit) => AttemptLimit::Limited(limit),
            None => AttemptLimit::Unbounded,
        }
    }

    /// Attempts left after `failures` wrong PINs, `None` when unbounded.
    pub fn remaining(&self, failures: u32) -> Option<u32> {
        match self {
            AttemptLimit::Unbounded => None,
            AttemptLimit::Limited(limit) => Some(limit.get().saturating_sub(failures)),
        }
    }
}

/// Runtime settings for an [`super::AccessGate`].
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub max_attempts: AttemptLimit,
    pub remote_timeout: Duration,
    pub lockout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_attempts: AttemptLimit::Unbounded,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            lockout: DEFAULT_LOCKOUT,
        }
    }
}

impl GateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_attempts(mut self, count: u32) -> Self {
        self.max_attempts = AttemptLimit::from_count(count);
        self
    }

    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = timeout;
        self
    }

    pub fn lockout(mut self, lockout: Duration) -> Self {
        self.lockout = lockout;
        self
    }
}
