//! Retry policy applied by the handler to every wrapper.

use std::time::Duration;

/// How many times the handler invokes one wrapper before failing over, and
/// how long it sleeps between failed attempts on that wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts_per_wrapper: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts_per_wrapper: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Create a policy; an attempt count of zero is raised to one.
    pub fn new(attempts_per_wrapper: u32, delay: Duration) -> Self {
        Self {
            attempts_per_wrapper: attempts_per_wrapper.max(1),
            delay,
        }
    }

    /// Policy without sleeps between attempts.
    pub fn immediate(attempts_per_wrapper: u32) -> Self {
        Self::new(attempts_per_wrapper, Duration::ZERO)
    }

    pub const fn attempts_per_wrapper(&self) -> u32 {
        self.attempts_per_wrapper
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Upper bound on invocations for a handler over `wrappers` providers.
    pub fn max_invocations(&self, wrappers: usize) -> usize {
        wrappers.saturating_mul(self.attempts_per_wrapper as usize)
    }
}
