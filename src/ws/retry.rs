//! Reconnect policy.
//!
//! A [`RetryPolicy`] decides how many consecutive failed attempts are
//! tolerated and how long to wait before each reconnect.

use std::time::Duration;

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay before a reconnect.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Default ceiling for exponential backoff.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(60_000);

/// Shape of the delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay every time.
    Fixed,
    /// Base delay doubled per failed attempt, capped at `max_delay`.
    Exponential {
        /// Upper bound for any single delay.
        max_delay: Duration,
    },
}

/// Bounded reconnect policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failed attempts after which the client gives up.
    pub max_attempts: u32,
    /// Base delay before a reconnect.
    pub delay: Duration,
    /// Delay growth.
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Fixed-delay policy.
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    /// Exponential policy capped at `max_delay`.
    #[must_use]
    pub const fn exponential(max_attempts: u32, delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Exponential { max_delay },
        }
    }

    /// Returns `true` if `attempts` failures exhaust the budget.
    #[must_use]
    pub const fn is_exhausted(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }

    /// Delay before the reconnect that follows failure number `attempt`
    /// (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { max_delay } => {
                let exp = attempt.saturating_sub(1).min(16);
                self.delay
                    .saturating_mul(2_u32.saturating_pow(exp))
                    .min(max_delay)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_RECONNECT_DELAY)
    }
}
