//! Backoff policy for re-enqueued (retried) messages.
//!
//! Unlike a delivery queue's attempt-indexed exponential backoff, this
//! policy is driven directly by the provider's receive count: every receive
//! (including ones outside our control, e.g. a crashed worker) pushes the
//! next delay further out, which is what actually bounds retry storms on a
//! shared queue.

use serde::{Deserialize, Serialize};

const fn defaults_max_attempts() -> u32 {
    1
}

const fn defaults_max_delay_secs() -> u64 {
    900
}

const fn defaults_exponent_cap() -> u32 {
    8
}

/// Retry policy configuration for queue message handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of handler-level retries before a message is treated
    /// as exhausted and reported as non-retryable (distinct from the
    /// provider's own redrive-policy attempt count).
    #[serde(default = "defaults_max_attempts")]
    pub max_attempts: u32,

    /// Ceiling applied to the exponential backoff delay, in seconds.
    #[serde(default = "defaults_max_delay_secs")]
    pub max_delay_secs: u64,

    /// Receive-count exponent is capped at this value before computing
    /// `2^exponent`, so the delay itself saturates well before overflow.
    #[serde(default = "defaults_exponent_cap")]
    pub exponent_cap: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults_max_attempts(),
            max_delay_secs: defaults_max_delay_secs(),
            exponent_cap: defaults_exponent_cap(),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `delay = min(max_delay_secs, 2^min(receive_count, exponent_cap))`
    #[must_use]
    pub fn backoff_delay_secs(&self, receive_count: u32) -> u64 {
        let exponent = receive_count.min(self.exponent_cap);
        let delay = 2u64.saturating_pow(exponent);
        delay.min(self.max_delay_secs)
    }

    /// Whether a handler should retry given how many times its own handler
    /// budget (not the provider's receive count) has been spent.
    #[must_use]
    pub const fn should_retry(&self, handler_attempt: u32) -> bool {
        handler_attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_documented_formula() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay_secs(0), 1);
        assert_eq!(policy.backoff_delay_secs(1), 2);
        assert_eq!(policy.backoff_delay_secs(2), 4);
        assert_eq!(policy.backoff_delay_secs(8), 256);
        // Exponent caps at 8 -> 2^8 = 256, still below 900.
        assert_eq!(policy.backoff_delay_secs(9), 256);
        assert_eq!(policy.backoff_delay_secs(100), 256);
    }

    #[test]
    fn never_exceeds_max_delay() {
        let policy = RetryPolicy {
            max_attempts: 1,
            max_delay_secs: 900,
            exponent_cap: 12,
        };
        // 2^12 = 4096, clamped to 900.
        assert_eq!(policy.backoff_delay_secs(12), 900);
    }

    #[test]
    fn handler_retry_budget_is_one_shot_by_default() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0));
        assert!(!policy.should_retry(1));
    }
}
