//! Bounded retry policy.
//!
//! The "poll a counted number of times with a delay in between" pattern is
//! expressed as a plain value, independent of any transport, so callers can
//! unit-test their schedules without sleeping.

use std::time::Duration;

/// Backoff shape between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay after every attempt.
    Fixed,
    /// Delay doubles after each attempt, capped at `max_delay`.
    Exponential {
        /// Upper bound on any single delay.
        max_delay: Duration,
    },
}

/// A bounded attempt budget with a delay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    backoff: Backoff,
}

impl RetryPolicy {
    /// A policy with `max_attempts` attempts and the same `delay` between
    /// consecutive attempts.
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: delay,
            backoff: Backoff::Fixed,
        }
    }

    /// A policy whose delay doubles after each attempt, starting at
    /// `initial_delay` and capped at `max_delay`.
    #[must_use]
    pub fn exponential(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            backoff: Backoff::Exponential { max_delay },
        }
    }

    /// Total number of attempts the policy permits.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay to wait after the given 1-based attempt, or `None` when the
    /// budget is exhausted and no further attempt follows.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        match self.backoff {
            Backoff::Fixed => Some(self.initial_delay),
            Backoff::Exponential { max_delay } => {
                // Cap the shift so the multiplier cannot overflow u32.
                let exponent = (attempt - 1).min(16);
                let delay = self.initial_delay.saturating_mul(1_u32 << exponent);
                Some(delay.min(max_delay))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_policy_yields_constant_delays_between_attempts() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(2));

        assert_eq!(policy.max_attempts(), 5);
        for attempt in 1..5 {
            assert_eq!(policy.delay_after(attempt), Some(Duration::from_secs(2)));
        }
    }

    #[test]
    fn test_no_delay_after_final_attempt() {
        let policy = RetryPolicy::fixed(5, Duration::from_secs(2));

        assert_eq!(policy.delay_after(5), None);
        assert_eq!(policy.delay_after(6), None);
    }

    #[test]
    fn test_attempt_zero_is_not_a_valid_schedule_position() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(1));

        assert_eq!(policy.delay_after(0), None);
    }

    #[test]
    fn test_exponential_policy_doubles_and_caps() {
        let policy =
            RetryPolicy::exponential(6, Duration::from_secs(1), Duration::from_secs(5));

        assert_eq!(policy.delay_after(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_after(3), Some(Duration::from_secs(4)));
        assert_eq!(policy.delay_after(4), Some(Duration::from_secs(5)));
        assert_eq!(policy.delay_after(5), Some(Duration::from_secs(5)));
        assert_eq!(policy.delay_after(6), None);
    }

    #[test]
    fn test_single_attempt_policy_never_sleeps() {
        let policy = RetryPolicy::fixed(1, Duration::from_secs(2));

        assert_eq!(policy.delay_after(1), None);
    }
}
