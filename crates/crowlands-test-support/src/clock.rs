//! Deterministic clocks for tests.

use chrono::{DateTime, Utc};
use crowlands_core::clock::Clock;

/// A clock frozen at a fixed instant. Quota periods and payment timestamps
/// become fully deterministic under it.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
