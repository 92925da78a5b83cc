//! Entitlement state and its pure transitions.
//!
//! All quota arithmetic lives here so that both stores apply exactly the
//! same rules; the stores only provide atomicity.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription tier. Ordering matters: upgrades move strictly upwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    /// Metered tier with a per-period quota.
    Free,
    /// Unlimited generations.
    Pro,
}

impl SubscriptionTier {
    /// Stable text form used in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    /// Parses the storage text form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "free" => Some(Self::Free),
            "pro" => Some(Self::Pro),
            _ => None,
        }
    }
}

/// Quota configuration for the Free tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Generations permitted per calendar month.
    pub monthly_limit: u32,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self { monthly_limit: 3 }
    }
}

/// Outcome of a reservation attempt. Denial is a normal outcome, not an
/// error; storage failures surface separately as `DomainError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveDecision {
    /// One unit was consumed. `remaining` is `None` for unlimited tiers.
    Granted {
        /// Units left in the period after this reservation.
        remaining: Option<u32>,
    },
    /// The period quota is exhausted; nothing was mutated.
    Denied {
        /// The configured period limit, for client display.
        limit: u32,
    },
}

/// Snapshot of a user's entitlement, reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntitlementStatus {
    /// Current tier.
    pub tier: SubscriptionTier,
    /// Period limit; `None` for unlimited tiers.
    pub limit: Option<u32>,
    /// Units left this period; `None` for unlimited tiers.
    pub remaining: Option<u32>,
    /// First instant of the current period.
    pub period_start: DateTime<Utc>,
}

/// Per-user entitlement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementState {
    /// Owning user.
    pub user_id: Uuid,
    /// Current tier.
    pub tier: SubscriptionTier,
    /// Generations consumed in the current period.
    pub consumed: u32,
    /// First instant of the current period.
    pub period_start: DateTime<Utc>,
}

/// First instant of the calendar month containing `now`, in UTC. This is
/// the period boundary for quota rollover.
#[must_use]
pub fn period_start_for(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    let first = date.with_day(1).unwrap_or(date);
    match first.and_hms_opt(0, 0, 0) {
        Some(midnight) => Utc.from_utc_datetime(&midnight),
        None => now,
    }
}

impl EntitlementState {
    /// Fresh Free-tier state for a user first seen at `now`.
    #[must_use]
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            tier: SubscriptionTier::Free,
            consumed: 0,
            period_start: period_start_for(now),
        }
    }

    /// Lazily resets the counter when `now` has crossed into a new period.
    pub fn roll_over_if_needed(&mut self, now: DateTime<Utc>) {
        let boundary = period_start_for(now);
        if self.period_start < boundary {
            self.consumed = 0;
            self.period_start = boundary;
        }
    }

    /// The check-and-increment transition. Must be applied atomically per
    /// user by the caller. Denial leaves the state untouched.
    pub fn try_reserve(&mut self, policy: QuotaPolicy, now: DateTime<Utc>) -> ReserveDecision {
        self.roll_over_if_needed(now);
        match self.tier {
            SubscriptionTier::Pro => {
                // Counted for observability only; Pro has no ceiling.
                self.consumed = self.consumed.saturating_add(1);
                ReserveDecision::Granted { remaining: None }
            }
            SubscriptionTier::Free => {
                if self.consumed < policy.monthly_limit {
                    self.consumed += 1;
                    ReserveDecision::Granted {
                        remaining: Some(policy.monthly_limit - self.consumed),
                    }
                } else {
                    ReserveDecision::Denied {
                        limit: policy.monthly_limit,
                    }
                }
            }
        }
    }

    /// Read-only status view, computed as if rollover had happened.
    #[must_use]
    pub fn status(&self, policy: QuotaPolicy, now: DateTime<Utc>) -> EntitlementStatus {
        let boundary = period_start_for(now);
        let (consumed, period_start) = if self.period_start < boundary {
            (0, boundary)
        } else {
            (self.consumed, self.period_start)
        };

        match self.tier {
            SubscriptionTier::Pro => EntitlementStatus {
                tier: self.tier,
                limit: None,
                remaining: None,
                period_start,
            },
            SubscriptionTier::Free => EntitlementStatus {
                tier: self.tier,
                limit: Some(policy.monthly_limit),
                remaining: Some(policy.monthly_limit.saturating_sub(consumed)),
                period_start,
            },
        }
    }

    /// Applies a tier upgrade. Idempotent; never downgrades. Returns whether
    /// the tier actually changed.
    pub fn apply_upgrade(&mut self, tier: SubscriptionTier) -> bool {
        if tier > self.tier {
            self.tier = tier;
            true
        } else {
            false
        }
    }
}
