//! Ledger facade and store abstraction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowlands_core::error::DomainError;
use uuid::Uuid;

use crate::domain::{EntitlementStatus, QuotaPolicy, ReserveDecision, SubscriptionTier};

/// Storage contract for entitlement state.
///
/// Every implementation must make `reserve` linearizable per user: two
/// concurrent reservations for the same user must never both succeed when
/// only one unit of quota remains. Reservations for different users must not
/// contend with each other.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Atomically applies the check-and-increment transition, creating the
    /// record on first contact.
    async fn reserve(
        &self,
        user_id: Uuid,
        policy: QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<ReserveDecision, DomainError>;

    /// Reports the user's current entitlement without consuming anything.
    async fn status(
        &self,
        user_id: Uuid,
        policy: QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<EntitlementStatus, DomainError>;

    /// Upgrades the user to `tier`, creating the record if needed.
    /// Idempotent; never downgrades.
    async fn upgrade(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError>;
}

/// The ledger the rest of the system talks to: a store handle plus the
/// configured quota policy.
#[derive(Clone)]
pub struct EntitlementLedger {
    store: Arc<dyn EntitlementStore>,
    policy: QuotaPolicy,
}

impl EntitlementLedger {
    /// Creates a ledger over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn EntitlementStore>, policy: QuotaPolicy) -> Self {
        Self { store, policy }
    }

    /// The configured quota policy.
    #[must_use]
    pub fn policy(&self) -> QuotaPolicy {
        self.policy
    }

    /// Consumes one unit of quota if any remains. See
    /// [`EntitlementStore::reserve`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` when the store is unreachable.
    pub async fn reserve(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ReserveDecision, DomainError> {
        self.store.reserve(user_id, self.policy, now).await
    }

    /// Reports tier, limit, and remaining quota for a user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` when the store is unreachable.
    pub async fn status(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<EntitlementStatus, DomainError> {
        self.store.status(user_id, self.policy, now).await
    }

    /// Upgrades a user's tier. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` when the store is unreachable.
    pub async fn upgrade(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.store.upgrade(user_id, tier, now).await
    }
}
