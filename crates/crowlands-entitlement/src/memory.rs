//! In-memory entitlement store.
//!
//! Used by tests and local development. A single mutex over the map gives
//! linearizability; the production store gets per-user granularity from
//! Postgres row locks instead.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowlands_core::error::DomainError;
use uuid::Uuid;

use crate::domain::{
    EntitlementState, EntitlementStatus, QuotaPolicy, ReserveDecision, SubscriptionTier,
};
use crate::ledger::EntitlementStore;

/// Mutex-guarded map of per-user entitlement state.
#[derive(Debug, Default)]
pub struct MemoryEntitlementStore {
    entries: Mutex<HashMap<Uuid, EntitlementState>>,
}

impl MemoryEntitlementStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry<T>(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        apply: impl FnOnce(&mut EntitlementState) -> T,
    ) -> Result<T, DomainError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| DomainError::Infrastructure("entitlement lock poisoned".into()))?;
        let state = entries
            .entry(user_id)
            .or_insert_with(|| EntitlementState::new(user_id, now));
        Ok(apply(state))
    }
}

#[async_trait]
impl EntitlementStore for MemoryEntitlementStore {
    async fn reserve(
        &self,
        user_id: Uuid,
        policy: QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<ReserveDecision, DomainError> {
        self.with_entry(user_id, now, |state| state.try_reserve(policy, now))
    }

    async fn status(
        &self,
        user_id: Uuid,
        policy: QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<EntitlementStatus, DomainError> {
        self.with_entry(user_id, now, |state| state.status(policy, now))
    }

    async fn upgrade(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.with_entry(user_id, now, |state| {
            state.apply_upgrade(tier);
        })
    }
}
