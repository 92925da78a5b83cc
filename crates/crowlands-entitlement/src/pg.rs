//! `PostgreSQL` entitlement store.
//!
//! Atomicity comes from a row-level lock: each operation opens a
//! transaction, selects the user's row `FOR UPDATE`, applies the pure
//! transition from `domain`, and writes the result back. Different users
//! touch different rows and never contend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowlands_core::error::DomainError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    EntitlementState, EntitlementStatus, QuotaPolicy, ReserveDecision, SubscriptionTier,
};
use crate::ledger::EntitlementStore;

/// Postgres-backed entitlement store.
#[derive(Debug, Clone)]
pub struct PgEntitlementStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct EntitlementRow {
    user_id: Uuid,
    tier: String,
    consumed: i32,
    period_start: DateTime<Utc>,
}

impl EntitlementRow {
    fn into_state(self) -> Result<EntitlementState, DomainError> {
        let tier = SubscriptionTier::parse(&self.tier).ok_or_else(|| {
            DomainError::Infrastructure(format!("unknown tier in storage: {}", self.tier))
        })?;
        Ok(EntitlementState {
            user_id: self.user_id,
            tier,
            consumed: u32::try_from(self.consumed).unwrap_or(0),
            period_start: self.period_start,
        })
    }
}

impl PgEntitlementStore {
    /// Creates a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a transaction, locks (creating if absent) the user's row,
    /// applies `apply` to the in-memory state, persists it, and commits.
    async fn with_locked_row<T>(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        apply: impl FnOnce(&mut EntitlementState) -> T + Send,
    ) -> Result<T, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DomainError::infrastructure)?;

        sqlx::query(
            "INSERT INTO entitlements (user_id, tier, consumed, period_start)
             VALUES ($1, 'free', 0, $2)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(crate::domain::period_start_for(now))
        .execute(&mut *tx)
        .await
        .map_err(DomainError::infrastructure)?;

        let row: EntitlementRow = sqlx::query_as(
            "SELECT user_id, tier, consumed, period_start
             FROM entitlements
             WHERE user_id = $1
             FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DomainError::infrastructure)?;

        let mut state = row.into_state()?;
        let result = apply(&mut state);

        sqlx::query(
            "UPDATE entitlements
             SET tier = $2, consumed = $3, period_start = $4
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(state.tier.as_str())
        .bind(i32::try_from(state.consumed).unwrap_or(i32::MAX))
        .bind(state.period_start)
        .execute(&mut *tx)
        .await
        .map_err(DomainError::infrastructure)?;

        tx.commit().await.map_err(DomainError::infrastructure)?;

        Ok(result)
    }
}

#[async_trait]
impl EntitlementStore for PgEntitlementStore {
    async fn reserve(
        &self,
        user_id: Uuid,
        policy: QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<ReserveDecision, DomainError> {
        self.with_locked_row(user_id, now, |state| state.try_reserve(policy, now))
            .await
    }

    async fn status(
        &self,
        user_id: Uuid,
        policy: QuotaPolicy,
        now: DateTime<Utc>,
    ) -> Result<EntitlementStatus, DomainError> {
        // Read-only: no lock, no write. Unknown users report a fresh state.
        let row: Option<EntitlementRow> = sqlx::query_as(
            "SELECT user_id, tier, consumed, period_start
             FROM entitlements
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::infrastructure)?;

        let state = match row {
            Some(row) => row.into_state()?,
            None => EntitlementState::new(user_id, now),
        };
        Ok(state.status(policy, now))
    }

    async fn upgrade(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let changed = self
            .with_locked_row(user_id, now, |state| state.apply_upgrade(tier))
            .await?;
        if changed {
            tracing::info!(%user_id, tier = tier.as_str(), "entitlement upgraded");
        }
        Ok(())
    }
}
