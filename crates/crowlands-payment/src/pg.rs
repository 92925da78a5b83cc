//! `PostgreSQL` session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowlands_core::error::DomainError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::session::{PaymentSession, PaymentStatus};
use crate::store::PaymentSessionStore;

/// Postgres-backed session store. Monotonicity is enforced in SQL: terminal
/// transitions only match rows still in `'pending'`.
#[derive(Debug, Clone)]
pub struct PgPaymentSessionStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Result<PaymentSession, DomainError> {
        let status = PaymentStatus::parse(&self.status).ok_or_else(|| {
            DomainError::Infrastructure(format!("unknown session status in storage: {}", self.status))
        })?;
        Ok(PaymentSession {
            id: self.id,
            user_id: self.user_id,
            status,
            created_at: self.created_at,
        })
    }
}

impl PgPaymentSessionStore {
    /// Creates a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentSessionStore for PgPaymentSessionStore {
    async fn create(&self, session: &PaymentSession) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO payment_sessions (id, user_id, status, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.status.as_str())
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(DomainError::infrastructure)?;
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<PaymentSession>, DomainError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, user_id, status, created_at
             FROM payment_sessions
             WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::infrastructure)?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn mark_status(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE payment_sessions
             SET status = $2
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(session_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(DomainError::infrastructure)?;
        Ok(())
    }
}
