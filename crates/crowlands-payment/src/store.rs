//! Session storage abstraction.

use async_trait::async_trait;
use crowlands_core::error::DomainError;

use crate::session::{PaymentSession, PaymentStatus};

/// Storage contract for payment sessions.
///
/// Implementations enforce monotonicity: `mark_status` with a terminal
/// status applies only to a `Pending` row and is otherwise a no-op, so a
/// settled session can never change its terminal state or revert.
#[async_trait]
pub trait PaymentSessionStore: Send + Sync {
    /// Records a freshly created session.
    async fn create(&self, session: &PaymentSession) -> Result<(), DomainError>;

    /// Fetches a session by processor id.
    async fn get(&self, session_id: &str) -> Result<Option<PaymentSession>, DomainError>;

    /// Transitions a pending session to `status`. No-op when the session is
    /// already terminal or unknown.
    async fn mark_status(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> Result<(), DomainError>;
}
