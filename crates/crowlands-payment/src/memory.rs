//! In-memory session store for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use crowlands_core::error::DomainError;

use crate::session::{PaymentSession, PaymentStatus};
use crate::store::PaymentSessionStore;

/// Mutex-guarded map of sessions by processor id.
#[derive(Debug, Default)]
pub struct MemoryPaymentSessionStore {
    sessions: Mutex<HashMap<String, PaymentSession>>,
}

impl MemoryPaymentSessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, PaymentSession>>, DomainError> {
        self.sessions
            .lock()
            .map_err(|_| DomainError::Infrastructure("payment session lock poisoned".into()))
    }
}

#[async_trait]
impl PaymentSessionStore for MemoryPaymentSessionStore {
    async fn create(&self, session: &PaymentSession) -> Result<(), DomainError> {
        self.lock()?.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get(&self, session_id: &str) -> Result<Option<PaymentSession>, DomainError> {
        Ok(self.lock()?.get(session_id).cloned())
    }

    async fn mark_status(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> Result<(), DomainError> {
        let mut sessions = self.lock()?;
        if let Some(session) = sessions.get_mut(session_id) {
            if session.status == PaymentStatus::Pending {
                session.status = status;
            }
        }
        Ok(())
    }
}
