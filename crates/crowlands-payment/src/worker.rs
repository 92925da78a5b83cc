//! Bounded payment-confirmation polling.

use std::sync::Arc;

use crowlands_core::clock::Clock;
use crowlands_core::error::DomainError;
use crowlands_core::retry::RetryPolicy;
use crowlands_entitlement::{EntitlementLedger, SubscriptionTier};
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::gateway::{CheckoutGateway, CreatedCheckout, GatewayError};
use crate::session::{PaymentSession, PaymentStatus};
use crate::store::PaymentSessionStore;

/// Result of a bounded confirmation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The session reached (or had already reached) a terminal status.
    Settled(PaymentStatus),
    /// The attempt budget ran out with the session still pending. The
    /// session is NOT forced terminal; a later check or webhook settles it.
    TimedOut,
}

/// Failures during checkout recording or confirmation.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// No session with that id was ever recorded.
    #[error("unknown payment session")]
    UnknownSession,

    /// The processor could not be queried.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Session or ledger storage failed.
    #[error("storage failure: {0}")]
    Storage(#[from] DomainError),
}

/// Records checkout sessions and confirms them against the processor.
pub struct PaymentConfirmationWorker {
    store: Arc<dyn PaymentSessionStore>,
    gateway: Arc<dyn CheckoutGateway>,
    ledger: EntitlementLedger,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl PaymentConfirmationWorker {
    /// Wires the worker to its collaborators. `policy` bounds every
    /// `confirm` run.
    #[must_use]
    pub fn new(
        store: Arc<dyn PaymentSessionStore>,
        gateway: Arc<dyn CheckoutGateway>,
        ledger: EntitlementLedger,
        policy: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            gateway,
            ledger,
            policy,
            clock,
        }
    }

    /// Creates a checkout session at the processor and records it pending.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Gateway` when the processor call fails and
    /// `PaymentError::Storage` when the session cannot be recorded.
    #[instrument(skip(self, return_url), fields(user_id = %user_id))]
    pub async fn initiate(
        &self,
        user_id: Uuid,
        return_url: &str,
    ) -> Result<CreatedCheckout, PaymentError> {
        let created = self.gateway.create_checkout(user_id, return_url).await?;
        let session = PaymentSession::new(created.session_id.clone(), user_id, self.clock.now());
        self.store.create(&session).await?;
        info!(session_id = %created.session_id, "checkout session recorded");
        Ok(created)
    }

    /// Loads a recorded session, for ownership checks at the API layer.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Storage` when the store is unreachable.
    pub async fn session(&self, session_id: &str) -> Result<Option<PaymentSession>, PaymentError> {
        Ok(self.store.get(session_id).await?)
    }

    /// Polls the processor until the session settles or the attempt budget
    /// is exhausted. Re-confirming an already-settled session
    /// short-circuits without touching the processor or the ledger.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::UnknownSession` for unrecorded ids; gateway
    /// and storage failures abort the run.
    #[instrument(skip(self))]
    pub async fn confirm(&self, session_id: &str) -> Result<ConfirmOutcome, PaymentError> {
        let session = self
            .store
            .get(session_id)
            .await?
            .ok_or(PaymentError::UnknownSession)?;
        if session.status.is_terminal() {
            return Ok(ConfirmOutcome::Settled(session.status));
        }

        for attempt in 1..=self.policy.max_attempts() {
            match self.settle_attempt(&session).await? {
                PaymentStatus::Pending => {
                    if let Some(delay) = self.policy.delay_after(attempt) {
                        tokio::time::sleep(delay).await;
                    }
                }
                terminal => return Ok(ConfirmOutcome::Settled(terminal)),
            }
        }

        info!(session_id, "confirmation attempts exhausted; session stays pending");
        Ok(ConfirmOutcome::TimedOut)
    }

    /// Performs exactly one confirmation attempt, with no delay. Used by
    /// the status endpoint that clients poll themselves.
    ///
    /// # Errors
    ///
    /// Same as [`Self::confirm`].
    pub async fn check_once(&self, session_id: &str) -> Result<PaymentStatus, PaymentError> {
        let session = self
            .store
            .get(session_id)
            .await?
            .ok_or(PaymentError::UnknownSession)?;
        if session.status.is_terminal() {
            return Ok(session.status);
        }
        self.settle_attempt(&session).await
    }

    /// One processor query plus the resulting state transition. On `Paid`
    /// the ledger upgrade runs before the session is marked, so a crash
    /// between the two is retried into the idempotent upgrade.
    async fn settle_attempt(
        &self,
        session: &PaymentSession,
    ) -> Result<PaymentStatus, PaymentError> {
        let observed = self.gateway.fetch_status(&session.id).await?;
        match observed {
            PaymentStatus::Pending => Ok(PaymentStatus::Pending),
            PaymentStatus::Paid => {
                self.ledger
                    .upgrade(session.user_id, SubscriptionTier::Pro, self.clock.now())
                    .await?;
                self.store.mark_status(&session.id, PaymentStatus::Paid).await?;
                info!(session_id = %session.id, user_id = %session.user_id, "payment confirmed, entitlement upgraded");
                Ok(PaymentStatus::Paid)
            }
            terminal => {
                self.store.mark_status(&session.id, terminal).await?;
                info!(session_id = %session.id, status = terminal.as_str(), "session settled without payment");
                Ok(terminal)
            }
        }
    }
}
