//! Payment processor abstraction.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::session::PaymentStatus;

/// Failures talking to the external payment processor.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The processor could not be reached.
    #[error("payment processor unreachable: {0}")]
    Network(String),

    /// The processor rejected the request.
    #[error("payment processor rejected the request: {0}")]
    Rejected(String),

    /// The processor's response did not match the expected shape.
    #[error("unexpected payment processor response: {0}")]
    Malformed(String),
}

/// A checkout session created at the processor.
#[derive(Debug, Clone)]
pub struct CreatedCheckout {
    /// Processor-issued session identifier.
    pub session_id: String,
    /// URL the client is redirected to for payment.
    pub checkout_url: String,
}

/// The slice of a payment processor this system consumes: create a checkout
/// session, and ask what became of one.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Creates a checkout session for the user's upgrade purchase.
    async fn create_checkout(
        &self,
        user_id: Uuid,
        return_url: &str,
    ) -> Result<CreatedCheckout, GatewayError>;

    /// Fetches the current status of a session.
    async fn fetch_status(&self, session_id: &str) -> Result<PaymentStatus, GatewayError>;
}
