//! Crowlands Payment — checkout sessions and confirmation polling.
//!
//! The processor owns the checkout UI; this crate records sessions, polls
//! their status with a bounded retry budget, and upgrades the entitlement
//! ledger exactly once when a payment lands. Session status transitions are
//! monotonic: once terminal, a session never re-enters `Pending`.

pub mod gateway;
pub mod memory;
pub mod pg;
pub mod session;
pub mod store;
pub mod stripe;
pub mod worker;

pub use gateway::{CheckoutGateway, CreatedCheckout, GatewayError};
pub use memory::MemoryPaymentSessionStore;
pub use pg::PgPaymentSessionStore;
pub use session::{PaymentSession, PaymentStatus};
pub use store::PaymentSessionStore;
pub use stripe::StripeGateway;
pub use worker::{ConfirmOutcome, PaymentConfirmationWorker, PaymentError};
