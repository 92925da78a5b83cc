//! Crowlands Entitlement — quota and subscription-tier bookkeeping.
//!
//! The ledger answers one question before every generation: may this user
//! consume one more unit this period? Reservation is linearizable per user;
//! the check-and-increment is a single pure state transition applied under a
//! per-user lock (Postgres row lock in production, mutex in memory).

pub mod domain;
pub mod ledger;
pub mod memory;
pub mod pg;

pub use domain::{
    EntitlementState, EntitlementStatus, QuotaPolicy, ReserveDecision, SubscriptionTier,
};
pub use ledger::{EntitlementLedger, EntitlementStore};
pub use memory::MemoryEntitlementStore;
pub use pg::PgEntitlementStore;
