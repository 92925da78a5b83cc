//! Payment session state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a checkout session at the external processor.
///
/// `Pending` is the only non-terminal state; the store refuses transitions
/// out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// The processor has not settled the session.
    Pending,
    /// The payment landed.
    Paid,
    /// The session lapsed before payment.
    Expired,
    /// The processor reported a failed payment.
    Failed,
}

impl PaymentStatus {
    /// Whether no further transition can occur.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Stable text form used in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Expired => "expired",
            Self::Failed => "failed",
        }
    }

    /// Parses the storage text form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "expired" => Some(Self::Expired),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// A recorded checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    /// Processor-issued session identifier.
    pub id: String,
    /// The user who initiated checkout.
    pub user_id: Uuid,
    /// Last observed status.
    pub status: PaymentStatus,
    /// When the session was recorded.
    pub created_at: DateTime<Utc>,
}

impl PaymentSession {
    /// A freshly recorded, pending session.
    #[must_use]
    pub fn new(id: String, user_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            status: PaymentStatus::Pending,
            created_at,
        }
    }
}
