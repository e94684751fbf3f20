//! Booking types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TypeError;

/// Unique booking identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub Uuid);

impl BookingId {
    /// Parse from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Payment status of a booking.
///
/// `pending` covers both "no hold yet" and "hold placed, service not done".
/// Transitions are driven by the provider, the client, the auto-capture
/// sweep and Stripe webhooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    ProviderCompleted,
    ClientConfirmed,
    AutoConfirmed,
    Captured,
    Cancelled,
    Refunded,
    Disputed,
}

impl PaymentStatus {
    /// Database / wire representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ProviderCompleted => "provider_completed",
            Self::ClientConfirmed => "client_confirmed",
            Self::AutoConfirmed => "auto_confirmed",
            Self::Captured => "captured",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Disputed => "disputed",
        }
    }

    /// No further capture or cancel is possible from this status
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Captured | Self::Cancelled | Self::Refunded | Self::Disputed
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "provider_completed" => Ok(Self::ProviderCompleted),
            "client_confirmed" => Ok(Self::ClientConfirmed),
            "auto_confirmed" => Ok(Self::AutoConfirmed),
            "captured" => Ok(Self::Captured),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            "disputed" => Ok(Self::Disputed),
            other => Err(TypeError::InvalidPaymentStatus(other.to_string())),
        }
    }
}

/// A scheduled cleaning visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: Option<Uuid>,
    pub category_id: Option<String>,
    pub customer_email: String,
    pub address: String,
    /// When the cleaning is scheduled to start
    pub scheduled_at: DateTime<Utc>,
    pub duration_hours: f64,
    pub hourly_rate: f64,
    pub total_amount_cents: i64,
    pub currency: String,
    pub payment_status: PaymentStatus,
    /// Stripe PaymentIntent holding the pre-authorization
    pub payment_intent_id: Option<String>,
    pub provider_completed_at: Option<DateTime<Utc>>,
    pub client_confirmed_at: Option<DateTime<Utc>>,
    pub captured_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Provider has marked the job done (or a later status implies it)
    pub fn provider_completed(&self) -> bool {
        self.provider_completed_at.is_some()
            || matches!(
                self.payment_status,
                PaymentStatus::ProviderCompleted
                    | PaymentStatus::ClientConfirmed
                    | PaymentStatus::AutoConfirmed
            )
    }

    /// Client has confirmed the job
    pub fn client_confirmed(&self) -> bool {
        self.client_confirmed_at.is_some()
            || self.payment_status == PaymentStatus::ClientConfirmed
    }
}
