//! Recurring cleaning subscription types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TypeError;

/// Unique subscription identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

/// How often a recurring cleaning happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    /// Discount applied to the per-visit price, in percent
    pub const fn discount_percent(&self) -> u32 {
        match self {
            Self::Weekly => 10,
            Self::Biweekly => 5,
            Self::Monthly => 0,
        }
    }

    /// Stripe recurring interval and interval count
    pub const fn billing_interval(&self) -> (&'static str, u32) {
        match self {
            Self::Weekly => ("week", 1),
            Self::Biweekly => ("week", 2),
            Self::Monthly => ("month", 1),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Frequency {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" | "bi-weekly" | "fortnightly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(TypeError::InvalidFrequency(s.to_string())),
        }
    }
}

/// Per-visit price for a recurring cleaning, rounded to cents.
pub fn calculate_visit_price(
    hourly_rate: f64,
    duration_hours: f64,
    frequency: Frequency,
) -> Result<f64, TypeError> {
    if !hourly_rate.is_finite() || hourly_rate <= 0.0 {
        return Err(TypeError::InvalidPricing("hourly rate must be positive"));
    }
    if !duration_hours.is_finite() || duration_hours <= 0.0 {
        return Err(TypeError::InvalidPricing("duration must be positive"));
    }

    let multiplier = 1.0 - f64::from(frequency.discount_percent()) / 100.0;
    Ok(round_cents(hourly_rate * duration_hours * multiplier))
}

/// Round a currency amount to two decimals
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Convert a currency amount to integer minor units
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Subscription status mirrored from Stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
}

impl SubscriptionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Cancelled => "cancelled",
        }
    }

    /// Map a Stripe subscription status onto the local status set
    pub fn from_stripe(status: &str) -> Option<Self> {
        match status {
            "active" | "trialing" => Some(Self::Active),
            "past_due" | "unpaid" | "incomplete" => Some(Self::PastDue),
            "canceled" | "incomplete_expired" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "past_due" => Ok(Self::PastDue),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(TypeError::InvalidSubscriptionStatus(other.to_string())),
        }
    }
}

/// A recurring cleaning plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: Option<Uuid>,
    pub customer_email: String,
    pub stripe_subscription_id: String,
    pub stripe_customer_id: Option<String>,
    pub frequency: Frequency,
    pub duration_hours: f64,
    pub hourly_rate: f64,
    pub price_per_visit: f64,
    pub address: String,
    pub preferred_time: Option<String>,
    pub category_id: Option<String>,
    pub status: SubscriptionStatus,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
