//! Payment provider abstraction

use async_trait::async_trait;

use crate::stripe::{StripePaymentIntent, StripeSubscription};
use crate::PaymentError;

/// Parameters for a manual-capture PaymentIntent
#[derive(Debug, Clone)]
pub struct PaymentIntentRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub customer_email: Option<String>,
    pub description: Option<String>,
    /// Stored in metadata so webhooks can find the booking
    pub booking_id: String,
}

/// What a checkout session sells
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutMode {
    /// One-off payment held for later capture
    Payment,
    /// Recurring price billed every `interval_count` `interval`s
    Subscription {
        interval: &'static str,
        interval_count: u32,
    },
}

/// Parameters for a hosted checkout session
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub mode: CheckoutMode,
    pub amount_cents: i64,
    pub currency: String,
    pub product_name: String,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: Vec<(String, String)>,
}

/// Hosted checkout session handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

/// Payment provider trait
///
/// Abstracts payment processing so the service can run against Stripe or a
/// test double.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Place a hold (manual capture PaymentIntent)
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<StripePaymentIntent, PaymentError>;

    /// Fetch a PaymentIntent's live state
    async fn retrieve_payment_intent(&self, id: &str) -> Result<StripePaymentIntent, PaymentError>;

    /// Capture a held PaymentIntent
    async fn capture_payment_intent(&self, id: &str) -> Result<StripePaymentIntent, PaymentError>;

    /// Release a held PaymentIntent
    async fn cancel_payment_intent(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<StripePaymentIntent, PaymentError>;

    /// Fetch a subscription
    async fn retrieve_subscription(&self, id: &str) -> Result<StripeSubscription, PaymentError>;

    /// Cancel a subscription immediately
    async fn cancel_subscription(&self, id: &str) -> Result<StripeSubscription, PaymentError>;
}
