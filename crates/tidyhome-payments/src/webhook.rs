//! Stripe webhook handling

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, error, info, instrument, warn};

use crate::error::PaymentError;
use crate::stripe::StripeSubscription;

/// Webhook event types we handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    /// Checkout session completed
    CheckoutSessionCompleted,
    /// Customer subscription updated
    CustomerSubscriptionUpdated,
    /// Customer subscription deleted
    CustomerSubscriptionDeleted,
    /// Invoice paid
    InvoicePaid,
    /// Invoice payment failed
    InvoicePaymentFailed,
    /// Hold released or expired
    PaymentIntentCanceled,
    /// Charge refunded
    ChargeRefunded,
    /// Dispute opened
    ChargeDisputeCreated,
    /// Unknown event type
    Unknown(String),
}

impl From<&str> for WebhookEventType {
    fn from(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            "invoice.paid" => Self::InvoicePaid,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            "payment_intent.canceled" => Self::PaymentIntentCanceled,
            "charge.refunded" => Self::ChargeRefunded,
            "charge.dispute.created" => Self::ChargeDisputeCreated,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl WebhookEventType {
    /// Stripe's name for the event
    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::InvoicePaid => "invoice.paid",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::PaymentIntentCanceled => "payment_intent.canceled",
            Self::ChargeRefunded => "charge.refunded",
            Self::ChargeDisputeCreated => "charge.dispute.created",
            Self::Unknown(other) => other,
        }
    }
}

/// Parsed webhook event
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    /// Event ID
    pub id: String,
    /// Event type
    pub event_type: WebhookEventType,
    /// Event data
    pub data: WebhookEventData,
    /// When the event was created (Unix timestamp)
    pub created: i64,
}

/// Webhook event data
#[derive(Debug, Clone)]
pub enum WebhookEventData {
    /// Checkout session data
    CheckoutSession(CheckoutSessionData),
    /// Subscription data
    Subscription(SubscriptionData),
    /// Invoice data
    Invoice(InvoiceData),
    /// PaymentIntent data
    PaymentIntent(PaymentIntentData),
    /// Charge or dispute data
    Charge(ChargeData),
    /// Raw JSON for unknown events
    Raw(serde_json::Value),
}

/// Checkout session completed data
#[derive(Debug, Clone)]
pub struct CheckoutSessionData {
    /// Session ID
    pub session_id: String,
    /// `payment` or `subscription`
    pub mode: String,
    /// Customer ID
    pub customer_id: Option<String>,
    /// Email collected by checkout
    pub customer_email: Option<String>,
    /// Subscription ID
    pub subscription_id: Option<String>,
    /// PaymentIntent ID (payment mode)
    pub payment_intent_id: Option<String>,
    /// Session metadata
    pub metadata: HashMap<String, String>,
}

/// Subscription event data
#[derive(Debug, Clone)]
pub struct SubscriptionData {
    /// Subscription ID
    pub subscription_id: String,
    /// Customer ID
    pub customer_id: String,
    /// Stripe status string
    pub status: String,
    /// Current period end
    pub period_end: Option<DateTime<Utc>>,
    /// Whether it cancels at period end
    pub cancel_at_period_end: bool,
}

/// Invoice event data
#[derive(Debug, Clone)]
pub struct InvoiceData {
    /// Invoice ID
    pub invoice_id: String,
    /// Subscription ID
    pub subscription_id: Option<String>,
    /// Amount paid in cents
    pub amount_cents: i64,
    /// End of the period the invoice bills for
    pub period_end: Option<DateTime<Utc>>,
}

/// PaymentIntent event data
#[derive(Debug, Clone)]
pub struct PaymentIntentData {
    /// PaymentIntent ID
    pub payment_intent_id: String,
    /// Stripe status string
    pub status: String,
    /// Booking ID from metadata
    pub booking_id: Option<String>,
}

/// Charge / dispute event data
#[derive(Debug, Clone)]
pub struct ChargeData {
    /// Charge or dispute ID
    pub object_id: String,
    /// PaymentIntent the charge belongs to
    pub payment_intent_id: Option<String>,
}

/// Webhook handler for processing Stripe events
#[derive(Clone)]
pub struct WebhookHandler {
    webhook_secret: String,
    tolerance_secs: i64,
}

impl WebhookHandler {
    /// Create a new webhook handler
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            tolerance_secs: 300,
        }
    }

    /// Override the timestamp tolerance
    pub fn with_tolerance(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Verify and parse a webhook payload
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        self.verify_and_parse_at(payload, signature, Utc::now())
    }

    /// Verify and parse against an explicit clock
    #[instrument(skip(self, payload, signature, now))]
    pub fn verify_and_parse_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<WebhookEvent, PaymentError> {
        self.verify_signature(payload, signature, now)?;

        let raw_event: RawStripeEvent = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::WebhookError(format!("parse: {e}")))?;

        debug!(event_id = %raw_event.id, event_type = %raw_event.event_type, "Parsed webhook event");

        let event_type = WebhookEventType::from(raw_event.event_type.as_str());
        let data = Self::parse_event_data(&event_type, raw_event.data.object)?;

        Ok(WebhookEvent {
            id: raw_event.id,
            event_type,
            data,
            created: raw_event.created,
        })
    }

    /// Verify Stripe webhook signature
    fn verify_signature(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PaymentError> {
        // Header format: t=timestamp,v1=signature[,v1=...]
        let mut timestamp: Option<&str> = None;
        let mut candidates: Vec<&str> = Vec::new();

        for part in signature.split(',') {
            if let Some((key, value)) = part.trim().split_once('=') {
                match key {
                    "t" => timestamp = Some(value),
                    "v1" => candidates.push(value),
                    _ => {}
                }
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            warn!("Missing timestamp in webhook signature");
            PaymentError::WebhookError("Missing timestamp".to_string())
        })?;

        if candidates.is_empty() {
            warn!("Missing v1 signature in webhook signature");
            return Err(PaymentError::WebhookError("Missing signature".to_string()));
        }

        let mut mac = Hmac::<Sha256>::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| PaymentError::Internal("HMAC error".to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        let matched = candidates
            .iter()
            .any(|sig| bool::from(sig.as_bytes().ct_eq(expected.as_bytes())));
        if !matched {
            error!("Webhook signature verification failed");
            return Err(PaymentError::WebhookError(
                "Signature verification failed".to_string(),
            ));
        }

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| PaymentError::WebhookError("Invalid timestamp format".to_string()))?;
        let now = now.timestamp();
        if (now - ts).abs() > self.tolerance_secs {
            warn!(timestamp = ts, now = now, "Webhook timestamp outside tolerance");
            return Err(PaymentError::WebhookError("Timestamp too old".to_string()));
        }

        Ok(())
    }

    /// Parse event data based on type
    fn parse_event_data(
        event_type: &WebhookEventType,
        object: serde_json::Value,
    ) -> Result<WebhookEventData, PaymentError> {
        fn decode<T: for<'de> Deserialize<'de>>(
            object: serde_json::Value,
        ) -> Result<T, PaymentError> {
            serde_json::from_value(object).map_err(|e| PaymentError::WebhookError(format!("parse: {e}")))
        }

        match event_type {
            WebhookEventType::CheckoutSessionCompleted => {
                let session: RawCheckoutSession = decode(object)?;
                let customer_email = session
                    .customer_email
                    .or(session.customer_details.and_then(|d| d.email));
                Ok(WebhookEventData::CheckoutSession(CheckoutSessionData {
                    session_id: session.id,
                    mode: session.mode.unwrap_or_else(|| "payment".to_string()),
                    customer_id: session.customer,
                    customer_email,
                    subscription_id: session.subscription,
                    payment_intent_id: session.payment_intent,
                    metadata: session.metadata,
                }))
            }
            WebhookEventType::CustomerSubscriptionUpdated
            | WebhookEventType::CustomerSubscriptionDeleted => {
                let sub: StripeSubscription = decode(object)?;
                Ok(WebhookEventData::Subscription(SubscriptionData {
                    subscription_id: sub.id,
                    customer_id: sub.customer,
                    status: sub.status,
                    period_end: sub.current_period_end.and_then(from_unix),
                    cancel_at_period_end: sub.cancel_at_period_end,
                }))
            }
            WebhookEventType::InvoicePaid | WebhookEventType::InvoicePaymentFailed => {
                let inv: RawInvoice = decode(object)?;
                // Line periods describe the upcoming service period; the
                // invoice-level period is the one just closed.
                let period_end = inv
                    .lines
                    .and_then(|l| l.data.into_iter().next())
                    .and_then(|line| line.period)
                    .map(|p| p.end)
                    .or(inv.period_end)
                    .and_then(from_unix);
                Ok(WebhookEventData::Invoice(InvoiceData {
                    invoice_id: inv.id,
                    subscription_id: inv.subscription,
                    amount_cents: inv.amount_paid,
                    period_end,
                }))
            }
            WebhookEventType::PaymentIntentCanceled => {
                let pi: RawPaymentIntent = decode(object)?;
                Ok(WebhookEventData::PaymentIntent(PaymentIntentData {
                    booking_id: pi.metadata.get("booking_id").cloned(),
                    payment_intent_id: pi.id,
                    status: pi.status,
                }))
            }
            WebhookEventType::ChargeRefunded | WebhookEventType::ChargeDisputeCreated => {
                let charge: RawCharge = decode(object)?;
                Ok(WebhookEventData::Charge(ChargeData {
                    object_id: charge.id,
                    payment_intent_id: charge.payment_intent,
                }))
            }
            WebhookEventType::Unknown(_) => {
                info!("Received unknown webhook event type");
                Ok(WebhookEventData::Raw(object))
            }
        }
    }
}

fn from_unix(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}

// Raw Stripe event for parsing
#[derive(Debug, Deserialize)]
struct RawStripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
    created: i64,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawCheckoutSession {
    id: String,
    mode: Option<String>,
    customer: Option<String>,
    customer_email: Option<String>,
    customer_details: Option<RawCustomerDetails>,
    subscription: Option<String>,
    payment_intent: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawCustomerDetails {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInvoice {
    id: String,
    subscription: Option<String>,
    #[serde(default)]
    amount_paid: i64,
    period_end: Option<i64>,
    lines: Option<RawInvoiceLines>,
}

#[derive(Debug, Deserialize)]
struct RawInvoiceLines {
    data: Vec<RawInvoiceLine>,
}

#[derive(Debug, Deserialize)]
struct RawInvoiceLine {
    period: Option<RawPeriod>,
}

#[derive(Debug, Deserialize)]
struct RawPeriod {
    end: i64,
}

#[derive(Debug, Deserialize)]
struct RawPaymentIntent {
    id: String,
    status: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawCharge {
    id: String,
    payment_intent: Option<String>,
}
