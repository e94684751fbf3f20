//! Apply verified Stripe events to local state
//!
//! Each event turns into at most one upsert or update. Events for rows we
//! do not know about are logged and acknowledged so Stripe stops retrying.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use tidyhome_db::CreateSubscription;
use tidyhome_types::{PaymentStatus, SubscriptionStatus};

use crate::webhook::{CheckoutSessionData, WebhookEvent, WebhookEventData, WebhookEventType, WebhookHandler};
use crate::{PaymentError, PaymentService};

impl PaymentService {
    /// Verify a raw Stripe delivery and reconcile it
    pub async fn process_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookEventType, PaymentError> {
        let secret = self
            .config
            .stripe_webhook_secret
            .as_deref()
            .ok_or(PaymentError::NotConfigured("STRIPE_WEBHOOK_SECRET"))?;

        let event = WebhookHandler::new(secret)
            .with_tolerance(self.config.webhook_tolerance_secs)
            .verify_and_parse(payload, signature)?;

        let event_type = event.event_type.clone();
        self.apply_event(event, Utc::now()).await?;
        Ok(event_type)
    }

    /// Reconcile an already verified event
    #[instrument(skip(self, event, now), fields(event_id = %event.id))]
    pub async fn apply_event(&self, event: WebhookEvent, now: DateTime<Utc>) -> Result<(), PaymentError> {
        match (event.event_type, event.data) {
            (WebhookEventType::CheckoutSessionCompleted, WebhookEventData::CheckoutSession(session)) => {
                self.on_checkout_completed(session).await
            }
            (WebhookEventType::CustomerSubscriptionUpdated, WebhookEventData::Subscription(sub)) => {
                let Some(status) = SubscriptionStatus::from_stripe(&sub.status) else {
                    debug!(status = %sub.status, "Ignoring unmapped subscription status");
                    return Ok(());
                };
                let updated = self
                    .subscriptions
                    .sync(&sub.subscription_id, status, sub.period_end)
                    .await?;
                log_touched(updated, "subscription", &sub.subscription_id);
                Ok(())
            }
            (WebhookEventType::CustomerSubscriptionDeleted, WebhookEventData::Subscription(sub)) => {
                let updated = self.subscriptions.cancel(&sub.subscription_id, now).await?;
                log_touched(updated, "subscription", &sub.subscription_id);
                Ok(())
            }
            (WebhookEventType::InvoicePaid, WebhookEventData::Invoice(inv)) => {
                let Some(sub_id) = inv.subscription_id else {
                    debug!(invoice_id = %inv.invoice_id, "Invoice without subscription");
                    return Ok(());
                };
                let updated = self
                    .subscriptions
                    .record_payment(&sub_id, now, inv.period_end)
                    .await?;
                log_touched(updated, "subscription", &sub_id);
                Ok(())
            }
            (WebhookEventType::InvoicePaymentFailed, WebhookEventData::Invoice(inv)) => {
                let Some(sub_id) = inv.subscription_id else {
                    return Ok(());
                };
                let updated = self
                    .subscriptions
                    .update_status(&sub_id, SubscriptionStatus::PastDue)
                    .await?;
                log_touched(updated, "subscription", &sub_id);
                Ok(())
            }
            (WebhookEventType::PaymentIntentCanceled, WebhookEventData::PaymentIntent(pi)) => {
                self.set_booking_status_by_intent(
                    &pi.payment_intent_id,
                    pi.booking_id.as_deref(),
                    PaymentStatus::Cancelled,
                    now,
                )
                .await
            }
            (WebhookEventType::ChargeRefunded, WebhookEventData::Charge(charge)) => {
                let Some(pi) = charge.payment_intent_id else {
                    return Ok(());
                };
                self.set_booking_status_by_intent(&pi, None, PaymentStatus::Refunded, now)
                    .await
            }
            (WebhookEventType::ChargeDisputeCreated, WebhookEventData::Charge(dispute)) => {
                let Some(pi) = dispute.payment_intent_id else {
                    return Ok(());
                };
                self.set_booking_status_by_intent(&pi, None, PaymentStatus::Disputed, now)
                    .await
            }
            (event_type, _) => {
                debug!(event_type = ?event_type, "Event acknowledged without action");
                Ok(())
            }
        }
    }

    async fn on_checkout_completed(&self, session: CheckoutSessionData) -> Result<(), PaymentError> {
        if session.mode == "subscription" {
            let Some(sub_id) = session.subscription_id.clone() else {
                warn!(session_id = %session.session_id, "Subscription checkout without subscription id");
                return Ok(());
            };
            let create = subscription_from_session(&session, sub_id)?;
            let row = self.subscriptions.insert_or_get(create).await?;
            info!(subscription_id = %row.stripe_subscription_id, "Subscription recorded");
            return Ok(());
        }

        let (Some(booking_id), Some(pi)) = (
            session.metadata.get("booking_id"),
            session.payment_intent_id.as_deref(),
        ) else {
            debug!(session_id = %session.session_id, "Payment checkout without booking");
            return Ok(());
        };
        let Ok(booking_id) = Uuid::parse_str(booking_id) else {
            warn!(booking_id = %booking_id, "Checkout metadata carries invalid booking id");
            return Ok(());
        };

        self.bookings.set_payment_intent(booking_id, pi).await?;
        info!(booking_id = %booking_id, payment_intent_id = %pi, "Checkout hold attached to booking");
        Ok(())
    }

    async fn set_booking_status_by_intent(
        &self,
        payment_intent_id: &str,
        booking_hint: Option<&str>,
        status: PaymentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), PaymentError> {
        let Some(booking) = self.find_booking_by_intent(payment_intent_id, booking_hint).await? else {
            warn!(payment_intent_id = %payment_intent_id, "No booking for payment intent");
            return Ok(());
        };

        // A late cancel notification must not undo a capture.
        if status == PaymentStatus::Cancelled && booking.payment_status == PaymentStatus::Captured {
            debug!(booking_id = %booking.id, "Ignoring cancel for captured booking");
            return Ok(());
        }
        if booking.payment_status == status {
            return Ok(());
        }

        self.bookings.update_status(booking.id.0, status, now).await?;
        info!(booking_id = %booking.id, status = %status, "Booking status reconciled");
        Ok(())
    }
}

fn subscription_from_session(
    session: &CheckoutSessionData,
    stripe_subscription_id: String,
) -> Result<CreateSubscription, PaymentError> {
    let meta = &session.metadata;
    let number = |key: &str| -> Result<f64, PaymentError> {
        meta.get(key)
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| PaymentError::WebhookError(format!("missing metadata: {key}")))
    };

    let frequency = meta
        .get("frequency")
        .ok_or_else(|| PaymentError::WebhookError("missing metadata: frequency".into()))?
        .clone();
    let customer_email = meta
        .get("customer_email")
        .cloned()
        .or_else(|| session.customer_email.clone())
        .unwrap_or_default();

    Ok(CreateSubscription {
        id: Uuid::new_v4(),
        user_id: meta.get("user_id").and_then(|v| Uuid::parse_str(v).ok()),
        customer_email,
        stripe_subscription_id,
        stripe_customer_id: session.customer_id.clone(),
        frequency,
        duration_hours: number("duration_hours")?,
        hourly_rate: number("hourly_rate")?,
        price_per_visit: number("price_per_visit")?,
        address: meta.get("address").cloned().unwrap_or_default(),
        preferred_time: meta.get("preferred_time").cloned(),
        category_id: meta.get("category_id").cloned(),
        status: SubscriptionStatus::Active,
    })
}

fn log_touched(updated: u64, kind: &'static str, id: &str) {
    if updated == 0 {
        warn!(kind, id = %id, "Webhook referenced unknown record");
    }
}
