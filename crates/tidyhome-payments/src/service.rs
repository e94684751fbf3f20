//! Payment service
//!
//! Booking-side operations: checkout, pre-authorization, completion
//! signals, capture and cancellation. Subscriptions, webhook reconciliation
//! and the auto-capture sweep extend this type from their own modules.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use tidyhome_db::{BookingRepository, SubscriptionRepository};
use tidyhome_types::{evaluate_capture, Booking, BookingId, CaptureDecision, CaptureReason, PaymentStatus};

use crate::provider::{CheckoutMode, CheckoutRequest, CheckoutSession, PaymentIntentRequest, PaymentProvider};
use crate::{PaymentConfig, PaymentError};

/// Payment service
pub struct PaymentService {
    pub(crate) provider: Arc<dyn PaymentProvider>,
    pub(crate) bookings: Arc<dyn BookingRepository>,
    pub(crate) subscriptions: Arc<dyn SubscriptionRepository>,
    pub(crate) config: PaymentConfig,
}

/// One-off checkout input
#[derive(Debug, Clone)]
pub struct BookingCheckout {
    pub booking_id: Option<BookingId>,
    pub amount_cents: i64,
    pub description: String,
    pub customer_email: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

/// Result of placing a hold
#[derive(Debug, Clone)]
pub struct Preauthorization {
    pub payment_intent_id: String,
    pub client_secret: Option<String>,
    pub amount_cents: i64,
}

/// Result of a capture
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub payment_intent_id: String,
    pub amount_cents: i64,
    pub reason: CaptureReason,
}

impl PaymentService {
    /// Create a new payment service
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        bookings: Arc<dyn BookingRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        config: PaymentConfig,
    ) -> Self {
        Self {
            provider,
            bookings,
            subscriptions,
            config,
        }
    }

    /// Service configuration
    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    pub(crate) async fn load_booking(&self, id: &BookingId) -> Result<Booking, PaymentError> {
        let row = self
            .bookings
            .find_by_id(id.0)
            .await?
            .ok_or(PaymentError::BookingNotFound)?;
        Ok(Booking::try_from(row)?)
    }

    /// Hosted checkout for a one-off cleaning; funds are held, not taken
    #[instrument(skip(self, checkout), fields(booking_id = ?checkout.booking_id))]
    pub async fn create_booking_checkout(
        &self,
        checkout: &BookingCheckout,
    ) -> Result<CheckoutSession, PaymentError> {
        if checkout.amount_cents <= 0 {
            return Err(PaymentError::InvalidInput("amount must be positive".into()));
        }

        let mut metadata = Vec::new();
        if let Some(id) = checkout.booking_id {
            // Ensure the booking exists before sending the customer to pay.
            self.load_booking(&id).await?;
            metadata.push(("booking_id".to_string(), id.to_string()));
        }

        let request = CheckoutRequest {
            mode: CheckoutMode::Payment,
            amount_cents: checkout.amount_cents,
            currency: self.config.currency.clone(),
            product_name: checkout.description.clone(),
            customer_email: checkout.customer_email.clone(),
            success_url: checkout
                .success_url
                .clone()
                .unwrap_or_else(|| self.config.default_success_url.clone()),
            cancel_url: checkout
                .cancel_url
                .clone()
                .unwrap_or_else(|| self.config.default_cancel_url.clone()),
            metadata,
        };

        let session = self.provider.create_checkout_session(&request).await?;
        metrics::counter!("payments_checkouts_created_total", "mode" => "payment").increment(1);
        Ok(session)
    }

    /// Place a manual-capture hold for the booking total
    #[instrument(skip(self), fields(booking_id = %booking_id))]
    pub async fn preauthorize(&self, booking_id: &BookingId) -> Result<Preauthorization, PaymentError> {
        let booking = self.load_booking(booking_id).await?;

        if booking.payment_status != PaymentStatus::Pending {
            return Err(PaymentError::InvalidState(format!(
                "booking is {}",
                booking.payment_status
            )));
        }
        if booking.total_amount_cents <= 0 {
            return Err(PaymentError::InvalidInput("booking total must be positive".into()));
        }

        if let Some(existing) = &booking.payment_intent_id {
            let intent = self.provider.retrieve_payment_intent(existing).await?;
            if intent.status != "canceled" {
                return Ok(Preauthorization {
                    payment_intent_id: intent.id,
                    client_secret: intent.client_secret,
                    amount_cents: intent.amount,
                });
            }
        }

        let request = PaymentIntentRequest {
            amount_cents: booking.total_amount_cents,
            currency: booking.currency.clone(),
            customer_email: Some(booking.customer_email.clone()),
            description: Some(format!("Cleaning on {}", booking.scheduled_at.format("%Y-%m-%d %H:%M"))),
            booking_id: booking.id.to_string(),
        };
        let intent = self.provider.create_payment_intent(&request).await?;
        self.bookings.set_payment_intent(booking.id.0, &intent.id).await?;

        info!(payment_intent_id = %intent.id, "Pre-authorization created");
        metrics::counter!("payments_preauthorizations_total").increment(1);

        Ok(Preauthorization {
            payment_intent_id: intent.id,
            client_secret: intent.client_secret,
            amount_cents: intent.amount,
        })
    }

    /// Provider marks the cleaning done
    #[instrument(skip(self, now), fields(booking_id = %booking_id))]
    pub async fn mark_provider_completed(
        &self,
        booking_id: &BookingId,
        now: DateTime<Utc>,
    ) -> Result<PaymentStatus, PaymentError> {
        let booking = self.load_booking(booking_id).await?;
        match booking.payment_status {
            PaymentStatus::Pending => {
                self.bookings
                    .update_status(booking.id.0, PaymentStatus::ProviderCompleted, now)
                    .await?;
                Ok(PaymentStatus::ProviderCompleted)
            }
            PaymentStatus::ProviderCompleted
            | PaymentStatus::ClientConfirmed
            | PaymentStatus::AutoConfirmed => Ok(booking.payment_status),
            other => Err(PaymentError::InvalidState(format!("booking is {other}"))),
        }
    }

    /// Client confirms the cleaning happened
    #[instrument(skip(self, now), fields(booking_id = %booking_id))]
    pub async fn confirm_by_client(
        &self,
        booking_id: &BookingId,
        now: DateTime<Utc>,
    ) -> Result<PaymentStatus, PaymentError> {
        let booking = self.load_booking(booking_id).await?;
        match booking.payment_status {
            PaymentStatus::Pending | PaymentStatus::ProviderCompleted => {
                self.bookings
                    .update_status(booking.id.0, PaymentStatus::ClientConfirmed, now)
                    .await?;
                Ok(PaymentStatus::ClientConfirmed)
            }
            PaymentStatus::ClientConfirmed | PaymentStatus::AutoConfirmed => Ok(booking.payment_status),
            other => Err(PaymentError::InvalidState(format!("booking is {other}"))),
        }
    }

    /// Evaluate the local capture rules for a booking
    pub async fn capture_eligibility(
        &self,
        booking_id: &BookingId,
        now: DateTime<Utc>,
    ) -> Result<CaptureDecision, PaymentError> {
        let booking = self.load_booking(booking_id).await?;
        Ok(evaluate_capture(
            booking.scheduled_at,
            booking.provider_completed(),
            booking.client_confirmed(),
            now,
        ))
    }

    /// Capture a booking's hold if the capture rules allow it
    #[instrument(skip(self, now), fields(booking_id = %booking_id))]
    pub async fn capture(
        &self,
        booking_id: &BookingId,
        now: DateTime<Utc>,
    ) -> Result<CaptureOutcome, PaymentError> {
        let booking = self.load_booking(booking_id).await?;

        if booking.payment_status.is_terminal() {
            return Err(PaymentError::InvalidState(format!(
                "booking is {}",
                booking.payment_status
            )));
        }
        let payment_intent_id = booking
            .payment_intent_id
            .clone()
            .ok_or(PaymentError::MissingPaymentIntent)?;

        let decision = evaluate_capture(
            booking.scheduled_at,
            booking.provider_completed(),
            booking.client_confirmed(),
            now,
        );
        if !decision.eligible {
            warn!(reason = %decision.reason, "Capture rejected");
            return Err(PaymentError::NotEligible(decision.reason));
        }

        if decision.reason == CaptureReason::AutoConfirmed {
            self.bookings
                .update_status(booking.id.0, PaymentStatus::AutoConfirmed, now)
                .await?;
        }

        let intent = self.provider.capture_payment_intent(&payment_intent_id).await?;
        self.bookings
            .update_status(booking.id.0, PaymentStatus::Captured, now)
            .await?;

        info!(payment_intent_id = %intent.id, amount = intent.amount, "Payment captured");
        metrics::counter!("payments_captured_total", "trigger" => "manual").increment(1);

        Ok(CaptureOutcome {
            payment_intent_id: intent.id,
            amount_cents: intent.amount,
            reason: decision.reason,
        })
    }

    /// Release a booking's hold
    #[instrument(skip(self, now), fields(booking_id = %booking_id))]
    pub async fn cancel(
        &self,
        booking_id: &BookingId,
        reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<String, PaymentError> {
        let booking = self.load_booking(booking_id).await?;

        if booking.payment_status.is_terminal() {
            return Err(PaymentError::InvalidState(format!(
                "booking is {}",
                booking.payment_status
            )));
        }
        let payment_intent_id = booking
            .payment_intent_id
            .ok_or(PaymentError::MissingPaymentIntent)?;

        let intent = self
            .provider
            .cancel_payment_intent(&payment_intent_id, reason)
            .await?;
        self.bookings
            .update_status(booking.id.0, PaymentStatus::Cancelled, now)
            .await?;

        info!(payment_intent_id = %intent.id, "Pre-authorization cancelled");
        metrics::counter!("payments_cancelled_total").increment(1);

        Ok(intent.id)
    }

    pub(crate) async fn find_booking_by_intent(
        &self,
        payment_intent_id: &str,
        booking_hint: Option<&str>,
    ) -> Result<Option<Booking>, PaymentError> {
        let row = match self.bookings.find_by_payment_intent(payment_intent_id).await? {
            Some(row) => Some(row),
            None => match booking_hint.and_then(|id| Uuid::parse_str(id).ok()) {
                // The hinted booking only counts while it has not moved on to
                // a different intent.
                Some(id) => self.bookings.find_by_id(id).await?.filter(|row| {
                    row.payment_intent_id
                        .as_deref()
                        .map_or(true, |current| current == payment_intent_id)
                }),
                None => None,
            },
        };
        row.map(Booking::try_from).transpose().map_err(PaymentError::from)
    }
}
