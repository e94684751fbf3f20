//! Payment errors

use thiserror::Error;

use tidyhome_types::CaptureReason;

/// Payment errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// A required secret or setting is absent
    #[error("missing configuration: {0}")]
    NotConfigured(&'static str),

    /// Booking not found
    #[error("booking not found")]
    BookingNotFound,

    /// Subscription not found
    #[error("subscription not found")]
    SubscriptionNotFound,

    /// Booking has no pre-authorization attached
    #[error("booking has no payment intent")]
    MissingPaymentIntent,

    /// Capture rules reject the booking
    #[error("not eligible for capture: {0}")]
    NotEligible(CaptureReason),

    /// Operation not allowed from the current status
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Caller supplied bad input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Stripe rejected the request; message is Stripe's own
    #[error("{message}")]
    Stripe {
        /// HTTP status returned by Stripe
        status: u16,
        /// Stripe error message
        message: String,
    },

    /// Payment provider unreachable or returned garbage
    #[error("provider error: {0}")]
    ProviderError(String),

    /// Webhook verification or processing error
    #[error("webhook error: {0}")]
    WebhookError(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] tidyhome_db::DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BookingNotFound | Self::SubscriptionNotFound)
    }

    /// Errors caused by the caller rather than by us or Stripe's availability
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::MissingPaymentIntent
            | Self::NotEligible(_)
            | Self::InvalidState(_)
            | Self::InvalidInput(_)
            | Self::WebhookError(_) => true,
            Self::Stripe { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }
}
