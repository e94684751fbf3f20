//! Tidyhome Payments - Stripe payment lifecycle
//!
//! Pre-authorization holds for one-off cleanings, capture and cancellation,
//! recurring subscriptions, Stripe webhook reconciliation and the scheduled
//! auto-capture sweep.
//!
//! # Example
//!
//! ```rust,ignore
//! use tidyhome_payments::{PaymentConfig, PaymentService, StripeProvider};
//!
//! let config = PaymentConfig::new("sk_test_...").with_webhook_secret("whsec_...");
//! let provider = Arc::new(StripeProvider::new(config.clone()));
//! let payments = PaymentService::new(provider, bookings, subscriptions, config);
//!
//! let hold = payments.preauthorize(&booking_id).await?;
//! let report = payments.run_auto_capture(Utc::now()).await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod reconcile;
pub mod service;
pub mod stripe;
pub mod subscriptions;
pub mod sweep;
pub mod webhook;

pub use config::PaymentConfig;
pub use error::PaymentError;
pub use provider::{CheckoutMode, CheckoutRequest, CheckoutSession, PaymentIntentRequest, PaymentProvider};
pub use service::{BookingCheckout, CaptureOutcome, PaymentService, Preauthorization};
pub use stripe::{StripePaymentIntent, StripeProvider, StripeSubscription};
pub use subscriptions::SubscriptionCheckout;
pub use sweep::{SweepAction, SweepItem, SweepReport};
pub use webhook::{WebhookEvent, WebhookEventData, WebhookEventType, WebhookHandler};
