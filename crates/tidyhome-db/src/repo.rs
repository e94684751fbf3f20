//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use tidyhome_types::{PaymentStatus, SubscriptionStatus};

use crate::error::DbResult;
use crate::models::*;

/// Booking repository trait
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Find a booking by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BookingRow>>;

    /// Find a booking by its Stripe PaymentIntent ID
    async fn find_by_payment_intent(&self, payment_intent_id: &str)
        -> DbResult<Option<BookingRow>>;

    /// Attach a PaymentIntent to a booking
    async fn set_payment_intent(&self, id: Uuid, payment_intent_id: &str) -> DbResult<()>;

    /// Set the payment status, stamping the matching lifecycle timestamp
    async fn update_status(&self, id: Uuid, status: PaymentStatus, at: DateTime<Utc>)
        -> DbResult<()>;

    /// Bookings the auto-capture sweep should look at: client confirmed,
    /// auto-confirmed, or provider-completed before `provider_completed_before`
    async fn find_capture_candidates(
        &self,
        provider_completed_before: DateTime<Utc>,
    ) -> DbResult<Vec<BookingRow>>;
}

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find subscription by Stripe subscription ID
    async fn find_by_stripe_id(&self, stripe_id: &str) -> DbResult<Option<SubscriptionRow>>;

    /// Insert a subscription, or return the existing row for the Stripe ID.
    ///
    /// An existing row keeps its status; only subscription events move it.
    async fn insert_or_get(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow>;

    /// Update status; returns the number of rows touched
    async fn update_status(&self, stripe_id: &str, status: SubscriptionStatus) -> DbResult<u64>;

    /// Record a successful invoice payment
    async fn record_payment(
        &self,
        stripe_id: &str,
        paid_at: DateTime<Utc>,
        next_billing_date: Option<DateTime<Utc>>,
    ) -> DbResult<u64>;

    /// Overwrite status and billing date from Stripe's copy
    async fn sync(
        &self,
        stripe_id: &str,
        status: SubscriptionStatus,
        next_billing_date: Option<DateTime<Utc>>,
    ) -> DbResult<u64>;

    /// Mark cancelled
    async fn cancel(&self, stripe_id: &str, at: DateTime<Utc>) -> DbResult<u64>;
}

/// Create subscription input
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub customer_email: String,
    pub stripe_subscription_id: String,
    pub stripe_customer_id: Option<String>,
    pub frequency: String,
    pub duration_hours: f64,
    pub hourly_rate: f64,
    pub price_per_visit: f64,
    pub address: String,
    pub preferred_time: Option<String>,
    pub category_id: Option<String>,
    pub status: SubscriptionStatus,
}

/// Blog article repository trait
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// All published articles, newest first
    async fn list_published(&self) -> DbResult<Vec<ArticleRow>>;

    /// Find an article by slug
    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<ArticleRow>>;

    /// Insert or update keyed by slug
    async fn upsert(&self, article: UpsertArticle) -> DbResult<ArticleRow>;
}

/// Upsert article input
#[derive(Debug, Clone)]
pub struct UpsertArticle {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub tags: Vec<String>,
    pub published_at: DateTime<Utc>,
    pub read_time_minutes: Option<i32>,
}
