//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use tidyhome_types::{
    BlogArticle, BlogCategory, Booking, BookingId, Subscription, SubscriptionId,
};

use crate::DbError;

/// Booking row from the database
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub category_id: Option<String>,
    pub customer_email: String,
    pub address: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_hours: f64,
    pub hourly_rate: f64,
    pub total_amount_cents: i64,
    pub currency: String,
    pub payment_status: String,
    pub payment_intent_id: Option<String>,
    pub provider_completed_at: Option<DateTime<Utc>>,
    pub client_confirmed_at: Option<DateTime<Utc>>,
    pub captured_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
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
    pub status: String,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Blog article row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    pub id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Conversion implementations from Row types to tidyhome-types domain types

impl TryFrom<BookingRow> for Booking {
    type Error = DbError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let payment_status = row
            .payment_status
            .parse()
            .map_err(|e| DbError::Decode(format!("{e}")))?;

        Ok(Self {
            id: BookingId(row.id),
            user_id: row.user_id,
            category_id: row.category_id,
            customer_email: row.customer_email,
            address: row.address,
            scheduled_at: row.scheduled_at,
            duration_hours: row.duration_hours,
            hourly_rate: row.hourly_rate,
            total_amount_cents: row.total_amount_cents,
            currency: row.currency,
            payment_status,
            payment_intent_id: row.payment_intent_id,
            provider_completed_at: row.provider_completed_at,
            client_confirmed_at: row.client_confirmed_at,
            captured_at: row.captured_at,
            cancelled_at: row.cancelled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DbError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let frequency = row
            .frequency
            .parse()
            .map_err(|e| DbError::Decode(format!("{e}")))?;
        let status = row
            .status
            .parse()
            .map_err(|e| DbError::Decode(format!("{e}")))?;

        Ok(Self {
            id: SubscriptionId(row.id),
            user_id: row.user_id,
            customer_email: row.customer_email,
            stripe_subscription_id: row.stripe_subscription_id,
            stripe_customer_id: row.stripe_customer_id,
            frequency,
            duration_hours: row.duration_hours,
            hourly_rate: row.hourly_rate,
            price_per_visit: row.price_per_visit,
            address: row.address,
            preferred_time: row.preferred_time,
            category_id: row.category_id,
            status,
            next_billing_date: row.next_billing_date,
            last_payment_at: row.last_payment_at,
            cancelled_at: row.cancelled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<ArticleRow> for BlogArticle {
    fn from(row: ArticleRow) -> Self {
        let category = match (row.category_id, row.category_name) {
            (Some(id), Some(name)) => Some(BlogCategory {
                slug: row.category_slug.unwrap_or_else(|| id.clone()),
                id,
                name,
            }),
            _ => None,
        };

        Self {
            slug: row.slug,
            title: row.title,
            excerpt: row.excerpt,
            content: row.content,
            author: row.author,
            image_url: row.image_url,
            category,
            tags: row.tags,
            published_at: row.published_at,
            read_time_minutes: row.read_time_minutes,
        }
    }
}
