//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tidyhome_types::SubscriptionStatus;

use crate::error::DbResult;
use crate::models::SubscriptionRow;
use crate::repo::{CreateSubscription, SubscriptionRepository};

const SUBSCRIPTION_COLUMNS: &str = r#"
    id, user_id, customer_email, stripe_subscription_id, stripe_customer_id,
    frequency, duration_hours, hourly_rate, price_per_visit, address,
    preferred_time, category_id, status, next_billing_date, last_payment_at,
    cancelled_at, created_at, updated_at
"#;

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_stripe_id(&self, stripe_id: &str) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE stripe_subscription_id = $1"
        ))
        .bind(stripe_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn insert_or_get(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            INSERT INTO subscriptions (id, user_id, customer_email, stripe_subscription_id,
                                       stripe_customer_id, frequency, duration_hours,
                                       hourly_rate, price_per_visit, address, preferred_time,
                                       category_id, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (stripe_subscription_id)
            DO UPDATE SET updated_at = NOW()
            RETURNING {SUBSCRIPTION_COLUMNS}
            "#
        ))
        .bind(sub.id)
        .bind(sub.user_id)
        .bind(&sub.customer_email)
        .bind(&sub.stripe_subscription_id)
        .bind(&sub.stripe_customer_id)
        .bind(&sub.frequency)
        .bind(sub.duration_hours)
        .bind(sub.hourly_rate)
        .bind(sub.price_per_visit)
        .bind(&sub.address)
        .bind(&sub.preferred_time)
        .bind(&sub.category_id)
        .bind(sub.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_status(&self, stripe_id: &str, status: SubscriptionStatus) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE subscriptions SET status = $1, updated_at = NOW() WHERE stripe_subscription_id = $2",
        )
        .bind(status.as_str())
        .bind(stripe_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn record_payment(
        &self,
        stripe_id: &str,
        paid_at: DateTime<Utc>,
        next_billing_date: Option<DateTime<Utc>>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'active',
                last_payment_at = $1,
                next_billing_date = COALESCE($2, next_billing_date),
                updated_at = NOW()
            WHERE stripe_subscription_id = $3
            "#,
        )
        .bind(paid_at)
        .bind(next_billing_date)
        .bind(stripe_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn sync(
        &self,
        stripe_id: &str,
        status: SubscriptionStatus,
        next_billing_date: Option<DateTime<Utc>>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $1,
                next_billing_date = COALESCE($2, next_billing_date),
                cancelled_at = CASE WHEN $1 = 'cancelled'
                    THEN COALESCE(cancelled_at, NOW()) ELSE cancelled_at END,
                updated_at = NOW()
            WHERE stripe_subscription_id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(next_billing_date)
        .bind(stripe_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn cancel(&self, stripe_id: &str, at: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = 'cancelled', cancelled_at = $1, updated_at = NOW()
            WHERE stripe_subscription_id = $2
            "#,
        )
        .bind(at)
        .bind(stripe_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
