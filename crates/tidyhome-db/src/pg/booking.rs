//! PostgreSQL booking repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tidyhome_types::PaymentStatus;

use crate::error::DbResult;
use crate::models::BookingRow;
use crate::repo::BookingRepository;

const BOOKING_COLUMNS: &str = r#"
    id, user_id, category_id, customer_email, address, scheduled_at,
    duration_hours, hourly_rate, total_amount_cents, currency, payment_status,
    payment_intent_id, provider_completed_at, client_confirmed_at, captured_at,
    cancelled_at, created_at, updated_at
"#;

/// PostgreSQL booking repository
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Create a new booking repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BookingRow>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> DbResult<Option<BookingRow>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE payment_intent_id = $1"
        ))
        .bind(payment_intent_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn set_payment_intent(&self, id: Uuid, payment_intent_id: &str) -> DbResult<()> {
        sqlx::query("UPDATE bookings SET payment_intent_id = $1, updated_at = NOW() WHERE id = $2")
            .bind(payment_intent_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET payment_status = $1,
                updated_at = $2,
                provider_completed_at = CASE WHEN $1 = 'provider_completed'
                    THEN COALESCE(provider_completed_at, $2) ELSE provider_completed_at END,
                client_confirmed_at = CASE WHEN $1 = 'client_confirmed'
                    THEN COALESCE(client_confirmed_at, $2) ELSE client_confirmed_at END,
                captured_at = CASE WHEN $1 = 'captured' THEN $2 ELSE captured_at END,
                cancelled_at = CASE WHEN $1 = 'cancelled' THEN $2 ELSE cancelled_at END
            WHERE id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_capture_candidates(
        &self,
        provider_completed_before: DateTime<Utc>,
    ) -> DbResult<Vec<BookingRow>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE payment_intent_id IS NOT NULL
              AND (payment_status IN ('client_confirmed', 'auto_confirmed')
                   OR (payment_status = 'provider_completed'
                       AND provider_completed_at < $1))
            ORDER BY scheduled_at ASC
            "#
        ))
        .bind(provider_completed_before)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
