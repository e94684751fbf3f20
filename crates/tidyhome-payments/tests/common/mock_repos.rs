//! Mock repositories for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use tidyhome_db::{
    BookingRepository, BookingRow, CreateSubscription, DbResult, SubscriptionRepository,
    SubscriptionRow,
};
use tidyhome_types::{PaymentStatus, SubscriptionStatus};

/// In-memory booking repository for testing
#[derive(Default, Clone)]
pub struct MockBookingRepository {
    bookings: Arc<DashMap<Uuid, BookingRow>>,
}

impl MockBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test booking directly
    pub fn insert(&self, row: BookingRow) {
        self.bookings.insert(row.id, row);
    }

    /// Snapshot a booking
    pub fn get(&self, id: Uuid) -> Option<BookingRow> {
        self.bookings.get(&id).map(|r| r.value().clone())
    }

    /// Build a pending booking scheduled at `scheduled_at`
    pub fn booking(scheduled_at: DateTime<Utc>, payment_intent_id: Option<&str>) -> BookingRow {
        BookingRow {
            id: Uuid::new_v4(),
            user_id: None,
            category_id: Some("standard".to_string()),
            customer_email: "client@example.com".to_string(),
            address: "1 Main St".to_string(),
            scheduled_at,
            duration_hours: 3.0,
            hourly_rate: 45.0,
            total_amount_cents: 13_500,
            currency: "usd".to_string(),
            payment_status: "pending".to_string(),
            payment_intent_id: payment_intent_id.map(str::to_string),
            provider_completed_at: None,
            client_confirmed_at: None,
            captured_at: None,
            cancelled_at: None,
            created_at: scheduled_at,
            updated_at: scheduled_at,
        }
    }
}

#[async_trait]
impl BookingRepository for MockBookingRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<BookingRow>> {
        Ok(self.get(id))
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> DbResult<Option<BookingRow>> {
        Ok(self
            .bookings
            .iter()
            .find(|r| r.payment_intent_id.as_deref() == Some(payment_intent_id))
            .map(|r| r.value().clone()))
    }

    async fn set_payment_intent(&self, id: Uuid, payment_intent_id: &str) -> DbResult<()> {
        if let Some(mut row) = self.bookings.get_mut(&id) {
            row.payment_intent_id = Some(payment_intent_id.to_string());
        }
        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        if let Some(mut row) = self.bookings.get_mut(&id) {
            row.payment_status = status.as_str().to_string();
            row.updated_at = at;
            match status {
                PaymentStatus::ProviderCompleted => {
                    row.provider_completed_at.get_or_insert(at);
                }
                PaymentStatus::ClientConfirmed => {
                    row.client_confirmed_at.get_or_insert(at);
                }
                PaymentStatus::Captured => row.captured_at = Some(at),
                PaymentStatus::Cancelled => row.cancelled_at = Some(at),
                _ => {}
            }
        }
        Ok(())
    }

    async fn find_capture_candidates(
        &self,
        provider_completed_before: DateTime<Utc>,
    ) -> DbResult<Vec<BookingRow>> {
        let mut rows: Vec<BookingRow> = self
            .bookings
            .iter()
            .filter(|r| r.payment_intent_id.is_some())
            .filter(|r| match r.payment_status.as_str() {
                "client_confirmed" | "auto_confirmed" => true,
                "provider_completed" => r
                    .provider_completed_at
                    .is_some_and(|t| t < provider_completed_before),
                _ => false,
            })
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.scheduled_at);
        Ok(rows)
    }
}

/// In-memory subscription repository for testing
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subs: Arc<DashMap<String, SubscriptionRow>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stripe_id: &str) -> Option<SubscriptionRow> {
        self.subs.get(stripe_id).map(|r| r.value().clone())
    }

    /// Insert an active weekly subscription
    pub fn insert_active(&self, stripe_id: &str) {
        let now = Utc::now();
        self.subs.insert(
            stripe_id.to_string(),
            SubscriptionRow {
                id: Uuid::new_v4(),
                user_id: None,
                customer_email: "client@example.com".to_string(),
                stripe_subscription_id: stripe_id.to_string(),
                stripe_customer_id: Some("cus_1".to_string()),
                frequency: "weekly".to_string(),
                duration_hours: 3.0,
                hourly_rate: 45.0,
                price_per_visit: 121.5,
                address: "1 Main St".to_string(),
                preferred_time: None,
                category_id: None,
                status: "active".to_string(),
                next_billing_date: None,
                last_payment_at: None,
                cancelled_at: None,
                created_at: now,
                updated_at: now,
            },
        );
    }

    /// Overwrite the stored frequency text
    pub fn set_frequency(&self, stripe_id: &str, raw: &str) {
        self.touch(stripe_id, |row| row.frequency = raw.to_string());
    }

    fn touch(&self, stripe_id: &str, f: impl FnOnce(&mut SubscriptionRow)) -> u64 {
        match self.subs.get_mut(stripe_id) {
            Some(mut row) => {
                f(&mut *row);
                1
            }
            None => 0,
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_stripe_id(&self, stripe_id: &str) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.get(stripe_id))
    }

    async fn insert_or_get(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        if let Some(mut existing) = self.subs.get_mut(&sub.stripe_subscription_id) {
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let row = SubscriptionRow {
            id: sub.id,
            user_id: sub.user_id,
            customer_email: sub.customer_email,
            stripe_subscription_id: sub.stripe_subscription_id.clone(),
            stripe_customer_id: sub.stripe_customer_id,
            frequency: sub.frequency,
            duration_hours: sub.duration_hours,
            hourly_rate: sub.hourly_rate,
            price_per_visit: sub.price_per_visit,
            address: sub.address,
            preferred_time: sub.preferred_time,
            category_id: sub.category_id,
            status: sub.status.as_str().to_string(),
            next_billing_date: None,
            last_payment_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        self.subs.insert(sub.stripe_subscription_id, row.clone());
        Ok(row)
    }

    async fn update_status(&self, stripe_id: &str, status: SubscriptionStatus) -> DbResult<u64> {
        Ok(self.touch(stripe_id, |row| row.status = status.as_str().to_string()))
    }

    async fn record_payment(
        &self,
        stripe_id: &str,
        paid_at: DateTime<Utc>,
        next_billing_date: Option<DateTime<Utc>>,
    ) -> DbResult<u64> {
        Ok(self.touch(stripe_id, |row| {
            row.status = "active".to_string();
            row.last_payment_at = Some(paid_at);
            if next_billing_date.is_some() {
                row.next_billing_date = next_billing_date;
            }
        }))
    }

    async fn sync(
        &self,
        stripe_id: &str,
        status: SubscriptionStatus,
        next_billing_date: Option<DateTime<Utc>>,
    ) -> DbResult<u64> {
        Ok(self.touch(stripe_id, |row| {
            row.status = status.as_str().to_string();
            if next_billing_date.is_some() {
                row.next_billing_date = next_billing_date;
            }
        }))
    }

    async fn cancel(&self, stripe_id: &str, at: DateTime<Utc>) -> DbResult<u64> {
        Ok(self.touch(stripe_id, |row| {
            row.status = "cancelled".to_string();
            row.cancelled_at = Some(at);
        }))
    }
}
