//! Recurring cleaning subscriptions

use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, instrument, warn};

use tidyhome_types::{
    calculate_visit_price, to_minor_units, Frequency, Subscription, SubscriptionStatus,
};

use crate::provider::{CheckoutMode, CheckoutRequest, CheckoutSession};
use crate::{PaymentError, PaymentService};

/// Subscription checkout input
#[derive(Debug, Clone)]
pub struct SubscriptionCheckout {
    pub user_id: Option<String>,
    pub customer_email: String,
    pub frequency: Frequency,
    pub duration_hours: f64,
    pub hourly_rate: f64,
    pub address: String,
    pub preferred_time: Option<String>,
    pub category_id: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

impl PaymentService {
    /// Start a hosted checkout for a recurring cleaning.
    ///
    /// The subscription row is written by the `checkout.session.completed`
    /// webhook from the metadata attached here.
    #[instrument(skip(self, checkout), fields(frequency = %checkout.frequency))]
    pub async fn create_subscription_checkout(
        &self,
        checkout: &SubscriptionCheckout,
    ) -> Result<(CheckoutSession, f64), PaymentError> {
        if checkout.customer_email.trim().is_empty() {
            return Err(PaymentError::InvalidInput("customer email is required".into()));
        }
        if checkout.address.trim().is_empty() {
            return Err(PaymentError::InvalidInput("address is required".into()));
        }

        let price = calculate_visit_price(
            checkout.hourly_rate,
            checkout.duration_hours,
            checkout.frequency,
        )
        .map_err(|e| PaymentError::InvalidInput(e.to_string()))?;
        let (interval, interval_count) = checkout.frequency.billing_interval();

        let mut metadata = vec![
            ("frequency".to_string(), checkout.frequency.to_string()),
            ("duration_hours".to_string(), checkout.duration_hours.to_string()),
            ("hourly_rate".to_string(), checkout.hourly_rate.to_string()),
            ("price_per_visit".to_string(), price.to_string()),
            ("address".to_string(), checkout.address.clone()),
            ("customer_email".to_string(), checkout.customer_email.clone()),
        ];
        if let Some(user_id) = &checkout.user_id {
            metadata.push(("user_id".to_string(), user_id.clone()));
        }
        if let Some(time) = &checkout.preferred_time {
            metadata.push(("preferred_time".to_string(), time.clone()));
        }
        if let Some(category) = &checkout.category_id {
            metadata.push(("category_id".to_string(), category.clone()));
        }

        let request = CheckoutRequest {
            mode: CheckoutMode::Subscription {
                interval,
                interval_count,
            },
            amount_cents: to_minor_units(price),
            currency: self.config.currency.clone(),
            product_name: format!(
                "{} home cleaning ({}h)",
                capitalize(checkout.frequency.as_str()),
                checkout.duration_hours
            ),
            customer_email: Some(checkout.customer_email.clone()),
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
        metrics::counter!("payments_checkouts_created_total", "mode" => "subscription")
            .increment(1);

        Ok((session, price))
    }

    /// Cancel a subscription at Stripe and locally
    #[instrument(skip(self, now))]
    pub async fn cancel_subscription(
        &self,
        stripe_subscription_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Subscription, PaymentError> {
        let mut subscription = self.load_subscription(stripe_subscription_id).await?;
        if subscription.status == SubscriptionStatus::Cancelled {
            return Ok(subscription);
        }

        self.provider
            .cancel_subscription(stripe_subscription_id)
            .await?;
        self.subscriptions.cancel(stripe_subscription_id, now).await?;

        subscription.status = SubscriptionStatus::Cancelled;
        subscription.cancelled_at = Some(now);
        subscription.updated_at = now;

        info!("Subscription cancelled");
        metrics::counter!("payments_subscriptions_cancelled_total").increment(1);
        Ok(subscription)
    }

    /// Pull a subscription's state from Stripe into the database
    #[instrument(skip(self))]
    pub async fn sync_subscription(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        let remote = self
            .provider
            .retrieve_subscription(stripe_subscription_id)
            .await?;

        let status = SubscriptionStatus::from_stripe(&remote.status).ok_or_else(|| {
            warn!(status = %remote.status, "Unmapped Stripe subscription status");
            PaymentError::InvalidState(format!("unsupported subscription status: {}", remote.status))
        })?;
        let next_billing_date = remote
            .current_period_end
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single());

        let updated = self
            .subscriptions
            .sync(stripe_subscription_id, status, next_billing_date)
            .await?;
        if updated == 0 {
            return Err(PaymentError::SubscriptionNotFound);
        }

        info!(status = %status, "Subscription synced");
        self.load_subscription(stripe_subscription_id).await
    }

    /// Stored subscription, decoded into the domain type
    async fn load_subscription(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Subscription, PaymentError> {
        let row = self
            .subscriptions
            .find_by_stripe_id(stripe_subscription_id)
            .await?
            .ok_or(PaymentError::SubscriptionNotFound)?;
        Ok(Subscription::try_from(row)?)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
