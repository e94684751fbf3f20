//! Recurring cleaning subscription handlers

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tidyhome_payments::SubscriptionCheckout;
use tidyhome_types::{calculate_visit_price, Frequency, Subscription, SubscriptionStatus};

use crate::error::{ApiError, ApiResult};
use crate::handlers::shared::{record_op_duration, require, success, ApiJson, Success};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub frequency: String,
    pub duration_hours: f64,
    pub hourly_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub frequency: Frequency,
    pub discount_percent: u32,
    pub price_per_visit: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub user_id: Option<String>,
    pub customer_email: Option<String>,
    pub frequency: String,
    pub duration_hours: f64,
    pub hourly_rate: f64,
    pub address: Option<String>,
    pub preferred_time: Option<String>,
    pub category_id: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionResponse {
    pub session_id: String,
    pub url: String,
    pub price_per_visit: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub subscription_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusResponse {
    pub subscription_id: String,
    pub status: SubscriptionStatus,
    pub frequency: Frequency,
    pub price_per_visit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_billing_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<Subscription> for SubscriptionStatusResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            subscription_id: sub.stripe_subscription_id,
            status: sub.status,
            frequency: sub.frequency,
            price_per_visit: sub.price_per_visit,
            next_billing_date: sub.next_billing_date,
            cancelled_at: sub.cancelled_at,
        }
    }
}

fn parse_frequency(raw: &str) -> ApiResult<Frequency> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid frequency: {raw}")))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/subscription-price
///
/// Pure quote; works without Stripe.
pub async fn subscription_price(
    ApiJson(req): ApiJson<PriceRequest>,
) -> ApiResult<Json<Success<PriceResponse>>> {
    let frequency = parse_frequency(&req.frequency)?;
    let price_per_visit = calculate_visit_price(req.hourly_rate, req.duration_hours, frequency)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok(success(PriceResponse {
        frequency,
        discount_percent: frequency.discount_percent(),
        price_per_visit,
    }))
}

/// POST /api/create-subscription
pub async fn create_subscription(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSubscriptionRequest>,
) -> ApiResult<Json<Success<CreateSubscriptionResponse>>> {
    let start = Instant::now();
    let payments = state.payments()?;

    let frequency = parse_frequency(&req.frequency)?;
    let customer_email = require(req.customer_email.as_deref(), "customerEmail")?.to_string();
    let address = require(req.address.as_deref(), "address")?.to_string();

    let result = payments
        .create_subscription_checkout(&SubscriptionCheckout {
            user_id: req.user_id,
            customer_email,
            frequency,
            duration_hours: req.duration_hours,
            hourly_rate: req.hourly_rate,
            address,
            preferred_time: req.preferred_time,
            category_id: req.category_id,
            success_url: req.success_url,
            cancel_url: req.cancel_url,
        })
        .await;
    record_op_duration("create_subscription", start, result.is_ok());
    let (session, price_per_visit) = result?;

    tracing::info!(
        session_id = %session.session_id,
        frequency = %frequency,
        "Subscription checkout created"
    );

    Ok(success(CreateSubscriptionResponse {
        session_id: session.session_id,
        url: session.url,
        price_per_visit,
    }))
}

/// POST /api/cancel-subscription
pub async fn cancel_subscription(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SubscriptionRequest>,
) -> ApiResult<Json<Success<SubscriptionStatusResponse>>> {
    let start = Instant::now();
    let payments = state.payments()?;
    let subscription_id = require(Some(req.subscription_id.as_str()), "subscriptionId")?;

    let result = payments.cancel_subscription(subscription_id, Utc::now()).await;
    record_op_duration("cancel_subscription", start, result.is_ok());
    Ok(success(SubscriptionStatusResponse::from(result?)))
}

/// POST /api/sync-subscription
pub async fn sync_subscription(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SubscriptionRequest>,
) -> ApiResult<Json<Success<SubscriptionStatusResponse>>> {
    let start = Instant::now();
    let payments = state.payments()?;
    let subscription_id = require(Some(req.subscription_id.as_str()), "subscriptionId")?;

    let result = payments.sync_subscription(subscription_id).await;
    record_op_duration("sync_subscription", start, result.is_ok());
    Ok(success(SubscriptionStatusResponse::from(result?)))
}
