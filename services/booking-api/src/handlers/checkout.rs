//! One-off booking payment handlers: checkout, hold, capture, release

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use tidyhome_payments::BookingCheckout;
use tidyhome_types::{to_minor_units, CaptureReason};

use crate::error::{ApiError, ApiResult};
use crate::handlers::shared::{
    parse_booking_id, record_op_duration, success, validate_string_length, ApiJson, Success,
};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub booking_id: Option<String>,
    /// Total in major units (dollars)
    pub amount: f64,
    pub description: Option<String>,
    pub customer_email: Option<String>,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub booking_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreauthorizeResponse {
    pub payment_intent_id: String,
    pub client_secret: Option<String>,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub payment_intent_id: String,
    pub amount: i64,
    pub reason: CaptureReason,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelPaymentRequest {
    pub booking_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub payment_intent_id: String,
    pub status: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/create-checkout-session
pub async fn create_checkout_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateCheckoutRequest>,
) -> ApiResult<Json<Success<CheckoutResponse>>> {
    let start = Instant::now();
    let payments = state.payments()?;

    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err(ApiError::BadRequest("amount must be positive".into()));
    }
    let booking_id = req.booking_id.as_deref().map(parse_booking_id).transpose()?;
    let description = req
        .description
        .unwrap_or_else(|| "Home cleaning".to_string());
    validate_string_length(&description, "description")?;

    let result = payments
        .create_booking_checkout(&BookingCheckout {
            booking_id,
            amount_cents: to_minor_units(req.amount),
            description,
            customer_email: req.customer_email,
            success_url: req.success_url,
            cancel_url: req.cancel_url,
        })
        .await;
    record_op_duration("create_checkout_session", start, result.is_ok());
    let session = result?;

    tracing::info!(session_id = %session.session_id, "Booking checkout session created");

    Ok(success(CheckoutResponse {
        session_id: session.session_id,
        url: session.url,
    }))
}

/// POST /api/preauthorize-payment
pub async fn preauthorize_payment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BookingRequest>,
) -> ApiResult<Json<Success<PreauthorizeResponse>>> {
    let start = Instant::now();
    let payments = state.payments()?;
    let booking_id = parse_booking_id(&req.booking_id)?;

    let result = payments.preauthorize(&booking_id).await;
    record_op_duration("preauthorize", start, result.is_ok());
    let hold = result?;

    Ok(success(PreauthorizeResponse {
        payment_intent_id: hold.payment_intent_id,
        client_secret: hold.client_secret,
        amount: hold.amount_cents,
    }))
}

/// POST /api/capture-payment
pub async fn capture_payment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BookingRequest>,
) -> ApiResult<Json<Success<CaptureResponse>>> {
    let start = Instant::now();
    let payments = state.payments()?;
    let booking_id = parse_booking_id(&req.booking_id)?;

    let result = payments.capture(&booking_id, Utc::now()).await;
    record_op_duration("capture", start, result.is_ok());
    let outcome = result?;

    Ok(success(CaptureResponse {
        payment_intent_id: outcome.payment_intent_id,
        amount: outcome.amount_cents,
        reason: outcome.reason,
    }))
}

/// POST /api/cancel-payment
pub async fn cancel_payment(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CancelPaymentRequest>,
) -> ApiResult<Json<Success<CancelResponse>>> {
    let start = Instant::now();
    let payments = state.payments()?;
    let booking_id = parse_booking_id(&req.booking_id)?;

    let result = payments
        .cancel(&booking_id, req.reason.as_deref(), Utc::now())
        .await;
    record_op_duration("cancel", start, result.is_ok());

    Ok(success(CancelResponse {
        payment_intent_id: result?,
        status: "cancelled",
    }))
}
