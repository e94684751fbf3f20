//! Booking completion signals and capture eligibility

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use tidyhome_types::{CaptureDecision, PaymentStatus};

use crate::error::ApiResult;
use crate::handlers::shared::{parse_booking_id, success, Success};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub booking_id: String,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub booking_id: String,
    pub eligible: bool,
    pub reason: String,
}

/// POST /api/bookings/{id}/provider-complete
pub async fn provider_complete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Success<StatusResponse>>> {
    let booking_id = parse_booking_id(&id)?;
    let status = state
        .payments()?
        .mark_provider_completed(&booking_id, Utc::now())
        .await?;

    tracing::info!(booking_id = %booking_id, "Provider marked booking complete");
    Ok(success(StatusResponse {
        booking_id: booking_id.to_string(),
        payment_status: status,
    }))
}

/// POST /api/bookings/{id}/client-confirm
pub async fn client_confirm(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Success<StatusResponse>>> {
    let booking_id = parse_booking_id(&id)?;
    let status = state
        .payments()?
        .confirm_by_client(&booking_id, Utc::now())
        .await?;

    tracing::info!(booking_id = %booking_id, "Client confirmed booking");
    Ok(success(StatusResponse {
        booking_id: booking_id.to_string(),
        payment_status: status,
    }))
}

/// GET /api/bookings/{id}/capture-eligibility
pub async fn capture_eligibility(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Success<EligibilityResponse>>> {
    let booking_id = parse_booking_id(&id)?;
    let CaptureDecision { eligible, reason } = state
        .payments()?
        .capture_eligibility(&booking_id, Utc::now())
        .await?;

    Ok(success(EligibilityResponse {
        booking_id: booking_id.to_string(),
        eligible,
        reason: reason.to_string(),
    }))
}
