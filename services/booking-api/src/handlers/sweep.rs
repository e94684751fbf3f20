//! Scheduled auto-capture trigger

use std::time::Instant;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;

use tidyhome_payments::SweepReport;

use crate::error::{ApiError, ApiResult};
use crate::handlers::shared::{bearer_matches, record_op_duration, success, Success};
use crate::state::AppState;

/// POST /api/auto-capture
///
/// Called by cron. When `CRON_SECRET` is set the caller must present it as a
/// bearer token.
pub async fn auto_capture(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Success<SweepReport>>> {
    if let Some(secret) = state.config.cron_secret.as_deref() {
        if !bearer_matches(&headers, secret) {
            tracing::warn!("Auto-capture called without valid cron token");
            return Err(ApiError::Unauthorized);
        }
    }

    let start = Instant::now();
    let result = state.payments()?.run_auto_capture(Utc::now()).await;
    record_op_duration("auto_capture", start, result.is_ok());
    let report = result?;

    tracing::info!(
        processed = report.processed,
        captured = report.captured,
        cancelled = report.cancelled,
        failed = report.failed,
        "Auto-capture sweep finished"
    );

    Ok(success(report))
}
