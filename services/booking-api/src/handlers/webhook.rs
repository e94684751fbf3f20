//! Inbound webhooks: Stripe payments and RankPill content

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use tidyhome_content::{authenticate, SIGNATURE_HEADER};

use crate::error::{ApiError, ApiResult};
use crate::handlers::shared::{header_str, record_op_duration, success, Success};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(rename = "type")]
    pub event_type: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleAck {
    pub slug: String,
    pub title: String,
}

/// POST /api/webhooks/stripe
///
/// Handle Stripe webhook events with signature verification.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Success<WebhookAck>>> {
    let start = Instant::now();
    let payments = state.payments()?;

    if payments.config().stripe_webhook_secret.is_none() {
        return Err(ApiError::Misconfigured("STRIPE_WEBHOOK_SECRET"));
    }

    let Some(signature) = header_str(&headers, "stripe-signature") else {
        tracing::warn!("Missing Stripe-Signature header");
        return Err(ApiError::BadRequest("Missing Stripe-Signature header".into()));
    };

    match payments.process_webhook(&body, signature).await {
        Ok(event_type) => {
            metrics::counter!("booking_webhooks_processed_total", "source" => "stripe", "status" => "success")
                .increment(1);
            record_op_duration("stripe_webhook", start, true);

            Ok(success(WebhookAck {
                received: true,
                event_type: event_type.as_str().to_string(),
            }))
        }
        Err(e) => {
            tracing::error!(error = ?e, "Webhook processing failed");
            metrics::counter!("booking_webhooks_processed_total", "source" => "stripe", "status" => "error")
                .increment(1);
            record_op_duration("stripe_webhook", start, false);
            Err(e.into())
        }
    }
}

/// POST /api/webhooks/rankpill
///
/// Accepts an HMAC signature of the raw body or the shared secret as a
/// bearer token, then upserts the article by slug.
pub async fn rankpill_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Success<ArticleAck>>> {
    let Some(secret) = state.config.rankpill_webhook_secret.as_deref() else {
        return Err(ApiError::Misconfigured("RANKPILL_WEBHOOK_SECRET"));
    };

    if let Err(e) = authenticate(
        secret,
        &body,
        header_str(&headers, SIGNATURE_HEADER),
        header_str(&headers, header::AUTHORIZATION.as_str()),
    ) {
        tracing::warn!("RankPill webhook rejected");
        metrics::counter!("booking_webhooks_processed_total", "source" => "rankpill", "status" => "unauthorized")
            .increment(1);
        return Err(e.into());
    }

    let article = state.blog.ingest(&body, Utc::now()).await?;
    metrics::counter!("booking_webhooks_processed_total", "source" => "rankpill", "status" => "success")
        .increment(1);

    Ok(success(ArticleAck {
        slug: article.slug,
        title: article.title,
    }))
}
