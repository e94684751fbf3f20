//! Error types for the booking API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tidyhome_content::ContentError;
use tidyhome_payments::PaymentError;

/// Error body: `{ "success": false, "error": "...", "code": "..." }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server misconfigured: {0} is not set")]
    Misconfigured(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Content(#[from] ContentError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Payment(e) => {
                if e.is_not_found() {
                    StatusCode::NOT_FOUND
                } else if e.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            Self::Content(e) => match e {
                ContentError::Unauthorized => StatusCode::UNAUTHORIZED,
                ContentError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
                ContentError::NotFound => StatusCode::NOT_FOUND,
                ContentError::StorageUnavailable
                | ContentError::Dataset(_)
                | ContentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Misconfigured(_) => "MISCONFIGURED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Payment(e) => match e {
                PaymentError::NotConfigured(_) => "MISCONFIGURED",
                PaymentError::BookingNotFound => "BOOKING_NOT_FOUND",
                PaymentError::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
                PaymentError::MissingPaymentIntent => "MISSING_PAYMENT_INTENT",
                PaymentError::NotEligible(_) => "NOT_ELIGIBLE",
                PaymentError::InvalidState(_) => "INVALID_STATE",
                PaymentError::InvalidInput(_) => "BAD_REQUEST",
                PaymentError::WebhookError(_) => "WEBHOOK_ERROR",
                PaymentError::Stripe { .. } | PaymentError::ProviderError(_) => "PAYMENT_PROVIDER_ERROR",
                PaymentError::Database(_) | PaymentError::Internal(_) => "INTERNAL_ERROR",
            },
            Self::Content(e) => match e {
                ContentError::Unauthorized => "UNAUTHORIZED",
                ContentError::InvalidPayload(_) => "BAD_REQUEST",
                ContentError::NotFound => "NOT_FOUND",
                ContentError::StorageUnavailable => "MISCONFIGURED",
                ContentError::Dataset(_) | ContentError::Database(_) => "INTERNAL_ERROR",
            },
        }
    }

    /// Message safe to show the caller
    fn public_message(&self) -> String {
        match self {
            Self::Payment(PaymentError::Database(_) | PaymentError::Internal(_))
            | Self::Content(ContentError::Database(_) | ContentError::Dataset(_)) => {
                "Internal server error".to_string()
            }
            Self::Payment(PaymentError::NotConfigured(var)) => {
                Self::Misconfigured(var).to_string()
            }
            Self::Content(ContentError::StorageUnavailable) => {
                Self::Misconfigured("DATABASE_URL").to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = ?self, code, "Internal API error");
        } else {
            tracing::debug!(error = %self, code, "Request rejected");
        }

        let body = ErrorResponse {
            success: false,
            error: self.public_message(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
