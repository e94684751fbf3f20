//! Application state for the booking API service.

use std::sync::Arc;

use tidyhome_content::BlogService;
use tidyhome_db::DbPool;
use tidyhome_payments::PaymentService;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Payment lifecycle; absent when Stripe or the database is not configured
    pub payments: Option<Arc<PaymentService>>,
    /// Blog reads and content ingestion
    pub blog: BlogService,
    /// Database pool, for the readiness probe
    pub pool: Option<DbPool>,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Config,
        payments: Option<PaymentService>,
        blog: BlogService,
        pool: Option<DbPool>,
    ) -> Self {
        Self {
            payments: payments.map(Arc::new),
            blog,
            pool,
            config: Arc::new(config),
        }
    }

    /// Payment service, or a misconfiguration error naming what is missing
    pub fn payments(&self) -> ApiResult<&PaymentService> {
        self.payments
            .as_deref()
            .ok_or_else(|| ApiError::Misconfigured(self.config.missing_payment_setting()))
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("payments", &self.payments.is_some())
            .finish_non_exhaustive()
    }
}
