//! Payment configuration

/// Default Stripe REST endpoint
pub const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Payment service configuration
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: Option<String>,
    /// Stripe API base URL (overridable for tests)
    pub api_base: String,
    /// ISO currency for new charges
    pub currency: String,
    /// Default success URL for checkout
    pub default_success_url: String,
    /// Default cancel URL for checkout
    pub default_cancel_url: String,
    /// Allowed clock skew on webhook timestamps, in seconds
    pub webhook_tolerance_secs: i64,
}

impl PaymentConfig {
    /// Create a new payment config
    pub fn new(stripe_secret_key: impl Into<String>) -> Self {
        Self {
            stripe_secret_key: stripe_secret_key.into(),
            stripe_webhook_secret: None,
            api_base: STRIPE_API_BASE.to_string(),
            currency: "usd".to_string(),
            default_success_url: "http://localhost:5173/booking/success".to_string(),
            default_cancel_url: "http://localhost:5173/booking/cancel".to_string(),
            webhook_tolerance_secs: 300,
        }
    }

    /// Set webhook signing secret
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.stripe_webhook_secret = Some(secret.into());
        self
    }

    /// Point at a different Stripe-compatible API
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set charge currency
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_lowercase();
        self
    }

    /// Set default URLs
    pub fn with_urls(
        mut self,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        self.default_success_url = success_url.into();
        self.default_cancel_url = cancel_url.into();
        self
    }
}
