//! Configuration for the booking API service.

use std::path::PathBuf;
use std::time::Duration;

use tidyhome_payments::config::STRIPE_API_BASE;
use tidyhome_payments::PaymentConfig;

/// Booking API configuration.
///
/// Secrets are optional: a missing secret disables only the endpoints that
/// need it, which then answer 500 naming the variable.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Postgres URL
    pub database_url: Option<String>,
    /// Stripe secret key
    pub stripe_secret_key: Option<String>,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: Option<String>,
    /// Stripe API base URL
    pub stripe_api_base: String,
    /// RankPill shared secret
    pub rankpill_webhook_secret: Option<String>,
    /// Bearer token required by the auto-capture endpoint
    pub cron_secret: Option<String>,
    /// Public site origin, used for checkout return URLs
    pub site_url: String,
    /// Directory holding robots.txt and sitemap.xml
    pub public_dir: PathBuf,
    /// Charge currency
    pub currency: String,
    /// Request timeout
    pub request_timeout: Duration,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            database_url: None,
            stripe_secret_key: None,
            stripe_webhook_secret: None,
            stripe_api_base: STRIPE_API_BASE.to_string(),
            rankpill_webhook_secret: None,
            cron_secret: None,
            site_url: "http://localhost:5173".to_string(),
            public_dir: PathBuf::from("public"),
            currency: "usd".to_string(),
            request_timeout: Duration::from_secs(30),
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let http_port = match env_opt("HTTP_PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("HTTP_PORT"))?,
            None => defaults.http_port,
        };

        let request_timeout = match env_opt("REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?,
            ),
            None => defaults.request_timeout,
        };

        let metrics_enabled = match env_opt("METRICS_ENABLED") {
            Some(v) => parse_flag(&v).ok_or(ConfigError::Invalid("METRICS_ENABLED"))?,
            None => defaults.metrics_enabled,
        };

        Ok(Self {
            http_port,
            database_url: env_opt("DATABASE_URL"),
            stripe_secret_key: env_opt("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: env_opt("STRIPE_WEBHOOK_SECRET"),
            stripe_api_base: env_opt("STRIPE_API_BASE").unwrap_or(defaults.stripe_api_base),
            rankpill_webhook_secret: env_opt("RANKPILL_WEBHOOK_SECRET"),
            cron_secret: env_opt("CRON_SECRET"),
            site_url: env_opt("SITE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            public_dir: env_opt("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            currency: env_opt("CURRENCY").unwrap_or(defaults.currency),
            request_timeout,
            metrics_enabled,
        })
    }

    /// Payment settings, if a Stripe key is configured
    pub fn payment_config(&self) -> Option<PaymentConfig> {
        let key = self.stripe_secret_key.as_deref()?;

        let mut config = PaymentConfig::new(key)
            .with_api_base(self.stripe_api_base.as_str())
            .with_currency(self.currency.as_str())
            .with_urls(
                format!("{}/booking/success?session_id={{CHECKOUT_SESSION_ID}}", self.site_url),
                format!("{}/booking/cancel", self.site_url),
            );
        if let Some(secret) = &self.stripe_webhook_secret {
            config = config.with_webhook_secret(secret.as_str());
        }
        Some(config)
    }

    /// First missing variable that payment endpoints depend on
    pub fn missing_payment_setting(&self) -> &'static str {
        if self.stripe_secret_key.is_none() {
            "STRIPE_SECRET_KEY"
        } else {
            "DATABASE_URL"
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("database", &self.database_url.is_some())
            .field("stripe", &self.stripe_secret_key.is_some())
            .field("stripe_webhook", &self.stripe_webhook_secret.is_some())
            .field("rankpill", &self.rankpill_webhook_secret.is_some())
            .field("cron", &self.cron_secret.is_some())
            .field("site_url", &self.site_url)
            .field("public_dir", &self.public_dir)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
