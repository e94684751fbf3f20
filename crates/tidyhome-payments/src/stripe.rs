//! Stripe payment provider implementation

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::PaymentConfig;
use crate::error::PaymentError;
use crate::provider::{
    CheckoutMode, CheckoutRequest, CheckoutSession, PaymentIntentRequest, PaymentProvider,
};

/// Stripe cancellation reasons accepted by the API
const CANCELLATION_REASONS: &[&str] = &[
    "duplicate",
    "fraudulent",
    "requested_by_customer",
    "abandoned",
];

/// Stripe payment provider
#[derive(Clone)]
pub struct StripeProvider {
    client: Client,
    config: PaymentConfig,
}

impl StripeProvider {
    /// Create a new Stripe provider
    pub fn new(config: PaymentConfig) -> Self {
        let client = Client::new();
        Self { client, config }
    }

    /// Make authenticated request to Stripe
    async fn stripe_request<T: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        endpoint: &str,
        form: Option<&[(String, String)]>,
    ) -> Result<T, PaymentError> {
        let url = format!("{}{endpoint}", self.config.api_base);

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(&self.config.stripe_secret_key, Option::<&str>::None);

        if let Some(form_data) = form {
            request = request.form(form_data);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Stripe API request failed");
            PaymentError::ProviderError(e.to_string())
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Stripe API error");
            let message = serde_json::from_str::<StripeErrorBody>(&error_body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| format!("Stripe API error: {status}"));
            return Err(PaymentError::Stripe {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Stripe response");
            PaymentError::ProviderError(e.to_string())
        })
    }
}

/// Encode a checkout request as Stripe form fields
pub(crate) fn checkout_form(req: &CheckoutRequest) -> Vec<(String, String)> {
    let mut form: Vec<(String, String)> = vec![
        ("success_url".into(), req.success_url.clone()),
        ("cancel_url".into(), req.cancel_url.clone()),
        ("line_items[0][quantity]".into(), "1".into()),
        ("line_items[0][price_data][currency]".into(), req.currency.clone()),
        (
            "line_items[0][price_data][unit_amount]".into(),
            req.amount_cents.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".into(),
            req.product_name.clone(),
        ),
    ];

    if let Some(email) = &req.customer_email {
        form.push(("customer_email".into(), email.clone()));
    }

    // Metadata is copied onto the object that outlives the session so that
    // later webhooks (payment_intent.*, customer.subscription.*) carry it too.
    let nested = match &req.mode {
        CheckoutMode::Payment => {
            form.push(("mode".into(), "payment".into()));
            form.push((
                "payment_intent_data[capture_method]".into(),
                "manual".into(),
            ));
            "payment_intent_data"
        }
        CheckoutMode::Subscription {
            interval,
            interval_count,
        } => {
            form.push(("mode".into(), "subscription".into()));
            form.push((
                "line_items[0][price_data][recurring][interval]".into(),
                (*interval).to_string(),
            ));
            form.push((
                "line_items[0][price_data][recurring][interval_count]".into(),
                interval_count.to_string(),
            ));
            "subscription_data"
        }
    };

    for (key, value) in &req.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
        form.push((format!("{nested}[metadata][{key}]"), value.clone()));
    }

    form
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    #[instrument(skip(self, request), fields(amount = request.amount_cents))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        debug!(mode = ?request.mode, "Creating checkout session");

        let form = checkout_form(request);
        let session: StripeCheckoutSession = self
            .stripe_request(reqwest::Method::POST, "/checkout/sessions", Some(&form))
            .await?;

        Ok(CheckoutSession {
            session_id: session.id,
            url: session.url.unwrap_or_default(),
        })
    }

    #[instrument(skip(self, request), fields(booking_id = %request.booking_id))]
    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<StripePaymentIntent, PaymentError> {
        debug!(amount = request.amount_cents, "Creating manual-capture payment intent");

        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), request.amount_cents.to_string()),
            ("currency".into(), request.currency.clone()),
            ("capture_method".into(), "manual".into()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
            ("metadata[booking_id]".into(), request.booking_id.clone()),
        ];
        if let Some(email) = &request.customer_email {
            form.push(("receipt_email".into(), email.clone()));
        }
        if let Some(description) = &request.description {
            form.push(("description".into(), description.clone()));
        }

        self.stripe_request(reqwest::Method::POST, "/payment_intents", Some(&form))
            .await
    }

    #[instrument(skip(self))]
    async fn retrieve_payment_intent(&self, id: &str) -> Result<StripePaymentIntent, PaymentError> {
        self.stripe_request(
            reqwest::Method::GET,
            &format!("/payment_intents/{id}"),
            None,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn capture_payment_intent(&self, id: &str) -> Result<StripePaymentIntent, PaymentError> {
        debug!(payment_intent_id = %id, "Capturing payment intent");

        self.stripe_request(
            reqwest::Method::POST,
            &format!("/payment_intents/{id}/capture"),
            None,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn cancel_payment_intent(
        &self,
        id: &str,
        reason: Option<&str>,
    ) -> Result<StripePaymentIntent, PaymentError> {
        debug!(payment_intent_id = %id, "Canceling payment intent");

        let form: Vec<(String, String)> = reason
            .filter(|r| CANCELLATION_REASONS.contains(r))
            .map(|r| vec![("cancellation_reason".to_string(), r.to_string())])
            .unwrap_or_default();

        self.stripe_request(
            reqwest::Method::POST,
            &format!("/payment_intents/{id}/cancel"),
            Some(&form),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn retrieve_subscription(&self, id: &str) -> Result<StripeSubscription, PaymentError> {
        self.stripe_request(reqwest::Method::GET, &format!("/subscriptions/{id}"), None)
            .await
    }

    #[instrument(skip(self))]
    async fn cancel_subscription(&self, id: &str) -> Result<StripeSubscription, PaymentError> {
        debug!(subscription_id = %id, "Canceling subscription");

        self.stripe_request(
            reqwest::Method::DELETE,
            &format!("/subscriptions/{id}"),
            None,
        )
        .await
    }
}

// Stripe API response types

/// Stripe PaymentIntent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripePaymentIntent {
    /// PaymentIntent ID
    pub id: String,
    /// `requires_payment_method`, `requires_capture`, `succeeded`, `canceled`, ...
    pub status: String,
    /// Amount in minor units
    pub amount: i64,
    /// Currency
    pub currency: String,
    /// Secret handed to the browser to confirm the card
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscription {
    /// Subscription ID
    pub id: String,
    /// Customer ID
    pub customer: String,
    /// Subscription status
    pub status: String,
    /// Current period end (Unix timestamp)
    #[serde(default)]
    pub current_period_end: Option<i64>,
    /// Whether subscription cancels at period end
    #[serde(default)]
    pub cancel_at_period_end: bool,
    /// Metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Stripe checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeCheckoutSession {
    /// Session ID
    pub id: String,
    /// Checkout URL
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}
