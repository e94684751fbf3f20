//! In-memory payment provider for testing

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;

use tidyhome_payments::{
    CheckoutRequest, CheckoutSession, PaymentError, PaymentIntentRequest, PaymentProvider,
    StripePaymentIntent, StripeSubscription,
};

/// Records calls and serves PaymentIntents from a map
#[derive(Default, Clone)]
pub struct MockProvider {
    intents: Arc<DashMap<String, StripePaymentIntent>>,
    subscriptions: Arc<DashMap<String, StripeSubscription>>,
    failing_captures: Arc<DashMap<String, ()>>,
    pub checkouts: Arc<Mutex<Vec<CheckoutRequest>>>,
    pub captures: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a PaymentIntent in the given status
    pub fn with_intent(&self, id: &str, status: &str, amount: i64) {
        self.intents.insert(
            id.to_string(),
            StripePaymentIntent {
                id: id.to_string(),
                status: status.to_string(),
                amount,
                currency: "usd".to_string(),
                client_secret: Some(format!("{id}_secret")),
                metadata: HashMap::new(),
            },
        );
    }

    /// Register a Stripe subscription
    pub fn with_subscription(&self, id: &str, status: &str, period_end: i64) {
        self.subscriptions.insert(
            id.to_string(),
            StripeSubscription {
                id: id.to_string(),
                customer: "cus_1".to_string(),
                status: status.to_string(),
                current_period_end: Some(period_end),
                cancel_at_period_end: false,
                metadata: HashMap::new(),
            },
        );
    }

    /// Make capture of this intent fail with a card error
    pub fn fail_capture(&self, id: &str) {
        self.failing_captures.insert(id.to_string(), ());
    }

    pub fn intent_status(&self, id: &str) -> Option<String> {
        self.intents.get(id).map(|i| i.status.clone())
    }

    fn missing(id: &str) -> PaymentError {
        PaymentError::Stripe {
            status: 404,
            message: format!("No such object: '{id}'"),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut checkouts = self.checkouts.lock().unwrap();
        checkouts.push(request.clone());
        let id = format!("cs_test_{}", checkouts.len());
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.test/{id}"),
            session_id: id,
        })
    }

    async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<StripePaymentIntent, PaymentError> {
        let id = format!("pi_test_{}", self.intents.len() + 1);
        self.with_intent(&id, "requires_payment_method", request.amount_cents);
        let mut intent = self.intents.get(&id).map(|i| i.clone()).ok_or_else(|| Self::missing(&id))?;
        intent
            .metadata
            .insert("booking_id".to_string(), request.booking_id.clone());
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<StripePaymentIntent, PaymentError> {
        self.intents
            .get(id)
            .map(|i| i.clone())
            .ok_or_else(|| Self::missing(id))
    }

    async fn capture_payment_intent(&self, id: &str) -> Result<StripePaymentIntent, PaymentError> {
        if self.failing_captures.contains_key(id) {
            return Err(PaymentError::Stripe {
                status: 402,
                message: "Your card was declined.".to_string(),
            });
        }
        let mut intent = self.intents.get_mut(id).ok_or_else(|| Self::missing(id))?;
        if intent.status != "requires_capture" {
            return Err(PaymentError::Stripe {
                status: 400,
                message: format!("This PaymentIntent could not be captured because it has a status of {}.", intent.status),
            });
        }
        intent.status = "succeeded".to_string();
        self.captures.lock().unwrap().push(id.to_string());
        Ok(intent.clone())
    }

    async fn cancel_payment_intent(
        &self,
        id: &str,
        _reason: Option<&str>,
    ) -> Result<StripePaymentIntent, PaymentError> {
        let mut intent = self.intents.get_mut(id).ok_or_else(|| Self::missing(id))?;
        intent.status = "canceled".to_string();
        Ok(intent.clone())
    }

    async fn retrieve_subscription(&self, id: &str) -> Result<StripeSubscription, PaymentError> {
        self.subscriptions
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| Self::missing(id))
    }

    async fn cancel_subscription(&self, id: &str) -> Result<StripeSubscription, PaymentError> {
        let mut sub = self.subscriptions.get_mut(id).ok_or_else(|| Self::missing(id))?;
        sub.status = "canceled".to_string();
        Ok(sub.clone())
    }
}
