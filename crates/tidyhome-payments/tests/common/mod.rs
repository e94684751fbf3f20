//! Common test utilities for tidyhome-payments integration tests

pub mod mock_provider;
pub mod mock_repos;

use std::sync::Arc;

use tidyhome_payments::{PaymentConfig, PaymentService};

#[allow(unused_imports)]
pub use mock_provider::MockProvider;
#[allow(unused_imports)]
pub use mock_repos::{MockBookingRepository, MockSubscriptionRepository};

/// Service wired to fresh in-memory doubles
#[allow(dead_code)]
pub struct Harness {
    pub service: PaymentService,
    pub provider: MockProvider,
    pub bookings: MockBookingRepository,
    pub subscriptions: MockSubscriptionRepository,
}

#[allow(dead_code)]
pub fn harness() -> Harness {
    let provider = MockProvider::new();
    let bookings = MockBookingRepository::new();
    let subscriptions = MockSubscriptionRepository::new();
    let config = PaymentConfig::new("sk_test_123").with_webhook_secret("whsec_test");
    let service = PaymentService::new(
        Arc::new(provider.clone()),
        Arc::new(bookings.clone()),
        Arc::new(subscriptions.clone()),
        config,
    );
    Harness {
        service,
        provider,
        bookings,
        subscriptions,
    }
}
