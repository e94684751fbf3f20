//! TidyHome Booking API
//!
//! HTTP surface for the booking wizard, payment lifecycle, recurring plans
//! and blog content.
//!
//! ## Payment Endpoints
//!
//! - `POST /api/create-checkout-session` - One-off booking checkout (manual capture)
//! - `POST /api/preauthorize-payment` - Place a hold for a booking
//! - `POST /api/bookings/{id}/provider-complete` - Provider marks the cleaning done
//! - `POST /api/bookings/{id}/client-confirm` - Client confirms the cleaning
//! - `GET /api/bookings/{id}/capture-eligibility` - Capture rule evaluation
//! - `POST /api/capture-payment` - Capture a hold
//! - `POST /api/cancel-payment` - Release a hold
//! - `POST /api/auto-capture` - Cron sweep
//!
//! ## Subscription Endpoints
//!
//! - `POST /api/subscription-price` - Per-visit price quote
//! - `POST /api/create-subscription` - Recurring checkout
//! - `POST /api/cancel-subscription` - Cancel a plan
//! - `POST /api/sync-subscription` - Pull plan state from Stripe
//!
//! ## Webhooks and Content
//!
//! - `POST /api/webhooks/stripe` - Stripe events
//! - `POST /api/webhooks/rankpill` - Article pushes
//! - `GET /api/blog/articles`, `GET /api/blog/articles/{slug}` - Blog
//! - `GET /robots.txt`, `GET /sitemap.xml` - Static text
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use crate::config::{Config, ConfigError};
pub use crate::state::AppState;

/// Assemble the full HTTP router
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    let api = Router::new()
        // One-off bookings
        .route("/create-checkout-session", post(handlers::create_checkout_session))
        .route("/preauthorize-payment", post(handlers::preauthorize_payment))
        .route("/capture-payment", post(handlers::capture_payment))
        .route("/cancel-payment", post(handlers::cancel_payment))
        .route("/bookings/{id}/provider-complete", post(handlers::provider_complete))
        .route("/bookings/{id}/client-confirm", post(handlers::client_confirm))
        .route(
            "/bookings/{id}/capture-eligibility",
            get(handlers::capture_eligibility),
        )
        // Subscriptions
        .route("/subscription-price", post(handlers::subscription_price))
        .route("/create-subscription", post(handlers::create_subscription))
        .route("/cancel-subscription", post(handlers::cancel_subscription))
        .route("/sync-subscription", post(handlers::sync_subscription))
        // Webhooks take the raw body; signatures cover the exact bytes
        .route("/webhooks/stripe", post(handlers::stripe_webhook))
        .route("/webhooks/rankpill", post(handlers::rankpill_webhook))
        // Blog
        .route("/blog/articles", get(handlers::list_articles))
        .route("/blog/articles/{slug}", get(handlers::get_article))
        .layer(TimeoutLayer::new(request_timeout))
        // Cron sweep runs captures back to back (no timeout)
        .route("/auto-capture", post(handlers::auto_capture));

    let static_routes = Router::new()
        .route("/robots.txt", get(handlers::robots_txt))
        .route("/sitemap.xml", get(handlers::sitemap_xml))
        .layer(TimeoutLayer::new(request_timeout));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS: the site and its previews call from any origin (innermost)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    Router::new()
        .nest("/api", api)
        .merge(static_routes)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}
