//! TidyHome Booking API server

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tokio::signal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use booking_api::{build_router, AppState, Config};
use tidyhome_content::{static_articles, BlogService};
use tidyhome_db::{create_pool, ArticleRepository, PoolOptions, Repositories};
use tidyhome_payments::{PaymentService, StripeProvider};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("booking_api=debug".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TidyHome Booking API");

    let config = Config::from_env()?;
    tracing::info!(config = ?config, "Configuration loaded");

    let metrics_handle = if config.metrics_enabled {
        Some(setup_metrics()?)
    } else {
        None
    };

    // Database is optional; without it payments are disabled and the blog
    // serves the bundled articles only.
    let pool = config
        .database_url
        .as_deref()
        .map(|url| create_pool(url, PoolOptions::default()))
        .transpose()?;
    let repos = pool.clone().map(Repositories::new);
    if repos.is_none() {
        tracing::warn!("DATABASE_URL not set; payment endpoints disabled");
    }

    let payments = match (config.payment_config(), &repos) {
        (Some(payment_config), Some(repos)) => Some(PaymentService::new(
            Arc::new(StripeProvider::new(payment_config.clone())),
            Arc::new(repos.bookings.clone()),
            Arc::new(repos.subscriptions.clone()),
            payment_config,
        )),
        (None, _) => {
            tracing::warn!("STRIPE_SECRET_KEY not set; payment endpoints disabled");
            None
        }
        _ => None,
    };

    let articles = repos.map(|r| Arc::new(r.articles) as Arc<dyn ArticleRepository>);
    let blog = BlogService::new(static_articles()?, articles);

    let http_port = config.http_port;
    let state = AppState::new(config, payments, blog, pool);
    let app = build_router(state, metrics_handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], http_port));
    tracing::info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    // Most calls wait on Stripe; buckets reach into seconds
    let latency_buckets = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("booking_operation_duration_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    metrics::describe_counter!(
        "payments_checkouts_created_total",
        "Checkout sessions created by mode"
    );
    metrics::describe_counter!(
        "payments_preauthorizations_total",
        "Manual-capture holds placed"
    );
    metrics::describe_counter!(
        "payments_captured_total",
        "Holds captured by trigger"
    );
    metrics::describe_counter!("payments_cancelled_total", "Holds released");
    metrics::describe_counter!(
        "payments_subscriptions_cancelled_total",
        "Subscriptions cancelled"
    );
    metrics::describe_counter!(
        "booking_webhooks_processed_total",
        "Webhooks processed by source and status"
    );
    metrics::describe_counter!(
        "content_articles_ingested_total",
        "Articles upserted from RankPill"
    );
    metrics::describe_histogram!(
        "booking_operation_duration_seconds",
        "Handler latency in seconds by operation and result"
    );

    Ok(handle)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = ?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
