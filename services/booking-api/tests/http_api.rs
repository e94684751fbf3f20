//! HTTP surface tests: envelopes, configuration gaps, cron auth, CORS,
//! static files and blog reads.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};

use booking_api::Config;
use common::{app, base_config, get, post_json, send, send_json};

#[tokio::test]
async fn test_health_is_always_up() {
    let (status, body) = send_json(app(base_config()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send_json(app(base_config()), get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "not_configured");
    assert_eq!(body["payments"], "disabled");
}

#[tokio::test]
async fn test_payment_endpoints_report_missing_stripe_key() {
    let request = post_json(
        "/api/capture-payment",
        serde_json::json!({ "bookingId": "6f1c1c1e-8d7b-4e55-9a3e-0c9a7f0d2b11" }),
    );
    let (status, body) = send_json(app(base_config()), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "MISCONFIGURED");
    assert!(body["error"].as_str().unwrap().contains("STRIPE_SECRET_KEY"));
}

#[tokio::test]
async fn test_payment_endpoints_report_missing_database() {
    let config = Config {
        stripe_secret_key: Some("sk_test_1".into()),
        ..base_config()
    };
    let (status, body) = send_json(
        app(config),
        get("/api/bookings/6f1c1c1e-8d7b-4e55-9a3e-0c9a7f0d2b11/capture-eligibility"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("DATABASE_URL"));
}

#[tokio::test]
async fn test_auto_capture_requires_cron_token() {
    let config = Config {
        cron_secret: Some("cron-s3cret".into()),
        ..base_config()
    };

    let (status, body) = send_json(app(config.clone()), post_json("/api/auto-capture", serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let wrong = Request::builder()
        .method("POST")
        .uri("/api/auto-capture")
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_json(app(config.clone()), wrong).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct token gets past auth and hits the missing Stripe key.
    let right = Request::builder()
        .method("POST")
        .uri("/api/auto-capture")
        .header(header::AUTHORIZATION, "Bearer cron-s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(app(config), right).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "MISCONFIGURED");
}

#[tokio::test]
async fn test_subscription_price_quote() {
    let request = post_json(
        "/api/subscription-price",
        serde_json::json!({ "frequency": "weekly", "durationHours": 3, "hourlyRate": 45 }),
    );
    let (status, body) = send_json(app(base_config()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["pricePerVisit"], 121.5);
    assert_eq!(body["discountPercent"], 10);
    assert_eq!(body["frequency"], "weekly");

    let request = post_json(
        "/api/subscription-price",
        serde_json::json!({ "frequency": "daily", "durationHours": 3, "hourlyRate": 45 }),
    );
    let (status, body) = send_json(app(base_config()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let request = post_json(
        "/api/subscription-price",
        serde_json::json!({ "frequency": "monthly", "durationHours": 0, "hourlyRate": 45 }),
    );
    let (status, _) = send_json(app(base_config()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/create-subscription")
        .header(header::ORIGIN, "https://preview.tidyhome.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(app(base_config()), preflight).await;

    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let (_, headers, _) = send(app(base_config()), get("/api/blog/articles")).await;
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_static_files_are_cached_text() {
    let (status, headers, body) = send(app(base_config()), get("/robots.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=3600");
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    assert!(String::from_utf8(body).unwrap().contains("User-agent"));

    let (status, headers, _) = send(app(base_config()), get("/sitemap.xml")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().contains("xml"));
}

#[tokio::test]
async fn test_missing_static_file_is_plain_404() {
    let config = Config {
        public_dir: "/nonexistent/tidyhome/public".into(),
        ..base_config()
    };
    let (status, headers, body) = send(app(config), get("/sitemap.xml")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    assert!(headers.get(header::CACHE_CONTROL).is_none());
    assert_eq!(String::from_utf8(body).unwrap(), "sitemap.xml not found");
}

#[tokio::test]
async fn test_blog_serves_bundled_articles() {
    let (status, body) = send_json(app(base_config()), get("/api/blog/articles")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let articles = body["articles"].as_array().unwrap();
    assert_eq!(body["count"], articles.len());
    let dates: Vec<&str> = articles
        .iter()
        .map(|a| a["publishedAt"].as_str().unwrap())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);

    let slug = articles[0]["slug"].as_str().unwrap();
    let (status, body) = send_json(app(base_config()), get(&format!("/api/blog/articles/{slug}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["article"]["slug"], slug);

    let (status, body) = send_json(app(base_config()), get("/api/blog/articles/no-such-post")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_booking_id_is_bad_request() {
    let config = Config {
        stripe_secret_key: Some("sk_test_1".into()),
        ..base_config()
    };
    let app = common::app_with_payments(config);
    let (status, body) = send_json(app, post_json("/api/preauthorize-payment", serde_json::json!({ "bookingId": "42" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid booking id");
}

#[tokio::test]
async fn test_incomplete_body_gets_error_envelope() {
    let config = Config {
        stripe_secret_key: Some("sk_test_1".into()),
        ..base_config()
    };
    let app = common::app_with_payments(config);
    let (status, body) = send_json(app, post_json("/api/capture-payment", serde_json::json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].as_str().unwrap().contains("bookingId"));
}

#[tokio::test]
async fn test_unparseable_body_gets_error_envelope() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/subscription-price")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"frequency\":"))
        .unwrap();
    let (status, body) = send_json(app(base_config()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let untyped = Request::builder()
        .method("POST")
        .uri("/api/subscription-price")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send_json(app(base_config()), untyped).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Content-Type"));
}

#[tokio::test]
async fn test_auto_capture_keeps_shared_middleware_outside_timeout() {
    let config = Config {
        cron_secret: Some("cron-s3cret".into()),
        request_timeout: std::time::Duration::ZERO,
        ..base_config()
    };
    let request = Request::builder()
        .method("POST")
        .uri("/api/auto-capture")
        .header(header::ORIGIN, "https://tidyhome.example.com")
        .header(header::AUTHORIZATION, "Bearer cron-s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(app(config), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "MISCONFIGURED");
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.contains_key("x-request-id"));
}
