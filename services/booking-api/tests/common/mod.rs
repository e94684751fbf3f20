//! Router test helpers

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use dashmap::DashMap;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use booking_api::{build_router, AppState, Config};
use tidyhome_content::{static_articles, BlogService};
use tidyhome_db::{
    create_pool, ArticleRepository, ArticleRow, DbResult, PoolOptions, Repositories, UpsertArticle,
};
use tidyhome_payments::{PaymentService, StripeProvider};

pub fn public_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public")
}

/// Config with no secrets and the crate's own public directory
pub fn base_config() -> Config {
    Config {
        public_dir: public_dir(),
        ..Config::default()
    }
}

/// Router without payments or article storage
pub fn app(config: Config) -> Router {
    let blog = BlogService::new(static_articles().unwrap(), None);
    build_router(AppState::new(config, None, blog, None), None)
}

/// Router with article storage backed by `articles`
pub fn app_with_articles(config: Config, articles: MockArticleRepository) -> Router {
    let repo: Arc<dyn ArticleRepository> = Arc::new(articles);
    let blog = BlogService::new(static_articles().unwrap(), Some(repo));
    build_router(AppState::new(config, None, blog, None), None)
}

/// Router with a payment service whose database is never reached.
///
/// Only paths that fail before touching storage are safe to exercise.
pub fn app_with_payments(config: Config) -> Router {
    let payment_config = config.payment_config().expect("stripe key in test config");
    let pool = create_pool("postgres://tidyhome@127.0.0.1:1/unused", PoolOptions::default()).unwrap();
    let repos = Repositories::new(pool);
    let payments = PaymentService::new(
        Arc::new(StripeProvider::new(payment_config.clone())),
        Arc::new(repos.bookings),
        Arc::new(repos.subscriptions),
        payment_config,
    );
    let blog = BlogService::new(static_articles().unwrap(), None);
    build_router(AppState::new(config, Some(payments), blog, None), None)
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// In-memory article storage
#[derive(Default, Clone)]
pub struct MockArticleRepository {
    pub rows: Arc<DashMap<String, ArticleRow>>,
}

#[async_trait]
impl ArticleRepository for MockArticleRepository {
    async fn list_published(&self) -> DbResult<Vec<ArticleRow>> {
        let now = Utc::now();
        Ok(self
            .rows
            .iter()
            .map(|r| r.value().clone())
            .filter(|row| row.published_at <= now)
            .collect())
    }

    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<ArticleRow>> {
        Ok(self.rows.get(slug).map(|r| r.value().clone()))
    }

    async fn upsert(&self, article: UpsertArticle) -> DbResult<ArticleRow> {
        let now = Utc::now();
        let row = ArticleRow {
            id: Uuid::new_v4(),
            slug: article.slug.clone(),
            title: article.title,
            excerpt: article.excerpt,
            content: article.content,
            author: article.author,
            image_url: article.image_url,
            category_id: article.category_id,
            category_name: article.category_name,
            category_slug: article.category_slug,
            tags: article.tags,
            published_at: article.published_at,
            read_time_minutes: article.read_time_minutes,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(article.slug, row.clone());
        Ok(row)
    }
}
