//! robots.txt and sitemap.xml from the public directory

use std::path::Path;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

const CACHE_CONTROL: &str = "public, max-age=3600";

/// GET /robots.txt
pub async fn robots_txt(State(state): State<AppState>) -> Response {
    serve_text(&state.config.public_dir, "robots.txt", "text/plain; charset=utf-8").await
}

/// GET /sitemap.xml
pub async fn sitemap_xml(State(state): State<AppState>) -> Response {
    serve_text(&state.config.public_dir, "sitemap.xml", "application/xml; charset=utf-8").await
}

async fn serve_text(dir: &Path, name: &str, content_type: &'static str) -> Response {
    match tokio::fs::read_to_string(dir.join(name)).await {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, content_type),
                (header::CACHE_CONTROL, CACHE_CONTROL),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(file = name, error = %e, "Static file unavailable");
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("{name} not found"),
            )
                .into_response()
        }
    }
}
