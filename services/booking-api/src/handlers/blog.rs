//! Blog read handlers

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use tidyhome_types::BlogArticle;

use crate::error::ApiResult;
use crate::handlers::shared::{success, Success};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ArticleList {
    pub count: usize,
    pub articles: Vec<BlogArticle>,
}

#[derive(Debug, Serialize)]
pub struct ArticleDetail {
    pub article: BlogArticle,
}

/// GET /api/blog/articles
pub async fn list_articles(State(state): State<AppState>) -> Json<Success<ArticleList>> {
    let articles = state.blog.list().await;
    success(ArticleList {
        count: articles.len(),
        articles,
    })
}

/// GET /api/blog/articles/{slug}
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Success<ArticleDetail>>> {
    let article = state.blog.get(&slug).await?;
    Ok(success(ArticleDetail { article }))
}
