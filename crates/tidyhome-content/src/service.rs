//! Merged blog view and content ingestion

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use tidyhome_db::ArticleRepository;
use tidyhome_types::BlogArticle;

use crate::error::{ContentError, ContentResult};
use crate::merge::merge_articles;
use crate::rankpill::RankPillArticle;

/// Blog reads and RankPill writes
#[derive(Clone)]
pub struct BlogService {
    static_articles: Arc<Vec<BlogArticle>>,
    articles: Option<Arc<dyn ArticleRepository>>,
}

impl BlogService {
    /// Create a service over the bundled set and optional storage
    pub fn new(static_articles: Vec<BlogArticle>, articles: Option<Arc<dyn ArticleRepository>>) -> Self {
        Self {
            static_articles: Arc::new(static_articles),
            articles,
        }
    }

    /// All articles, newest first. Storage failures fall back to the bundled set.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Vec<BlogArticle> {
        let remote = match &self.articles {
            Some(repo) => match repo.list_published().await {
                Ok(rows) => rows.into_iter().map(BlogArticle::from).collect(),
                Err(e) => {
                    warn!(error = %e, "Remote articles unavailable, serving bundled set");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        merge_articles(self.static_articles.as_ref().clone(), remote)
    }

    /// One published article by slug, bundled first
    #[instrument(skip(self))]
    pub async fn get(&self, slug: &str) -> ContentResult<BlogArticle> {
        if let Some(article) = self.static_articles.iter().find(|a| a.slug == slug) {
            return Ok(article.clone());
        }

        let Some(repo) = &self.articles else {
            return Err(ContentError::NotFound);
        };
        match repo.find_by_slug(slug).await {
            Ok(Some(row)) if row.published_at <= Utc::now() => Ok(row.into()),
            Ok(Some(_)) => Err(ContentError::NotFound),
            Ok(None) => Err(ContentError::NotFound),
            Err(e) => {
                warn!(error = %e, slug, "Article lookup failed");
                Err(ContentError::NotFound)
            }
        }
    }

    /// Store an authenticated RankPill delivery
    #[instrument(skip(self, body, now))]
    pub async fn ingest(&self, body: &[u8], now: DateTime<Utc>) -> ContentResult<BlogArticle> {
        let upsert = RankPillArticle::from_body(body)?.into_upsert(now)?;
        let repo = self.articles.as_ref().ok_or(ContentError::StorageUnavailable)?;

        let row = repo.upsert(upsert).await?;
        info!(slug = %row.slug, "Article upserted from RankPill");
        metrics::counter!("content_articles_ingested_total").increment(1);
        Ok(row.into())
    }
}
