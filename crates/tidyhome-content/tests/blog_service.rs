//! Blog service tests against an in-memory article store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use tidyhome_content::{static_articles, BlogService, ContentError};
use tidyhome_db::{ArticleRepository, ArticleRow, DbError, DbResult, UpsertArticle};

#[derive(Default, Clone)]
struct MockArticleRepository {
    rows: Arc<DashMap<String, ArticleRow>>,
    broken: bool,
}

#[async_trait]
impl ArticleRepository for MockArticleRepository {
    async fn list_published(&self) -> DbResult<Vec<ArticleRow>> {
        if self.broken {
            return Err(DbError::Decode("connection reset".into()));
        }
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
            id: self
                .rows
                .get(&article.slug)
                .map(|r| r.id)
                .unwrap_or_else(Uuid::new_v4),
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

fn service(repo: &MockArticleRepository) -> BlogService {
    BlogService::new(static_articles().unwrap(), Some(Arc::new(repo.clone())))
}

#[tokio::test]
async fn test_ingested_article_is_listed_in_date_order() {
    let repo = MockArticleRepository::default();
    let blog = service(&repo);
    let body = br#"{"title":"Fresh Fridge","slug":"fresh-fridge","content":"a b c","published_at":"2026-01-01T00:00:00Z"}"#;

    let stored = blog.ingest(body, Utc::now()).await.unwrap();
    assert_eq!(stored.slug, "fresh-fridge");

    let list = blog.list().await;
    assert_eq!(list[0].slug, "fresh-fridge");
    assert!(list
        .windows(2)
        .all(|w| w[0].published_at >= w[1].published_at));
    assert_eq!(blog.get("fresh-fridge").await.unwrap().title, "Fresh Fridge");
}

#[tokio::test]
async fn test_scheduled_article_stays_hidden() {
    let repo = MockArticleRepository::default();
    let blog = service(&repo);
    let body = br#"{"title":"Spring Plan","slug":"spring-plan","published_at":"2099-03-01T00:00:00Z"}"#;
    blog.ingest(body, Utc::now()).await.unwrap();

    assert!(repo.rows.contains_key("spring-plan"));
    assert!(blog.list().await.iter().all(|a| a.slug != "spring-plan"));
    assert!(matches!(blog.get("spring-plan").await, Err(ContentError::NotFound)));
}

#[tokio::test]
async fn test_bundled_article_shadows_remote_copy() {
    let repo = MockArticleRepository::default();
    let blog = service(&repo);
    let body = br#"{"title":"Remote Copy","slug":"weekly-cleaning-checklist"}"#;
    blog.ingest(body, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
        .await
        .unwrap();

    let list = blog.list().await;
    let matches: Vec<_> = list
        .iter()
        .filter(|a| a.slug == "weekly-cleaning-checklist")
        .collect();
    assert_eq!(matches.len(), 1);
    assert_ne!(matches[0].title, "Remote Copy");
    assert_ne!(
        blog.get("weekly-cleaning-checklist").await.unwrap().title,
        "Remote Copy"
    );
}

#[tokio::test]
async fn test_storage_failure_serves_bundled_set() {
    let repo = MockArticleRepository {
        broken: true,
        ..Default::default()
    };
    let blog = service(&repo);

    let list = blog.list().await;
    assert_eq!(list.len(), static_articles().unwrap().len());
}

#[tokio::test]
async fn test_missing_slug_and_storage() {
    let blog = BlogService::new(static_articles().unwrap(), None);

    assert!(matches!(blog.get("nope").await, Err(ContentError::NotFound)));
    let err = blog
        .ingest(br#"{"title":"T","slug":"t"}"#, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::StorageUnavailable));

    let err = blog.ingest(br#"{"slug":"t"}"#, Utc::now()).await.unwrap_err();
    assert!(matches!(err, ContentError::InvalidPayload(_)));
}
