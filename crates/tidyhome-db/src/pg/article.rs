//! PostgreSQL blog article repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::ArticleRow;
use crate::repo::{ArticleRepository, UpsertArticle};

const ARTICLE_COLUMNS: &str = r#"
    id, slug, title, excerpt, content, author, image_url, category_id,
    category_name, category_slug, tags, published_at, read_time_minutes,
    created_at, updated_at
"#;

/// PostgreSQL blog article repository
#[derive(Clone)]
pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    /// Create a new article repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn list_published(&self) -> DbResult<Vec<ArticleRow>> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            r#"
            SELECT {ARTICLE_COLUMNS}
            FROM blog_articles
            WHERE published_at <= NOW()
            ORDER BY published_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_by_slug(&self, slug: &str) -> DbResult<Option<ArticleRow>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM blog_articles WHERE slug = $1 AND published_at <= NOW()"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert(&self, article: UpsertArticle) -> DbResult<ArticleRow> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            r#"
            INSERT INTO blog_articles (id, slug, title, excerpt, content, author, image_url,
                                       category_id, category_name, category_slug, tags,
                                       published_at, read_time_minutes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (slug) DO UPDATE SET
                title = EXCLUDED.title,
                excerpt = EXCLUDED.excerpt,
                content = EXCLUDED.content,
                author = EXCLUDED.author,
                image_url = EXCLUDED.image_url,
                category_id = EXCLUDED.category_id,
                category_name = EXCLUDED.category_name,
                category_slug = EXCLUDED.category_slug,
                tags = EXCLUDED.tags,
                published_at = EXCLUDED.published_at,
                read_time_minutes = EXCLUDED.read_time_minutes,
                updated_at = NOW()
            RETURNING {ARTICLE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&article.slug)
        .bind(&article.title)
        .bind(&article.excerpt)
        .bind(&article.content)
        .bind(&article.author)
        .bind(&article.image_url)
        .bind(&article.category_id)
        .bind(&article.category_name)
        .bind(&article.category_slug)
        .bind(&article.tags)
        .bind(article.published_at)
        .bind(article.read_time_minutes)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
