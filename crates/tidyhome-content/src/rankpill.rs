//! RankPill content webhook
//!
//! RankPill signs the raw body with HMAC-SHA256 and sends the hex digest in
//! `x-rankpill-signature`. Older integrations send the shared secret as a
//! bearer token instead. Either is accepted.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

use tidyhome_db::UpsertArticle;

use crate::error::{ContentError, ContentResult};

/// Header carrying the body signature
pub const SIGNATURE_HEADER: &str = "x-rankpill-signature";

const WORDS_PER_MINUTE: usize = 200;

/// Check a delivery against the shared secret
pub fn authenticate(
    secret: &str,
    body: &[u8],
    signature: Option<&str>,
    authorization: Option<&str>,
) -> ContentResult<()> {
    if let Some(signature) = signature {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .map_err(|_| ContentError::Unauthorized)?;
        mac.update(body);
        let expected = hex::encode(mac.finalize().into_bytes());
        if bool::from(signature.trim().as_bytes().ct_eq(expected.as_bytes())) {
            return Ok(());
        }
        warn!("RankPill signature mismatch");
    }

    if let Some(token) = authorization.and_then(|h| h.strip_prefix("Bearer ")) {
        if bool::from(token.as_bytes().ct_eq(secret.as_bytes())) {
            return Ok(());
        }
    }

    Err(ContentError::Unauthorized)
}

/// Article as pushed by RankPill
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankPillArticle {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, alias = "content_html", alias = "html")]
    pub content: Option<String>,
    #[serde(default, alias = "meta_description", alias = "description")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "featured_image", alias = "featured_image_url")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read_time_minutes: Option<i32>,
}

impl RankPillArticle {
    /// Decode a delivery body; the article may sit under `data` or `article`
    pub fn from_body(body: &[u8]) -> ContentResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ContentError::InvalidPayload(e.to_string()))?;

        let inner = ["data", "article"]
            .iter()
            .find_map(|key| value.get(key).filter(|v| v.is_object()).cloned())
            .unwrap_or(value);

        serde_json::from_value(inner).map_err(|e| ContentError::InvalidPayload(e.to_string()))
    }

    /// Map onto a storage upsert
    pub fn into_upsert(self, now: DateTime<Utc>) -> ContentResult<UpsertArticle> {
        let title = non_empty(self.title)
            .ok_or_else(|| ContentError::InvalidPayload("title is required".into()))?;
        let slug = non_empty(self.slug)
            .ok_or_else(|| ContentError::InvalidPayload("slug is required".into()))?;

        let content = self.content.unwrap_or_default();
        let read_time_minutes = self
            .read_time_minutes
            .or_else(|| Some(estimate_read_time(&content)));
        let category = non_empty(self.category);

        Ok(UpsertArticle {
            slug,
            title,
            excerpt: self.excerpt.unwrap_or_default(),
            author: non_empty(self.author),
            image_url: non_empty(self.image_url),
            category_id: category.as_deref().map(slugify),
            category_slug: category.as_deref().map(slugify),
            category_name: category,
            tags: self.tags,
            published_at: self.published_at.unwrap_or(now),
            read_time_minutes,
            content,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn estimate_read_time(content: &str) -> i32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i32
}

fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
