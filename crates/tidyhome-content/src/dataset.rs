//! Articles bundled with the binary

use tidyhome_types::BlogArticle;

use crate::error::{ContentError, ContentResult};

const ARTICLES_JSON: &str = include_str!("../data/articles.json");

/// Parse the bundled article set
pub fn static_articles() -> ContentResult<Vec<BlogArticle>> {
    parse_articles(ARTICLES_JSON)
}

pub(crate) fn parse_articles(json: &str) -> ContentResult<Vec<BlogArticle>> {
    serde_json::from_str(json).map_err(|e| ContentError::Dataset(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bundled_dataset_parses() {
        let articles = static_articles().unwrap();
        assert!(!articles.is_empty());

        let slugs: HashSet<_> = articles.iter().map(|a| a.slug.as_str()).collect();
        assert_eq!(slugs.len(), articles.len(), "bundled slugs must be unique");
    }

    #[test]
    fn test_malformed_dataset_is_reported() {
        let err = parse_articles("[{\"slug\": 1}]").unwrap_err();
        assert!(matches!(err, ContentError::Dataset(_)));
    }
}
