//! Static and remote article merge

use std::collections::HashSet;

use tidyhome_types::BlogArticle;

/// Combine bundled and remote articles.
///
/// A remote article whose slug already exists in the bundled set is dropped.
/// The result is ordered newest first.
pub fn merge_articles(static_articles: Vec<BlogArticle>, remote: Vec<BlogArticle>) -> Vec<BlogArticle> {
    let mut seen: HashSet<String> = static_articles.iter().map(|a| a.slug.clone()).collect();

    let mut merged = static_articles;
    merged.extend(remote.into_iter().filter(|a| seen.insert(a.slug.clone())));
    merged.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    merged
}
