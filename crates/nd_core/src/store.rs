use std::collections::HashSet;

use async_trait::async_trait;

use crate::types::{Article, Sentiment};
use crate::Result;

/// Persistence contract for article records, keyed by URL.
///
/// Pending records are those without a summary; enrichment writes summary,
/// category and sentiment together and is one-way. Implementations must make
/// `insert_if_absent` safe under concurrent callers (unique key on URL,
/// ignore-on-conflict) so overlapping ingestion runs cannot duplicate rows.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Every URL currently in the store, fetched in one query.
    async fn all_urls(&self) -> Result<HashSet<String>>;

    /// Insert a new record. Returns false when the URL already exists.
    async fn insert_if_absent(&self, article: &Article) -> Result<bool>;

    /// Records still waiting for enrichment.
    async fn pending(&self) -> Result<Vec<Article>>;

    /// Attach all three enrichment fields to the record with this URL in a
    /// single update. Returns false when no such record exists.
    async fn apply_enrichment(
        &self,
        url: &str,
        summary: &str,
        category: &str,
        sentiment: &Sentiment,
    ) -> Result<bool>;

    /// Enriched records, newest first, bounded by `limit`.
    async fn latest_enriched(&self, limit: usize) -> Result<Vec<Article>>;
}
