use async_trait::async_trait;
use nd_core::{Article, Result};

pub mod rss;

pub use rss::RssSource;

/// A configured news origin: lists candidate article URLs and fetches one
/// article. Both calls hit the network and may fail per candidate; the
/// pipeline decides what failure means.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Origin label stored on every article from this source.
    fn source(&self) -> &str;

    /// Candidate article URLs, not yet fetched or validated.
    async fn list_candidates(&self) -> Result<Vec<String>>;

    /// Fetch and parse a single article.
    async fn fetch_article(&self, url: &str) -> Result<Article>;
}
