use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored news article. Enrichment fields stay `None` until the
/// enrichment pass writes all three of them in a single update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub text: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub sentiment: Option<Sentiment>,
}

impl Article {
    /// Build a freshly scraped article with no enrichment attached.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        source: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            text: text.into(),
            source: source.into(),
            published_at,
            summary: None,
            category: None,
            sentiment: None,
        }
    }

    /// A non-null summary is the marker for "this record went through
    /// enrichment"; category and sentiment are written alongside it.
    pub fn is_enriched(&self) -> bool {
        self.summary.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f32,
}

impl Sentiment {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }

    /// Neutral fallback used when the sentiment model is unavailable.
    pub fn unknown() -> Self {
        Self::new("UNKNOWN", 0.0)
    }
}

/// A configured syndication feed, read-only at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFeed {
    pub name: String,
    pub url: String,
}

impl SourceFeed {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
