use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use nd_core::{Article, ArticleStore, Result, Sentiment};
use tokio::sync::RwLock;

/// Plain map keyed by URL; the outer storage wraps it in an RwLock.
#[derive(Default)]
pub struct MemoryStore {
    articles: HashMap<String, Article>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all_urls(&self) -> HashSet<String> {
        self.articles.keys().cloned().collect()
    }

    pub fn insert_if_absent(&mut self, article: &Article) -> bool {
        match self.articles.entry(article.url.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(article.clone());
                true
            }
        }
    }

    pub fn pending(&self) -> Vec<Article> {
        self.articles
            .values()
            .filter(|a| !a.is_enriched())
            .cloned()
            .collect()
    }

    pub fn apply_enrichment(
        &mut self,
        url: &str,
        summary: &str,
        category: &str,
        sentiment: &Sentiment,
    ) -> bool {
        match self.articles.get_mut(url) {
            Some(article) => {
                article.summary = Some(summary.to_string());
                article.category = Some(category.to_string());
                article.sentiment = Some(sentiment.clone());
                true
            }
            None => false,
        }
    }

    pub fn latest_enriched(&self, limit: usize) -> Vec<Article> {
        let mut articles: Vec<Article> = self
            .articles
            .values()
            .filter(|a| a.is_enriched())
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.truncate(limit);
        articles
    }
}

/// In-memory backend, the default when no database is configured.
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for MemoryStorage {
    async fn all_urls(&self) -> Result<HashSet<String>> {
        let store = self.store.read().await;
        Ok(store.all_urls())
    }

    async fn insert_if_absent(&self, article: &Article) -> Result<bool> {
        let mut store = self.store.write().await;
        Ok(store.insert_if_absent(article))
    }

    async fn pending(&self) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.pending())
    }

    async fn apply_enrichment(
        &self,
        url: &str,
        summary: &str,
        category: &str,
        sentiment: &Sentiment,
    ) -> Result<bool> {
        let mut store = self.store.write().await;
        Ok(store.apply_enrichment(url, summary, category, sentiment))
    }

    async fn latest_enriched(&self, limit: usize) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.latest_enriched(limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn article(url: &str) -> Article {
        Article::new(url, "Title", "Some body text", "test", Utc::now())
    }

    #[tokio::test]
    async fn insert_is_idempotent() {
        let storage = MemoryStorage::new();
        assert!(storage.insert_if_absent(&article("http://a")).await.unwrap());
        assert!(!storage.insert_if_absent(&article("http://a")).await.unwrap());
        assert_eq!(storage.all_urls().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn enrichment_moves_record_out_of_pending() {
        let storage = MemoryStorage::new();
        storage.insert_if_absent(&article("http://a")).await.unwrap();
        storage.insert_if_absent(&article("http://b")).await.unwrap();
        assert_eq!(storage.pending().await.unwrap().len(), 2);

        let updated = storage
            .apply_enrichment("http://a", "summary", "Technology", &Sentiment::new("POSITIVE", 0.9))
            .await
            .unwrap();
        assert!(updated);
        assert_eq!(storage.pending().await.unwrap().len(), 1);

        let enriched = storage.latest_enriched(10).await.unwrap();
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].summary.as_deref(), Some("summary"));
        assert_eq!(enriched[0].category.as_deref(), Some("Technology"));
    }

    #[tokio::test]
    async fn enrichment_of_unknown_url_reports_false() {
        let storage = MemoryStorage::new();
        let updated = storage
            .apply_enrichment("http://missing", "s", "c", &Sentiment::unknown())
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn latest_enriched_sorts_newest_first_and_respects_limit() {
        let storage = MemoryStorage::new();
        let now = Utc::now();
        for (i, url) in ["http://a", "http://b", "http://c"].iter().enumerate() {
            let mut a = article(url);
            a.published_at = now - Duration::hours(i as i64);
            storage.insert_if_absent(&a).await.unwrap();
            storage
                .apply_enrichment(url, "s", "c", &Sentiment::unknown())
                .await
                .unwrap();
        }

        let enriched = storage.latest_enriched(2).await.unwrap();
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].url, "http://a");
        assert_eq!(enriched[1].url, "http://b");
    }

    #[tokio::test]
    async fn concurrent_inserts_keep_urls_unique() {
        let storage = Arc::new(MemoryStorage::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..20 {
                    let _ = storage
                        .insert_if_absent(&article(&format!("http://dup/{}", i)))
                        .await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(storage.all_urls().await.unwrap().len(), 20);
    }
}
