use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use nd_core::{Article, ArticleStore, Error, Result, Sentiment};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        url TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        text TEXT NOT NULL,
        source TEXT NOT NULL,
        published_at TEXT NOT NULL,
        summary TEXT,
        category TEXT,
        sentiment TEXT
    )
    "#,
    // Add future migrations here
];

/// SQLite backend. The primary key on `url` backs `insert_if_absent` via
/// `INSERT OR IGNORE`, which keeps concurrent ingestion runs from racing a
/// duplicate row in.
pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl SqliteStorage {
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Storage(format!("failed to open database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Storage(format!("failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let sentiment = match row.get::<Option<String>, _>("sentiment") {
        Some(json) => Some(serde_json::from_str::<Sentiment>(&json)?),
        None => None,
    };

    Ok(Article {
        url: row.get("url"),
        title: row.get("title"),
        text: row.get("text"),
        source: row.get("source"),
        published_at: chrono::DateTime::parse_from_rfc3339(&row.get::<String, _>("published_at"))
            .map_err(|e| Error::Storage(format!("failed to parse date: {}", e)))?
            .with_timezone(&chrono::Utc),
        summary: row.get("summary"),
        category: row.get("category"),
        sentiment,
    })
}

#[async_trait]
impl ArticleStore for SqliteStorage {
    async fn all_urls(&self) -> Result<HashSet<String>> {
        let rows = sqlx::query("SELECT url FROM articles")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to list urls: {}", e)))?;

        Ok(rows.iter().map(|row| row.get("url")).collect())
    }

    async fn insert_if_absent(&self, article: &Article) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO articles
            (url, title, text, source, published_at, summary, category, sentiment)
            VALUES (?, ?, ?, ?, ?, NULL, NULL, NULL)
            "#,
        )
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.text)
        .bind(&article.source)
        .bind(article.published_at.to_rfc3339())
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("failed to insert article: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn pending(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query("SELECT * FROM articles WHERE summary IS NULL")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Storage(format!("failed to query pending articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn apply_enrichment(
        &self,
        url: &str,
        summary: &str,
        category: &str,
        sentiment: &Sentiment,
    ) -> Result<bool> {
        let sentiment_json = serde_json::to_string(sentiment)?;
        let result = sqlx::query(
            "UPDATE articles SET summary = ?, category = ?, sentiment = ? WHERE url = ?",
        )
        .bind(summary)
        .bind(category)
        .bind(sentiment_json)
        .bind(url)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("failed to update article: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn latest_enriched(&self, limit: usize) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM articles
            WHERE summary IS NOT NULL
            ORDER BY published_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("failed to query enriched articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn article(url: &str) -> Article {
        Article::new(url, "Title", "Body", "test", Utc::now())
    }

    #[tokio::test]
    async fn duplicate_insert_is_ignored() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::open(&dir.path().join("test.db")).await.unwrap();

        assert!(storage.insert_if_absent(&article("http://a")).await.unwrap());
        assert!(!storage.insert_if_absent(&article("http://a")).await.unwrap());
        assert_eq!(storage.all_urls().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn enrichment_roundtrip() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::open(&dir.path().join("test.db")).await.unwrap();

        storage.insert_if_absent(&article("http://a")).await.unwrap();
        assert_eq!(storage.pending().await.unwrap().len(), 1);

        let sentiment = Sentiment::new("NEGATIVE", 0.7);
        assert!(storage
            .apply_enrichment("http://a", "a summary", "Business", &sentiment)
            .await
            .unwrap());

        assert!(storage.pending().await.unwrap().is_empty());
        let enriched = storage.latest_enriched(5).await.unwrap();
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].sentiment.as_ref().unwrap(), &sentiment);
    }
}
