use std::sync::Arc;

use nd_core::{ArticleStore, Result};
use nd_inference::Annotator;
use tracing::{info, warn};

use crate::sources::NewsSource;

/// Counts from one ingestion-then-enrichment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub ingested: usize,
    pub enriched: usize,
}

/// The incremental ingestion-and-annotation pipeline.
///
/// Ingestion deduplicates by URL against the store, enrichment drains the
/// pending set, and both steps isolate per-candidate failures so a single bad
/// article never aborts a run. Only store errors propagate: continuing
/// without durable writes would lose data silently.
pub struct Pipeline {
    store: Arc<dyn ArticleStore>,
    annotator: Annotator,
    sources: Vec<Arc<dyn NewsSource>>,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        annotator: Annotator,
        sources: Vec<Arc<dyn NewsSource>>,
    ) -> Self {
        Self {
            store,
            annotator,
            sources,
        }
    }

    pub fn store(&self) -> Arc<dyn ArticleStore> {
        self.store.clone()
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    /// Scrape all configured sources, inserting articles whose URL the store
    /// has not seen. Returns the number of newly inserted records.
    pub async fn ingest(&self) -> Result<usize> {
        // One snapshot up front instead of an existence check per candidate.
        // Inserted URLs are added to it so later sources in the same run see
        // them; the store's own URL key covers races with concurrent runs.
        let mut known = self.store.all_urls().await?;
        info!("starting ingestion, {} urls already stored", known.len());

        let mut inserted = 0;
        for source in &self.sources {
            let candidates = match source.list_candidates().await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!("source {} discovery failed: {}", source.source(), e);
                    continue;
                }
            };

            for url in candidates {
                if known.contains(&url) {
                    continue;
                }

                let article = match source.fetch_article(&url).await {
                    Ok(article) => article,
                    Err(e) => {
                        warn!("failed to fetch {}: {}", url, e);
                        continue;
                    }
                };

                // A candidate is a real article only with both fields set.
                if article.title.is_empty() || article.text.is_empty() {
                    continue;
                }

                if self.store.insert_if_absent(&article).await? {
                    known.insert(url);
                    inserted += 1;
                }
            }
        }

        info!("ingestion complete, {} new articles", inserted);
        Ok(inserted)
    }

    /// Run all three annotations over every pending record and write the
    /// results back in one update per record. Returns the number processed.
    pub async fn enrich_pending(&self) -> Result<usize> {
        let pending = self.store.pending().await?;
        if pending.is_empty() {
            return Ok(0);
        }
        info!("enriching {} pending articles", pending.len());

        for article in &pending {
            // Each call falls back internally, so all three always run.
            let (summary, category, sentiment) = tokio::join!(
                self.annotator.summarize(&article.text),
                self.annotator.categorize(&article.text),
                self.annotator.sentiment(&article.text),
            );

            if !self
                .store
                .apply_enrichment(&article.url, &summary, &category, &sentiment)
                .await?
            {
                warn!("article disappeared before enrichment: {}", article.url);
            }
        }

        Ok(pending.len())
    }

    /// One full cycle: ingest, then enrich. Enrichment runs regardless of
    /// how many articles just arrived, so records left pending by an earlier
    /// interrupted pass get drained on the next fire.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let ingested = self.ingest().await?;
        let enriched = self.enrich_pending().await?;
        let report = CycleReport { ingested, enriched };
        info!(
            "cycle complete: {} ingested, {} enriched",
            report.ingested, report.enriched
        );
        Ok(report)
    }
}
