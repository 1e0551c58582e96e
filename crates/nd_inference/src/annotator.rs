use std::sync::Arc;

use nd_core::Sentiment;
use tracing::warn;

use crate::lazy::LazyModel;
use crate::models::InferenceModel;

/// Marker returned when the summarizer fails on a text.
pub const SUMMARY_FAILURE: &str = "Summarization failed.";
/// Marker returned when the categorizer fails on a text.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Inputs shorter than this are returned verbatim; there is nothing
/// meaningful to compress.
const MIN_SUMMARY_WORDS: usize = 50;

/// Fallback layer over the inference model. Every method returns a value,
/// never an error: a failing adapter degrades to a fixed marker so one bad
/// record or a broken model endpoint cannot abort an enrichment batch or
/// turn a direct API call into a 5xx.
#[derive(Clone)]
pub struct Annotator {
    model: Arc<LazyModel>,
}

impl Annotator {
    pub fn new(model: Arc<LazyModel>) -> Self {
        Self { model }
    }

    async fn model(&self) -> Option<Arc<dyn InferenceModel>> {
        match self.model.get().await {
            Ok(model) => Some(model),
            Err(e) => {
                warn!("inference model unavailable: {}", e);
                None
            }
        }
    }

    pub async fn summarize(&self, text: &str) -> String {
        if text.split_whitespace().count() < MIN_SUMMARY_WORDS {
            return text.to_string();
        }

        let Some(model) = self.model().await else {
            return SUMMARY_FAILURE.to_string();
        };
        match model.summarize(text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("summarization failed: {}", e);
                SUMMARY_FAILURE.to_string()
            }
        }
    }

    pub async fn categorize(&self, text: &str) -> String {
        let Some(model) = self.model().await else {
            return UNCATEGORIZED.to_string();
        };
        match model.categorize(text).await {
            Ok(category) => category,
            Err(e) => {
                warn!("categorization failed: {}", e);
                UNCATEGORIZED.to_string()
            }
        }
    }

    pub async fn sentiment(&self, text: &str) -> Sentiment {
        let Some(model) = self.model().await else {
            return Sentiment::unknown();
        };
        match model.sentiment(text).await {
            Ok(sentiment) => sentiment,
            Err(e) => {
                warn!("sentiment analysis failed: {}", e);
                Sentiment::unknown()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nd_core::{Error, Result};

    #[derive(Debug)]
    struct FailingModel;

    #[async_trait]
    impl InferenceModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        async fn summarize(&self, _text: &str) -> Result<String> {
            Err(Error::Inference("boom".to_string()))
        }

        async fn categorize(&self, _text: &str) -> Result<String> {
            Err(Error::Inference("boom".to_string()))
        }

        async fn sentiment(&self, _text: &str) -> Result<Sentiment> {
            Err(Error::Inference("boom".to_string()))
        }
    }

    fn failing_annotator() -> Annotator {
        Annotator::new(Arc::new(LazyModel::from_model(Arc::new(FailingModel))))
    }

    fn long_text() -> String {
        std::iter::repeat("word").take(80).collect::<Vec<_>>().join(" ")
    }

    #[tokio::test]
    async fn short_input_is_returned_verbatim() {
        let annotator = failing_annotator();
        let text = "Too short to summarize.";
        assert_eq!(annotator.summarize(text).await, text);
    }

    #[tokio::test]
    async fn summarizer_error_yields_fixed_marker() {
        let annotator = failing_annotator();
        assert_eq!(annotator.summarize(&long_text()).await, SUMMARY_FAILURE);
    }

    #[tokio::test]
    async fn categorizer_error_yields_uncategorized() {
        let annotator = failing_annotator();
        assert_eq!(annotator.categorize("anything").await, UNCATEGORIZED);
    }

    #[tokio::test]
    async fn sentiment_error_yields_unknown_with_zero_score() {
        let annotator = failing_annotator();
        let sentiment = annotator.sentiment("anything").await;
        assert_eq!(sentiment, Sentiment::unknown());
    }

    #[tokio::test]
    async fn healthy_model_results_pass_through() {
        let annotator = Annotator::new(Arc::new(LazyModel::from_model(Arc::new(
            crate::models::HeuristicModel::new(),
        ))));
        let text = format!("A great success story. {}", long_text());
        assert_ne!(annotator.summarize(&text).await, SUMMARY_FAILURE);
        let sentiment = annotator.sentiment(&text).await;
        assert_eq!(sentiment.label, "POSITIVE");
    }
}
