use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use nd_core::{Error, Result, Sentiment};

pub mod heuristic;
pub mod remote;

pub use heuristic::HeuristicModel;
pub use remote::RemoteModel;

/// The three annotation tasks applied to article text. Implementations may
/// fail; the fallback policy lives in the [`crate::Annotator`], not here.
#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    async fn summarize(&self, text: &str) -> Result<String>;

    async fn categorize(&self, text: &str) -> Result<String>;

    async fn sentiment(&self, text: &str) -> Result<Sentiment>;
}

#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    pub model: String,
    pub model_url: Option<String>,
    pub api_key: Option<String>,
}

/// Build a model from its CLI name.
pub async fn create_model(config: &ModelConfig) -> Result<Arc<dyn InferenceModel>> {
    match config.model.as_str() {
        "" | "heuristic" => Ok(Arc::new(HeuristicModel::new())),
        "remote" => Ok(Arc::new(RemoteModel::new(
            config.model_url.clone(),
            config.api_key.clone(),
        )?)),
        other => Err(Error::Inference(format!("unknown model: {}", other))),
    }
}
