use std::sync::Arc;

use nd_core::Result;
use tokio::sync::OnceCell;
use tracing::info;

use crate::models::{create_model, InferenceModel, ModelConfig};

/// Lazily built model handle. Loading a model can be expensive, so the first
/// caller triggers the build and every later (or concurrent) caller reuses
/// the same instance; `OnceCell` guarantees the build runs at most once.
#[derive(Debug)]
pub struct LazyModel {
    config: ModelConfig,
    cell: OnceCell<Arc<dyn InferenceModel>>,
}

impl LazyModel {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Wrap an already-built model, used by tests to inject mocks.
    pub fn from_model(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            config: ModelConfig::default(),
            cell: OnceCell::new_with(Some(model)),
        }
    }

    pub async fn get(&self) -> Result<Arc<dyn InferenceModel>> {
        let model = self
            .cell
            .get_or_try_init(|| async {
                let model = create_model(&self.config).await?;
                info!("inference model initialized (using {})", model.name());
                Ok::<_, nd_core::Error>(model)
            })
            .await?;
        Ok(model.clone())
    }
}
