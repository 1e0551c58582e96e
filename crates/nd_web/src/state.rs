use std::sync::Arc;

use nd_core::ArticleStore;
use nd_inference::Annotator;
use nd_ingest::Pipeline;

pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub annotator: Annotator,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            store: pipeline.store(),
            annotator: pipeline.annotator().clone(),
            pipeline,
        }
    }
}
