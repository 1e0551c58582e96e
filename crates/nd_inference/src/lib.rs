pub mod annotator;
pub mod lazy;
pub mod models;

pub use annotator::{Annotator, SUMMARY_FAILURE, UNCATEGORIZED};
pub use lazy::LazyModel;
pub use models::{create_model, InferenceModel, ModelConfig};

pub mod prelude {
    pub use super::{Annotator, InferenceModel, LazyModel, ModelConfig};
    pub use nd_core::{Result, Sentiment};
}
