pub mod error;
pub mod store;
pub mod types;

pub use error::Error;
pub use store::ArticleStore;
pub use types::{Article, Sentiment, SourceFeed};

pub type Result<T> = std::result::Result<T, Error>;
