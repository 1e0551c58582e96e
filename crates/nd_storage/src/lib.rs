use std::path::Path;
use std::sync::Arc;

use nd_core::{ArticleStore, Error, Result};

pub mod backends;

pub use backends::memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use backends::sqlite::SqliteStorage;

/// Build a store backend from its CLI name.
#[cfg_attr(not(feature = "sqlite"), allow(unused_variables))]
pub async fn create_store(kind: &str, db_path: Option<&Path>) -> Result<Arc<dyn ArticleStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStorage::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = db_path
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| std::path::PathBuf::from("newsdesk.db"));
            Ok(Arc::new(backends::sqlite::SqliteStorage::open(&path).await?))
        }
        other => Err(Error::Storage(format!(
            "unknown storage backend: {}",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::backends::memory::MemoryStorage;
    pub use nd_core::{Article, ArticleStore, Result};
}
