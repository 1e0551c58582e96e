pub mod pipeline;
pub mod scheduler;
pub mod sources;

pub use pipeline::{CycleReport, Pipeline};
pub use scheduler::Scheduler;
pub use sources::{NewsSource, RssSource};

pub mod prelude {
    pub use super::pipeline::Pipeline;
    pub use super::sources::NewsSource;
    pub use nd_core::{Article, Error, Result, SourceFeed};
}
