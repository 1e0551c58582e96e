use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::pipeline::Pipeline;

/// Drives `run_cycle` on a fixed interval from a background task. The first
/// tick fires immediately, so a cycle runs at startup. Cycle errors are
/// logged and the timer keeps going; a manual trigger overlapping a
/// scheduled fire is tolerated by the pipeline itself.
pub struct Scheduler;

impl Scheduler {
    pub fn spawn(pipeline: Arc<Pipeline>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("scheduler started, cycle every {}s", every.as_secs());
            let mut tick = tokio::time::interval(every);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tick.tick().await;
                match pipeline.run_cycle().await {
                    Ok(report) => info!(
                        "scheduled cycle done: {} ingested, {} enriched",
                        report.ingested, report.enriched
                    ),
                    Err(e) => error!("scheduled cycle failed: {}", e),
                }
            }
        })
    }
}
