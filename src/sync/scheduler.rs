//! Periodic trigger for sync cycles.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::engine::{SyncEngine, SyncOutcome};
use crate::fetch::PageFetcher;

/// Default time between sync cycles.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Calls [`SyncEngine::sync`] every `period` until `shutdown` resolves.
///
/// The first cycle runs one period after start. Failures are logged and the
/// next tick tries again from wherever the cursor was left. Ticks missed
/// while a slow cycle runs are dropped rather than queued.
pub async fn run_scheduler<F, S>(engine: Arc<SyncEngine<F>>, period: Duration, shutdown: S)
where
    F: PageFetcher + 'static,
    S: Future<Output = ()>,
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    tracing::info!("Sync scheduled every {}s", period.as_secs());

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Sync scheduler stopping");
                break;
            }
            _ = ticker.tick() => {
                match engine.sync().await {
                    Ok(SyncOutcome::Completed(_)) | Ok(SyncOutcome::Skipped) => {}
                    Err(e) => tracing::error!("Scheduled sync failed: {}", e),
                }
            }
        }
    }
}
