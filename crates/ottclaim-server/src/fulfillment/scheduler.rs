//! Background automation loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::workflow::FulfillmentService;

/// Largest batch a single run takes on.
pub const MAX_BATCH_SIZE: u32 = 500;

/// Spawn a task that runs a fulfillment batch every `interval` until
/// `shutdown` changes. Returns `None` for a zero interval. `batch_size` is
/// clamped to `1..=MAX_BATCH_SIZE`.
pub fn spawn_automation_task(
    service: Arc<FulfillmentService>,
    interval: Duration,
    batch_size: u32,
    mut shutdown: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        info!("Claim automation disabled");
        return None;
    }

    let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
    Some(tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.tick().await; // Skip first immediate tick

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    if let Err(e) = service.process_batch(batch_size).await {
                        warn!(error = %e, "Automation run failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("Automation task shutting down");
                    return;
                }
            }
        }
    }))
}
