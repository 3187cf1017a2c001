//! Liveness driver.
//!
//! A background task ticks the Hub at the configured interval; the Hub
//! decides when a tick becomes a ping round. The task exits on the shutdown
//! broadcast so evicted sessions are not pinged mid-teardown.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::Hub;

/// Spawn the liveness tick task.
pub(crate) fn spawn(hub: Arc<Hub>) -> JoinHandle<()> {
    // Subscribe before spawning so a shutdown signalled immediately after
    // this call is never missed.
    let mut shutdown_rx = hub.subscribe_shutdown();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(hub.config().tick_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    hub.liveness_tick();
                }
                _ = shutdown_rx.recv() => {
                    debug!("Liveness task stopping");
                    break;
                }
            }
        }
    })
}
