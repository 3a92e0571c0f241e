//! Root chain liveness probe.

use std::sync::Arc;
use std::time::Duration;

use plasma_config::PING_INTERVAL_SECS;
use tokio::time::MissedTickBehavior;

use crate::manager::Inner;

/// Probe the root chain endpoint on a fixed cadence; a single failed probe
/// stops the node.
pub(crate) async fn run(inner: Arc<Inner>) {
    let mut ticker = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(err) = inner.gateway.sync_progress().await {
                    log::error!("Rootchain provider doesn't respond, err: {:#}", err);
                    (inner.stop_fn)();
                    return;
                }
            }
            _ = inner.quit_rx.recv() => return,
        }
    }
}
