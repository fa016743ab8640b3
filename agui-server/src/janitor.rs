//! Background eviction of idle thread state.

use std::sync::Arc;
use std::time::Duration;

use agui_core::ThreadStateStore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Sweep `store` every `interval`, evicting threads idle longer than `ttl`.
///
/// The task exits when `shutdown` is cancelled.
pub fn spawn_state_janitor(
    store: Arc<ThreadStateStore>,
    interval: Duration,
    ttl: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = store.cleanup(ttl);
                    if evicted > 0 {
                        tracing::info!(evicted, remaining = store.len(), "evicted idle thread state");
                    }
                }
            }
        }

        tracing::debug!("state janitor stopped");
    })
}
