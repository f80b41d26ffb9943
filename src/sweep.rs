//! Idle client sweep: drops live guards of clients that went quiet.
//!
//! DESIGN
//! ======
//! A background task wakes periodically and evicts client slots idle longer
//! than the configured TTL. Only the in-memory guard is dropped; a persisted
//! session is restored on the client's next request.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::AppState;

const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Sweep cadence for a given TTL: a quarter of it, clamped to 1s..=60s.
#[must_use]
pub fn sweep_interval(ttl: Duration) -> Duration {
    (ttl / 4).clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL)
}

/// Spawn the background sweep task. Returns a handle for shutdown.
pub fn spawn_idle_sweep(state: AppState, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval(ttl));
        loop {
            interval.tick().await;
            let evicted = state.evict_idle(ttl).await;
            if evicted > 0 {
                debug!(evicted, "evicted idle clients");
            }
        }
    })
}
