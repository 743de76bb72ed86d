use std::time::Duration;

use tracing::debug;

use crate::state::AppState;

/// Background housekeeping: every minute, drop expired listing snapshots and
/// forget idle rate-limiter clients. Purely about memory; correctness never
/// depends on this running, since reads check expiry themselves.
pub fn start(state: AppState) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            let evicted = state.listing_cache.evict_expired().await;
            if evicted > 0 {
                debug!(evicted, "dropped expired listing cache entries");
            }
            state.limiter.sweep_idle().await;
        }
    });
}
