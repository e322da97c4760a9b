//! The liveness ticker: a single periodic task that pings every session and
//! disconnects whoever has too many unanswered pings outstanding.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;

use crate::world::World;

/// Runs until `shutdown` is cancelled, waking every `world.config.ping_interval`
/// to sweep a snapshot of all sessions. Each session's own ping/disconnect
/// decision runs independently of the others and of their own read loops.
pub async fn run(world: Arc<World>, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(world.config.ping_interval);
    // The first tick fires immediately; the ticker should wait one full
    // interval before its first sweep.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }

        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        for session in world.all_sessions() {
            session.tick_liveness(&world, now_millis).await;
        }
    }
}
