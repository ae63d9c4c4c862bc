use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::registry::PresenceRegistry;

/// Run [`PresenceRegistry::cleanup_inactive_users`] every `every` until the
/// returned task is aborted.
pub fn spawn_sweeper(
    registry: PresenceRegistry,
    every: Duration,
    timeout_ms: i64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let evicted = registry.cleanup_inactive_users(timeout_ms).await;
            if !evicted.is_empty() {
                debug!(evicted = evicted.len(), "Presence sweep evicted users");
            }
        }
    })
}
