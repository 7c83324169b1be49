// soundcoin-core/src/tasks/session_sweep.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};
use crate::services::PlaybackService;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawns a background task that periodically closes player sessions idle
/// for longer than `max_idle`. Stops once `shutdown_rx` flips to true.
pub fn spawn_session_sweep_task(
    playback: Arc<PlaybackService>,
    interval: Duration,
    max_idle: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sleep(interval) => {
                    let closed = playback.close_idle_sessions(max_idle);
                    if closed > 0 {
                        info!("closed {} idle player session(s); {} live", closed, playback.session_count());
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        debug!("session sweep stopping");
                        break;
                    }
                }
            }
        }
    })
}
