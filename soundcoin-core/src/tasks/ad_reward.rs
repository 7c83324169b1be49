// soundcoin-core/src/tasks/ad_reward.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;
use soundcoin_common::models::Ad;
use crate::services::AdService;

/// Spawns the timer that credits a session ad once its nominal duration has
/// elapsed. Cancelling `cancel` before then drops the reward.
pub fn spawn_ad_reward_task(
    ad_service: Arc<AdService>,
    user_id: Uuid,
    ad: Ad,
    track_id: Option<Uuid>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let wait = Duration::from_secs(ad.duration.max(0) as u64);
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("ad reward for user {} / ad {} cancelled", user_id, ad.id);
            }
            _ = sleep(wait) => {
                match ad_service.record_session_completion(user_id, &ad, track_id).await {
                    Ok(Some(receipt)) => info!(
                        "credited {} coins to {} for ad {} (balance {})",
                        receipt.transaction.amount, user_id, ad.id, receipt.balance.coins
                    ),
                    Ok(None) => debug!("ad {} completed with no reward", ad.id),
                    Err(e) => error!("ad reward for user {} failed: {}", user_id, e),
                }
            }
        }
    })
}
