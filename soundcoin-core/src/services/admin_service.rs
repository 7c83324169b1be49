use std::sync::Arc;
use soundcoin_common::models::{AdminStats, RedemptionStatus};
use soundcoin_common::traits::repository_traits::{
    AdRepository, ProfileRepository, RedemptionRepository, TrackRepository,
};
use crate::Error;

pub struct AdminService {
    profiles: Arc<dyn ProfileRepository>,
    tracks: Arc<dyn TrackRepository>,
    ads: Arc<dyn AdRepository>,
    redemptions: Arc<dyn RedemptionRepository>,
}

impl AdminService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        tracks: Arc<dyn TrackRepository>,
        ads: Arc<dyn AdRepository>,
        redemptions: Arc<dyn RedemptionRepository>,
    ) -> Self {
        Self { profiles, tracks, ads, redemptions }
    }

    pub async fn stats(&self) -> Result<AdminStats, Error> {
        let (total_users, total_tracks, total_ads, pending_redemptions) = tokio::try_join!(
            self.profiles.count_profiles(),
            self.tracks.count_tracks(),
            self.ads.count_ads(),
            self.redemptions.count_by_status(RedemptionStatus::Pending),
        )?;
        Ok(AdminStats { total_users, total_tracks, total_ads, pending_redemptions })
    }
}
