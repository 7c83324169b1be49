// File: soundcoin-core/src/services/ad_service.rs

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use soundcoin_common::models::{Ad, AdKind, AdView, LedgerEntry, LedgerReceipt, NewAd};
use soundcoin_common::traits::repository_traits::{AdRepository, AdViewRepository, ProfileRepository};
use crate::economy::{ad_completion_reward, configured_ad_reward};
use crate::eventbus::EventBus;
use crate::Error;

pub const DEFAULT_AD_LIST_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct AdViewOutcome {
    pub view: AdView,
    pub coins_earned: i64,
    pub receipt: Option<LedgerReceipt>,
}

pub struct AdService {
    ads: Arc<dyn AdRepository>,
    views: Arc<dyn AdViewRepository>,
    profiles: Arc<dyn ProfileRepository>,
    event_bus: Arc<EventBus>,
}

impl AdService {
    pub fn new(
        ads: Arc<dyn AdRepository>,
        views: Arc<dyn AdViewRepository>,
        profiles: Arc<dyn ProfileRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self { ads, views, profiles, event_bus }
    }

    /// Direct ad-view report from a client. Completed views earn the ad's
    /// configured reward.
    pub async fn record_view(
        &self,
        user_id: Uuid,
        ad_id: Uuid,
        track_id: Option<Uuid>,
        completed: bool,
    ) -> Result<AdViewOutcome, Error> {
        let ad = self
            .ads
            .get_ad(ad_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ad {}", ad_id)))?;
        let coins = if completed { configured_ad_reward(&ad) } else { 0 };
        self.store_view(user_id, &ad, track_id, completed, coins).await
    }

    /// Reward path for ads played inside a player session.
    pub async fn record_session_completion(
        &self,
        user_id: Uuid,
        ad: &Ad,
        track_id: Option<Uuid>,
    ) -> Result<Option<LedgerReceipt>, Error> {
        let coins = ad_completion_reward(ad.kind);
        let outcome = self.store_view(user_id, ad, track_id, true, coins).await?;
        Ok(outcome.receipt)
    }

    async fn store_view(
        &self,
        user_id: Uuid,
        ad: &Ad,
        track_id: Option<Uuid>,
        completed: bool,
        coins: i64,
    ) -> Result<AdViewOutcome, Error> {
        if self.profiles.get_balance(user_id).await?.is_none() {
            return Err(Error::NotFound(format!("profile {}", user_id)));
        }

        let view = AdView::new(user_id, ad.id, track_id, completed, coins as i32);
        let reward = (coins > 0).then(|| LedgerEntry::ad_reward(user_id, coins, ad.id));
        let receipt = self.views.record_view(&view, reward.as_ref()).await?;

        if let Some(r) = &receipt {
            self.event_bus.publish_balance(r.balance).await;
        }
        Ok(AdViewOutcome { view, coins_earned: coins, receipt })
    }

    pub async fn next_ad(&self, kind: AdKind) -> Result<Option<Ad>, Error> {
        self.ads.next_active_ad(kind).await
    }

    /// Counts an impression. A failure is logged, not surfaced.
    pub async fn register_impression(&self, ad_id: Uuid) {
        if let Err(e) = self.ads.increment_impressions(ad_id).await {
            warn!("could not count impression for ad {}: {}", ad_id, e);
        }
    }

    pub async fn create_ad(&self, new: NewAd) -> Result<Ad, Error> {
        if new.title.trim().is_empty() {
            return Err(Error::Validation("title is required".into()));
        }
        if new.content_url.trim().is_empty() {
            return Err(Error::Validation("content_url is required".into()));
        }
        if new.duration.is_some_and(|d| d <= 0) {
            return Err(Error::Validation("duration must be positive".into()));
        }
        if new.coin_reward.is_some_and(|c| c < 0) {
            return Err(Error::Validation("coin_reward must not be negative".into()));
        }
        let ad = Ad::from_new(new);
        self.ads.create_ad(&ad).await?;
        info!("registered {} ad '{}' ({})", ad.kind, ad.title, ad.id);
        Ok(ad)
    }

    pub async fn list_ads(&self) -> Result<Vec<Ad>, Error> {
        self.ads.list_ads(DEFAULT_AD_LIST_LIMIT).await
    }

    pub async fn deactivate_ad(&self, ad_id: Uuid) -> Result<(), Error> {
        if self.ads.set_ad_active(ad_id, false).await? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("ad {}", ad_id)))
        }
    }
}
