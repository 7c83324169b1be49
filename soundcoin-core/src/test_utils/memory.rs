// File: soundcoin-core/src/test_utils/memory.rs
//
// In-memory implementation of every repository trait, used by service and
// HTTP tests. Multi-row writes hold one lock so they are as atomic as the
// Postgres versions.

use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;
use soundcoin_common::error::Error;
use soundcoin_common::models::{
    Ad, AdKind, AdView, BalanceSnapshot, CoinTransaction, LedgerEntry, LedgerReceipt, NewAd,
    NewTrack, Profile, Redemption, RedemptionResolution, RedemptionStatus, Track, TrackFilter,
    TrackSort, TransactionKind,
};
use soundcoin_common::traits::repository_traits::{
    AdRepository, AdViewRepository, CoinLedgerRepository, ProfileRepository,
    RedemptionRepository, TrackRepository,
};

#[derive(Default)]
struct LedgerState {
    profiles: HashMap<Uuid, Profile>,
    transactions: Vec<CoinTransaction>,
    views: Vec<AdView>,
    redemptions: Vec<Redemption>,
}

impl LedgerState {
    fn apply(&mut self, entry: &LedgerEntry) -> Result<LedgerReceipt, Error> {
        let Some(profile) = self.profiles.get_mut(&entry.user_id) else {
            return Err(if entry.is_debit() {
                Error::InsufficientFunds { balance: 0, requested: -entry.amount }
            } else {
                Error::NotFound(format!("profile {}", entry.user_id))
            });
        };
        if profile.coins + entry.amount < 0 {
            return Err(Error::InsufficientFunds { balance: profile.coins, requested: -entry.amount });
        }

        let now = Utc::now();
        profile.coins += entry.amount;
        profile.total_earned += entry.amount.max(0);
        profile.balance_version += 1;
        profile.updated_at = now;
        let balance = profile.balance();

        let transaction = entry.to_transaction(now);
        self.transactions.push(transaction.clone());
        Ok(LedgerReceipt { transaction, balance })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    ledger: Mutex<LedgerState>,
    tracks: DashMap<Uuid, Track>,
    ads: DashMap<Uuid, Ad>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a profile and, when `coins > 0`, credits it with a bonus entry so
    /// the ledger sum still matches the balance.
    pub async fn seed_profile(&self, coins: i64) -> Uuid {
        let id = Uuid::new_v4();
        let email = format!("{}@listener.test", id.simple());
        let mut state = self.ledger.lock().await;
        state.profiles.insert(id, Profile::new(id, &email, "listener"));
        if coins > 0 {
            let entry = LedgerEntry {
                user_id: id,
                amount: coins,
                kind: TransactionKind::Bonus,
                description: "Seed balance".to_string(),
                related_ad_id: None,
            };
            // The profile was inserted above, so a credit cannot fail.
            let _ = state.apply(&entry);
        }
        id
    }

    pub fn seed_track(&self, title: &str, genre: &str, duration: i32) -> Track {
        let track = Track::from_new(NewTrack {
            title: title.to_string(),
            artist: "Test Artist".to_string(),
            album: None,
            duration: Some(duration),
            cover_url: None,
            audio_url: format!("https://cdn.test/{}.mp3", title.to_lowercase().replace(' ', "-")),
            genre: genre.to_string(),
            mood: "chill".to_string(),
            bpm: None,
            tags: vec![],
            source: None,
            is_ai_generated: false,
        });
        self.tracks.insert(track.id, track.clone());
        track
    }

    pub fn seed_ad(&self, kind: AdKind, duration: i32, coin_reward: Option<i32>) -> Ad {
        let ad = Ad::from_new(NewAd {
            title: format!("{} sponsor", kind),
            kind,
            content_url: format!("https://cdn.test/ads/{}", Uuid::new_v4()),
            duration: Some(duration),
            subtitle_text: None,
            coin_reward,
        });
        self.ads.insert(ad.id, ad.clone());
        ad
    }

    pub async fn view_count(&self) -> usize {
        self.ledger.lock().await.views.len()
    }

    pub async fn redemption_count(&self) -> usize {
        self.ledger.lock().await.redemptions.len()
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn create_profile(&self, profile: &Profile) -> Result<(), Error> {
        let mut state = self.ledger.lock().await;
        if state.profiles.contains_key(&profile.id) {
            return Err(Error::Validation(format!("profile {} already exists", profile.id)));
        }
        state.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, Error> {
        Ok(self.ledger.lock().await.profiles.get(&user_id).cloned())
    }

    async fn ensure_profile(&self, user_id: Uuid, email: &str, username: &str) -> Result<bool, Error> {
        let mut state = self.ledger.lock().await;
        if state.profiles.contains_key(&user_id) {
            return Ok(false);
        }
        state.profiles.insert(user_id, Profile::new(user_id, email, username));
        Ok(true)
    }

    async fn get_balance(&self, user_id: Uuid) -> Result<Option<BalanceSnapshot>, Error> {
        Ok(self.ledger.lock().await.profiles.get(&user_id).map(Profile::balance))
    }

    async fn count_profiles(&self) -> Result<i64, Error> {
        Ok(self.ledger.lock().await.profiles.len() as i64)
    }
}

#[async_trait]
impl CoinLedgerRepository for MemoryStore {
    async fn apply_entry(&self, entry: &LedgerEntry) -> Result<LedgerReceipt, Error> {
        self.ledger.lock().await.apply(entry)
    }

    async fn list_transactions(&self, user_id: Uuid, limit: i64) -> Result<Vec<CoinTransaction>, Error> {
        let state = self.ledger.lock().await;
        Ok(state
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn ledger_sum(&self, user_id: Uuid) -> Result<i64, Error> {
        let state = self.ledger.lock().await;
        Ok(state.transactions.iter().filter(|t| t.user_id == user_id).map(|t| t.amount).sum())
    }
}

#[async_trait]
impl TrackRepository for MemoryStore {
    async fn create_track(&self, track: &Track) -> Result<(), Error> {
        self.tracks.insert(track.id, track.clone());
        Ok(())
    }

    async fn get_track(&self, track_id: Uuid) -> Result<Option<Track>, Error> {
        Ok(self.tracks.get(&track_id).map(|t| t.value().clone()))
    }

    async fn search_tracks(&self, filter: &TrackFilter) -> Result<Vec<Track>, Error> {
        let mut hits: Vec<Track> = self
            .tracks
            .iter()
            .filter(|t| filter.matches(t.value()))
            .map(|t| t.value().clone())
            .collect();

        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        match filter.sort_by {
            TrackSort::Newest => {}
            TrackSort::Popular => hits.sort_by(|a, b| b.plays.cmp(&a.plays)),
            TrackSort::Duration => hits.sort_by_key(|t| t.duration),
            TrackSort::Alphabetical => hits.sort_by(|a, b| a.title.cmp(&b.title)),
        }

        Ok(hits
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn list_genres(&self) -> Result<Vec<String>, Error> {
        let mut genres: Vec<String> = self
            .tracks
            .iter()
            .filter(|t| t.active && !t.genre.is_empty())
            .map(|t| t.genre.clone())
            .collect();
        genres.sort();
        genres.dedup();
        Ok(genres)
    }

    async fn list_moods(&self) -> Result<Vec<String>, Error> {
        let mut moods: Vec<String> = self
            .tracks
            .iter()
            .filter(|t| t.active && !t.mood.is_empty())
            .map(|t| t.mood.clone())
            .collect();
        moods.sort();
        moods.dedup();
        Ok(moods)
    }

    async fn increment_plays(&self, track_id: Uuid) -> Result<(), Error> {
        match self.tracks.get_mut(&track_id) {
            Some(mut t) => {
                t.plays += 1;
                Ok(())
            }
            None => Err(Error::NotFound(format!("track {}", track_id))),
        }
    }

    async fn set_track_active(&self, track_id: Uuid, active: bool) -> Result<bool, Error> {
        Ok(self.tracks.get_mut(&track_id).map(|mut t| t.active = active).is_some())
    }

    async fn list_recent_tracks(&self, limit: i64) -> Result<Vec<Track>, Error> {
        let mut all: Vec<Track> = self.tracks.iter().map(|t| t.value().clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit.max(0) as usize);
        Ok(all)
    }

    async fn count_tracks(&self) -> Result<i64, Error> {
        Ok(self.tracks.len() as i64)
    }
}

#[async_trait]
impl AdRepository for MemoryStore {
    async fn create_ad(&self, ad: &Ad) -> Result<(), Error> {
        self.ads.insert(ad.id, ad.clone());
        Ok(())
    }

    async fn get_ad(&self, ad_id: Uuid) -> Result<Option<Ad>, Error> {
        Ok(self.ads.get(&ad_id).map(|a| a.value().clone()))
    }

    async fn list_ads(&self, limit: i64) -> Result<Vec<Ad>, Error> {
        let mut all: Vec<Ad> = self.ads.iter().map(|a| a.value().clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit.max(0) as usize);
        Ok(all)
    }

    async fn next_active_ad(&self, kind: AdKind) -> Result<Option<Ad>, Error> {
        Ok(self
            .ads
            .iter()
            .filter(|a| a.active && a.kind == kind)
            .min_by(|a, b| {
                a.impressions
                    .cmp(&b.impressions)
                    .then(a.created_at.cmp(&b.created_at))
            })
            .map(|a| a.value().clone()))
    }

    async fn increment_impressions(&self, ad_id: Uuid) -> Result<(), Error> {
        match self.ads.get_mut(&ad_id) {
            Some(mut a) => {
                a.impressions += 1;
                Ok(())
            }
            None => Err(Error::NotFound(format!("ad {}", ad_id))),
        }
    }

    async fn set_ad_active(&self, ad_id: Uuid, active: bool) -> Result<bool, Error> {
        Ok(self.ads.get_mut(&ad_id).map(|mut a| a.active = active).is_some())
    }

    async fn count_ads(&self) -> Result<i64, Error> {
        Ok(self.ads.len() as i64)
    }
}

#[async_trait]
impl AdViewRepository for MemoryStore {
    async fn record_view(
        &self,
        view: &AdView,
        reward: Option<&LedgerEntry>,
    ) -> Result<Option<LedgerReceipt>, Error> {
        let mut state = self.ledger.lock().await;
        if !state.profiles.contains_key(&view.user_id) {
            return Err(Error::NotFound(format!("profile {}", view.user_id)));
        }
        let receipt = match reward {
            Some(entry) => Some(state.apply(entry)?),
            None => None,
        };
        state.views.push(view.clone());
        Ok(receipt)
    }

    async fn list_views_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<AdView>, Error> {
        let state = self.ledger.lock().await;
        Ok(state
            .views
            .iter()
            .rev()
            .filter(|v| v.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RedemptionRepository for MemoryStore {
    async fn create_with_debit(
        &self,
        redemption: &Redemption,
        debit: &LedgerEntry,
    ) -> Result<LedgerReceipt, Error> {
        let mut state = self.ledger.lock().await;
        let receipt = state.apply(debit)?;
        state.redemptions.push(redemption.clone());
        Ok(receipt)
    }

    async fn get_redemption(&self, redemption_id: Uuid) -> Result<Option<Redemption>, Error> {
        let state = self.ledger.lock().await;
        Ok(state.redemptions.iter().find(|r| r.id == redemption_id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>, Error> {
        let state = self.ledger.lock().await;
        Ok(state
            .redemptions
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_status(
        &self,
        status: Option<RedemptionStatus>,
        limit: i64,
    ) -> Result<Vec<Redemption>, Error> {
        let state = self.ledger.lock().await;
        Ok(state
            .redemptions
            .iter()
            .rev()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn transition(
        &self,
        redemption_id: Uuid,
        from: RedemptionStatus,
        resolution: &RedemptionResolution,
    ) -> Result<Option<Redemption>, Error> {
        let mut state = self.ledger.lock().await;
        let Some(r) = state
            .redemptions
            .iter_mut()
            .find(|r| r.id == redemption_id && r.status == from)
        else {
            return Ok(None);
        };
        r.status = resolution.status;
        r.processed_at = Some(resolution.processed_at);
        r.processed_by = Some(resolution.processed_by);
        if resolution.notes.is_some() {
            r.notes = resolution.notes.clone();
        }
        Ok(Some(r.clone()))
    }

    async fn count_by_status(&self, status: RedemptionStatus) -> Result<i64, Error> {
        let state = self.ledger.lock().await;
        Ok(state.redemptions.iter().filter(|r| r.status == status).count() as i64)
    }
}
