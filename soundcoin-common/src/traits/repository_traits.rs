use async_trait::async_trait;
use uuid::Uuid;
use crate::error::Error;
use crate::models::{
    Ad, AdKind, AdView, BalanceSnapshot, CoinTransaction, LedgerEntry, LedgerReceipt,
    Profile, Redemption, RedemptionResolution, RedemptionStatus, Track, TrackFilter,
};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create_profile(&self, profile: &Profile) -> Result<(), Error>;
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, Error>;

    /// Inserts an empty profile unless one already exists. Returns `true` if a row was created.
    async fn ensure_profile(&self, user_id: Uuid, email: &str, username: &str) -> Result<bool, Error>;

    async fn get_balance(&self, user_id: Uuid) -> Result<Option<BalanceSnapshot>, Error>;
    async fn count_profiles(&self) -> Result<i64, Error>;
}

/// The only writer of `profiles.coins`.
#[async_trait]
pub trait CoinLedgerRepository: Send + Sync {
    /// Applies the delta and appends the transaction row atomically.
    /// A debit that would take the balance below zero fails with `InsufficientFunds`
    /// and leaves nothing behind.
    async fn apply_entry(&self, entry: &LedgerEntry) -> Result<LedgerReceipt, Error>;

    /// Newest first.
    async fn list_transactions(&self, user_id: Uuid, limit: i64) -> Result<Vec<CoinTransaction>, Error>;

    /// Sum of every transaction amount for the user.
    async fn ledger_sum(&self, user_id: Uuid) -> Result<i64, Error>;
}

#[async_trait]
pub trait TrackRepository: Send + Sync {
    async fn create_track(&self, track: &Track) -> Result<(), Error>;
    async fn get_track(&self, track_id: Uuid) -> Result<Option<Track>, Error>;
    async fn search_tracks(&self, filter: &TrackFilter) -> Result<Vec<Track>, Error>;

    /// Distinct non-empty genres of active tracks, sorted.
    async fn list_genres(&self) -> Result<Vec<String>, Error>;
    async fn list_moods(&self) -> Result<Vec<String>, Error>;

    async fn increment_plays(&self, track_id: Uuid) -> Result<(), Error>;
    async fn set_track_active(&self, track_id: Uuid, active: bool) -> Result<bool, Error>;

    /// Admin listing; includes inactive tracks.
    async fn list_recent_tracks(&self, limit: i64) -> Result<Vec<Track>, Error>;
    async fn count_tracks(&self) -> Result<i64, Error>;
}

#[async_trait]
pub trait AdRepository: Send + Sync {
    async fn create_ad(&self, ad: &Ad) -> Result<(), Error>;
    async fn get_ad(&self, ad_id: Uuid) -> Result<Option<Ad>, Error>;
    async fn list_ads(&self, limit: i64) -> Result<Vec<Ad>, Error>;

    /// The active ad of `kind` with the fewest impressions.
    async fn next_active_ad(&self, kind: AdKind) -> Result<Option<Ad>, Error>;

    async fn increment_impressions(&self, ad_id: Uuid) -> Result<(), Error>;
    async fn set_ad_active(&self, ad_id: Uuid, active: bool) -> Result<bool, Error>;
    async fn count_ads(&self) -> Result<i64, Error>;
}

#[async_trait]
pub trait AdViewRepository: Send + Sync {
    /// Stores the view and, when a reward is attached, applies it in the same
    /// database transaction.
    async fn record_view(
        &self,
        view: &AdView,
        reward: Option<&LedgerEntry>,
    ) -> Result<Option<LedgerReceipt>, Error>;

    async fn list_views_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<AdView>, Error>;
}

#[async_trait]
pub trait RedemptionRepository: Send + Sync {
    /// Debits the coins and inserts the pending redemption atomically.
    async fn create_with_debit(
        &self,
        redemption: &Redemption,
        debit: &LedgerEntry,
    ) -> Result<LedgerReceipt, Error>;

    async fn get_redemption(&self, redemption_id: Uuid) -> Result<Option<Redemption>, Error>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>, Error>;
    async fn list_by_status(
        &self,
        status: Option<RedemptionStatus>,
        limit: i64,
    ) -> Result<Vec<Redemption>, Error>;

    /// Applies the resolution only if the row is still in `from`.
    /// `None` means it was not (or the row does not exist).
    async fn transition(
        &self,
        redemption_id: Uuid,
        from: RedemptionStatus,
        resolution: &RedemptionResolution,
    ) -> Result<Option<Redemption>, Error>;

    async fn count_by_status(&self, status: RedemptionStatus) -> Result<i64, Error>;
}
