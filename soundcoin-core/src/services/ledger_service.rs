// File: soundcoin-core/src/services/ledger_service.rs

use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use soundcoin_common::models::{BalanceSnapshot, CoinTransaction, LedgerEntry, LedgerReceipt, Profile};
use soundcoin_common::traits::repository_traits::{CoinLedgerRepository, ProfileRepository};
use crate::eventbus::EventBus;
use crate::Error;

pub const DEFAULT_TRANSACTION_LIMIT: i64 = 50;
pub const MAX_TRANSACTION_LIMIT: i64 = 200;

/// Balance reads and the single write path for coin deltas.
pub struct CoinLedgerService {
    ledger: Arc<dyn CoinLedgerRepository>,
    profiles: Arc<dyn ProfileRepository>,
    event_bus: Arc<EventBus>,
}

impl CoinLedgerService {
    pub fn new(
        ledger: Arc<dyn CoinLedgerRepository>,
        profiles: Arc<dyn ProfileRepository>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self { ledger, profiles, event_bus }
    }

    pub async fn apply(&self, entry: &LedgerEntry) -> Result<LedgerReceipt, Error> {
        if entry.amount == 0 {
            return Err(Error::Validation("ledger entry amount must be non-zero".into()));
        }
        let receipt = self.ledger.apply_entry(entry).await?;
        debug!(
            "ledger: user={} delta={} kind={} -> {}",
            entry.user_id, entry.amount, entry.kind, receipt.balance.coins
        );
        self.event_bus.publish_balance(receipt.balance).await;
        Ok(receipt)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Profile, Error> {
        self.profiles
            .get_profile(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("profile {}", user_id)))
    }

    pub async fn get_balance(&self, user_id: Uuid) -> Result<BalanceSnapshot, Error> {
        self.profiles
            .get_balance(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("profile {}", user_id)))
    }

    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<CoinTransaction>, Error> {
        let limit = limit
            .unwrap_or(DEFAULT_TRANSACTION_LIMIT)
            .clamp(1, MAX_TRANSACTION_LIMIT);
        self.ledger.list_transactions(user_id, limit).await
    }

    /// True when the transaction log and the stored balance agree.
    pub async fn verify_balance(&self, user_id: Uuid) -> Result<bool, Error> {
        let balance = self.get_balance(user_id).await?;
        let sum = self.ledger.ledger_sum(user_id).await?;
        Ok(balance.coins == sum)
    }
}
