// File: soundcoin-core/src/services/redemption_service.rs

use std::sync::Arc;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use soundcoin_common::models::{
    BalanceSnapshot, LedgerEntry, PayoutMethod, Redemption, RedemptionResolution, RedemptionStatus,
};
use soundcoin_common::traits::repository_traits::RedemptionRepository;
use crate::economy::{EconomyConfig, RedemptionTier};
use crate::eventbus::{CoinEvent, EventBus};
use crate::Error;

pub const DEFAULT_ADMIN_LIST_LIMIT: i64 = 50;
pub const MAX_ADMIN_LIST_LIMIT: i64 = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct RedemptionRequest {
    pub user_id: Uuid,
    pub coins_used: i64,
    /// Client-quoted USD value. Must agree with the configured rate when present.
    #[serde(default)]
    pub amount: Option<Decimal>,
    pub method: PayoutMethod,
    #[serde(default)]
    pub paypal_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RedemptionReceipt {
    pub redemption: Redemption,
    pub balance: BalanceSnapshot,
}

pub struct RedemptionService {
    redemptions: Arc<dyn RedemptionRepository>,
    economy: EconomyConfig,
    event_bus: Arc<EventBus>,
}

impl RedemptionService {
    pub fn new(
        redemptions: Arc<dyn RedemptionRepository>,
        economy: EconomyConfig,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self { redemptions, economy, event_bus }
    }

    pub fn tiers(&self) -> Vec<RedemptionTier> {
        self.economy.tiers()
    }

    pub fn coin_value_usd(&self) -> Decimal {
        self.economy.coin_value_usd
    }

    fn validate(&self, req: &RedemptionRequest) -> Result<Option<String>, Error> {
        if req.coins_used <= 0 {
            return Err(Error::Validation("coins_used must be positive".into()));
        }
        if let Some(min) = self.economy.min_redemption_coins {
            if req.coins_used < min {
                return Err(Error::Validation(format!("minimum redemption is {} coins", min)));
            }
        }
        if let Some(quoted) = req.amount {
            if !self.economy.amount_matches(req.coins_used, quoted) {
                return Err(Error::Validation(format!(
                    "amount {} does not match {} coins",
                    quoted, req.coins_used
                )));
            }
        }

        let email = req
            .paypal_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        if req.method == PayoutMethod::Paypal {
            match &email {
                Some(e) if e.contains('@') => {}
                _ => return Err(Error::Validation("a valid paypal_email is required".into())),
            }
        }
        Ok(email)
    }

    /// Debits the coins and files a pending payout. Nothing is written when the
    /// balance does not cover `coins_used`.
    pub async fn request(&self, req: RedemptionRequest) -> Result<RedemptionReceipt, Error> {
        let email = self.validate(&req)?;
        let amount = self.economy.usd_for_coins(req.coins_used);

        let redemption = Redemption::pending(req.user_id, amount, req.coins_used, req.method, email);
        let debit = LedgerEntry::redemption(req.user_id, req.coins_used, amount);
        let receipt = self.redemptions.create_with_debit(&redemption, &debit).await?;

        info!(
            "redemption {} filed: user={} coins={} usd={}",
            redemption.id, redemption.user_id, redemption.coins_used, redemption.amount
        );
        self.event_bus.publish_balance(receipt.balance).await;
        self.event_bus.publish(CoinEvent::RedemptionCreated(redemption.clone())).await;

        Ok(RedemptionReceipt { redemption, balance: receipt.balance })
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>, Error> {
        self.redemptions.list_for_user(user_id).await
    }

    pub async fn list_by_status(
        &self,
        status: Option<RedemptionStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<Redemption>, Error> {
        let limit = limit.unwrap_or(DEFAULT_ADMIN_LIST_LIMIT).clamp(1, MAX_ADMIN_LIST_LIMIT);
        self.redemptions.list_by_status(status, limit).await
    }

    /// Moves a redemption to `target`. Balances are never touched here; a
    /// rejected redemption keeps its coins debited.
    pub async fn resolve(
        &self,
        redemption_id: Uuid,
        target: RedemptionStatus,
        admin_id: Uuid,
        notes: Option<String>,
    ) -> Result<Redemption, Error> {
        let Some(from) = target.required_predecessor() else {
            return Err(Error::InvalidTransition(format!("cannot move a redemption to {}", target)));
        };
        let current = self
            .redemptions
            .get_redemption(redemption_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("redemption {}", redemption_id)))?;
        if current.status != from {
            return Err(Error::InvalidTransition(format!(
                "redemption {} is {}, cannot become {}",
                redemption_id, current.status, target
            )));
        }

        let resolution = RedemptionResolution {
            status: target,
            processed_by: admin_id,
            processed_at: Utc::now(),
            notes,
        };
        let updated = self
            .redemptions
            .transition(redemption_id, from, &resolution)
            .await?
            .ok_or_else(|| {
                Error::InvalidTransition(format!("redemption {} changed concurrently", redemption_id))
            })?;

        info!("redemption {} -> {} by {}", redemption_id, target, admin_id);
        self.event_bus.publish(CoinEvent::RedemptionResolved(updated.clone())).await;
        Ok(updated)
    }

    pub async fn approve(&self, id: Uuid, admin_id: Uuid, notes: Option<String>) -> Result<Redemption, Error> {
        self.resolve(id, RedemptionStatus::Approved, admin_id, notes).await
    }

    pub async fn reject(&self, id: Uuid, admin_id: Uuid, notes: Option<String>) -> Result<Redemption, Error> {
        self.resolve(id, RedemptionStatus::Rejected, admin_id, notes).await
    }

    pub async fn complete(&self, id: Uuid, admin_id: Uuid, notes: Option<String>) -> Result<Redemption, Error> {
        self.resolve(id, RedemptionStatus::Completed, admin_id, notes).await
    }
}
