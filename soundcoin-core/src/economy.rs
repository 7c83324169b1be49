// File: soundcoin-core/src/economy.rs
//
// Reward table, coin value and redemption tiers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use soundcoin_common::models::{Ad, AdKind};

/// Coins for an ad played to the end inside a player session.
pub fn ad_completion_reward(kind: AdKind) -> i64 {
    match kind {
        AdKind::Audio => 1,
        AdKind::Video => 3,
    }
}

/// Reward used on the direct ad-view path when the ad has no usable `coin_reward`.
pub const DEFAULT_AD_VIEW_REWARD: i32 = 5;

/// Zero or negative counts as unset.
pub fn configured_ad_reward(ad: &Ad) -> i64 {
    ad.coin_reward
        .filter(|c| *c > 0)
        .unwrap_or(DEFAULT_AD_VIEW_REWARD) as i64
}

pub const REDEMPTION_TIER_COINS: [i64; 4] = [1_000, 2_500, 5_000, 10_000];
pub const DEFAULT_AD_INTERVAL: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionTier {
    pub coins: i64,
    pub value: Decimal,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EconomyConfig {
    /// USD per coin.
    pub coin_value_usd: Decimal,
    /// Tracks between ads.
    pub ad_interval: u32,
    pub min_redemption_coins: Option<i64>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            coin_value_usd: Decimal::new(1, 4),
            ad_interval: DEFAULT_AD_INTERVAL,
            min_redemption_coins: None,
        }
    }
}

impl EconomyConfig {
    pub fn usd_for_coins(&self, coins: i64) -> Decimal {
        Decimal::from(coins) * self.coin_value_usd
    }

    /// True when a client-quoted amount agrees with the configured rate.
    pub fn amount_matches(&self, coins: i64, quoted: Decimal) -> bool {
        quoted.round_dp(4) == self.usd_for_coins(coins).round_dp(4)
    }

    pub fn tiers(&self) -> Vec<RedemptionTier> {
        REDEMPTION_TIER_COINS
            .iter()
            .map(|&coins| {
                let value = self.usd_for_coins(coins);
                RedemptionTier {
                    coins,
                    label: format!("${:.2}", value),
                    value,
                }
            })
            .collect()
    }
}
