// File: soundcoin-common/src/models/coin.rs

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::models::profile::BalanceSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Earned,
    Redeemed,
    Bonus,
    Referral,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Earned => "earned",
            TransactionKind::Redeemed => "redeemed",
            TransactionKind::Bonus => "bonus",
            TransactionKind::Referral => "referral",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "earned" => Ok(TransactionKind::Earned),
            "redeemed" => Ok(TransactionKind::Redeemed),
            "bonus" => Ok(TransactionKind::Bonus),
            "referral" => Ok(TransactionKind::Referral),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// One append-only ledger line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub description: String,
    pub related_ad_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A balance mutation waiting to be applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub user_id: Uuid,
    /// Signed coin delta.
    pub amount: i64,
    pub kind: TransactionKind,
    pub description: String,
    pub related_ad_id: Option<Uuid>,
}

impl LedgerEntry {
    pub fn ad_reward(user_id: Uuid, coins: i64, ad_id: Uuid) -> Self {
        Self {
            user_id,
            amount: coins,
            kind: TransactionKind::Earned,
            description: "Ad view reward".to_string(),
            related_ad_id: Some(ad_id),
        }
    }

    pub fn redemption(user_id: Uuid, coins_used: i64, amount_usd: Decimal) -> Self {
        Self {
            user_id,
            amount: -coins_used,
            kind: TransactionKind::Redeemed,
            description: format!("Redemption: ${}", amount_usd.normalize()),
            related_ad_id: None,
        }
    }

    pub fn is_debit(&self) -> bool {
        self.amount < 0
    }

    pub fn to_transaction(&self, created_at: DateTime<Utc>) -> CoinTransaction {
        CoinTransaction {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            amount: self.amount,
            kind: self.kind,
            description: self.description.clone(),
            related_ad_id: self.related_ad_id,
            created_at,
        }
    }
}

/// What a successful ledger write hands back: the audit row and the new balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub transaction: CoinTransaction,
    pub balance: BalanceSnapshot,
}
