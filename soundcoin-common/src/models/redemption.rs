// File: soundcoin-common/src/models/redemption.rs

use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutMethod {
    Paypal,
    Giftcard,
}

impl PayoutMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutMethod::Paypal => "paypal",
            PayoutMethod::Giftcard => "giftcard",
        }
    }
}

impl fmt::Display for PayoutMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoutMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "paypal" => Ok(PayoutMethod::Paypal),
            "giftcard" => Ok(PayoutMethod::Giftcard),
            _ => Err(format!("Unknown payout method: {}", s)),
        }
    }
}

/// `pending -> approved | rejected`, `approved -> completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedemptionStatus::Pending => "pending",
            RedemptionStatus::Approved => "approved",
            RedemptionStatus::Rejected => "rejected",
            RedemptionStatus::Completed => "completed",
        }
    }

    /// The status a redemption must currently be in to move to `self`.
    pub fn required_predecessor(&self) -> Option<RedemptionStatus> {
        match self {
            RedemptionStatus::Approved | RedemptionStatus::Rejected => Some(RedemptionStatus::Pending),
            RedemptionStatus::Completed => Some(RedemptionStatus::Approved),
            RedemptionStatus::Pending => None,
        }
    }

    pub fn can_transition_to(&self, next: RedemptionStatus) -> bool {
        next.required_predecessor() == Some(*self)
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedemptionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RedemptionStatus::Pending),
            "approved" => Ok(RedemptionStatus::Approved),
            "rejected" => Ok(RedemptionStatus::Rejected),
            "completed" => Ok(RedemptionStatus::Completed),
            _ => Err(format!("Unknown redemption status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Redemption {
    pub id: Uuid,
    pub user_id: Uuid,
    /// USD value of the payout.
    pub amount: Decimal,
    pub coins_used: i64,
    pub method: PayoutMethod,
    pub paypal_email: Option<String>,
    pub status: RedemptionStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<Uuid>,
    pub notes: Option<String>,
}

impl Redemption {
    pub fn pending(
        user_id: Uuid,
        amount: Decimal,
        coins_used: i64,
        method: PayoutMethod,
        paypal_email: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            coins_used,
            method,
            paypal_email,
            status: RedemptionStatus::Pending,
            requested_at: Utc::now(),
            processed_at: None,
            processed_by: None,
            notes: None,
        }
    }
}

/// An administrator's decision on a redemption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedemptionResolution {
    pub status: RedemptionStatus,
    pub processed_by: Uuid,
    pub processed_at: DateTime<Utc>,
    pub notes: Option<String>,
}
