use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A listener's profile. `id` is the same id the auth provider hands out.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub coins: i64,
    pub total_earned: i64,

    /// Bumped on every balance mutation; doubles as the balance ETag.
    pub balance_version: i64,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Fresh profile with an empty balance.
    pub fn new(id: Uuid, email: &str, username: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.to_string(),
            username: username.to_string(),
            avatar_url: None,
            coins: 0,
            total_earned: 0,
            balance_version: 0,
            is_premium: false,
            created_at: now,
            last_login: now,
            updated_at: now,
        }
    }

    pub fn balance(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            user_id: self.id,
            coins: self.coins,
            version: self.balance_version,
        }
    }
}

/// Point-in-time view of a balance, as pushed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub user_id: Uuid,
    pub coins: i64,
    pub version: i64,
}
