// File: soundcoin-core/src/repositories/postgres/profiles.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;
use soundcoin_common::error::Error;
use soundcoin_common::models::{BalanceSnapshot, Profile};
use soundcoin_common::traits::repository_traits::ProfileRepository;

pub struct PostgresProfileRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresProfileRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn create_profile(&self, profile: &Profile) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO profiles (
                id,
                email,
                username,
                avatar_url,
                coins,
                total_earned,
                balance_version,
                is_premium,
                created_at,
                last_login,
                updated_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            "#,
        )
            .bind(profile.id)
            .bind(&profile.email)
            .bind(&profile.username)
            .bind(&profile.avatar_url)
            .bind(profile.coins)
            .bind(profile.total_earned)
            .bind(profile.balance_version)
            .bind(profile.is_premium)
            .bind(profile.created_at)
            .bind(profile.last_login)
            .bind(profile.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT
                id,
                email,
                username,
                avatar_url,
                coins,
                total_earned,
                balance_version,
                is_premium,
                created_at,
                last_login,
                updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(r) = row_opt {
            Ok(Some(Profile {
                id: r.try_get("id")?,
                email: r.try_get("email")?,
                username: r.try_get("username")?,
                avatar_url: r.try_get("avatar_url")?,
                coins: r.try_get("coins")?,
                total_earned: r.try_get("total_earned")?,
                balance_version: r.try_get("balance_version")?,
                is_premium: r.try_get("is_premium")?,
                created_at: r.try_get("created_at")?,
                last_login: r.try_get("last_login")?,
                updated_at: r.try_get("updated_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn ensure_profile(&self, user_id: Uuid, email: &str, username: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (id, email, username, coins, total_earned, balance_version)
            VALUES ($1, $2, $3, 0, 0, 0)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
            .bind(user_id)
            .bind(email)
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn get_balance(&self, user_id: Uuid) -> Result<Option<BalanceSnapshot>, Error> {
        let row_opt = sqlx::query("SELECT coins, balance_version FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(Some(BalanceSnapshot {
                user_id,
                coins: r.try_get("coins")?,
                version: r.try_get("balance_version")?,
            })),
            None => Ok(None),
        }
    }

    async fn count_profiles(&self) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
