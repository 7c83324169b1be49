// File: soundcoin-core/src/repositories/postgres/ad_views.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;
use soundcoin_common::error::Error;
use soundcoin_common::models::{AdView, LedgerEntry, LedgerReceipt};
use soundcoin_common::traits::repository_traits::AdViewRepository;
use super::coin_ledger::apply_entry_in_tx;

pub struct PostgresAdViewRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresAdViewRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdViewRepository for PostgresAdViewRepository {
    async fn record_view(
        &self,
        view: &AdView,
        reward: Option<&LedgerEntry>,
    ) -> Result<Option<LedgerReceipt>, Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO ad_views (
                id,
                user_id,
                ad_id,
                track_id,
                viewed_at,
                completed,
                verified,
                coins_earned
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
            .bind(view.id)
            .bind(view.user_id)
            .bind(view.ad_id)
            .bind(view.track_id)
            .bind(view.viewed_at)
            .bind(view.completed)
            .bind(view.verified)
            .bind(view.coins_earned)
            .execute(&mut *tx)
            .await?;

        let receipt = match reward {
            Some(entry) => Some(apply_entry_in_tx(&mut tx, entry).await?),
            None => None,
        };

        tx.commit().await?;
        Ok(receipt)
    }

    async fn list_views_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<AdView>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, ad_id, track_id, viewed_at, completed, verified, coins_earned
            FROM ad_views
            WHERE user_id = $1
            ORDER BY viewed_at DESC
            LIMIT $2
            "#,
        )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(AdView {
                id: r.try_get("id")?,
                user_id: r.try_get("user_id")?,
                ad_id: r.try_get("ad_id")?,
                track_id: r.try_get("track_id")?,
                viewed_at: r.try_get("viewed_at")?,
                completed: r.try_get("completed")?,
                verified: r.try_get("verified")?,
                coins_earned: r.try_get("coins_earned")?,
            });
        }
        Ok(out)
    }
}
