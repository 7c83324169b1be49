// File: soundcoin-core/src/repositories/postgres/redemptions.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;
use soundcoin_common::error::Error;
use soundcoin_common::models::{
    LedgerEntry, LedgerReceipt, PayoutMethod, Redemption, RedemptionResolution, RedemptionStatus,
};
use soundcoin_common::traits::repository_traits::RedemptionRepository;
use super::coin_ledger::apply_entry_in_tx;

pub struct PostgresRedemptionRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresRedemptionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const REDEMPTION_COLUMNS: &str = r#"
    id, user_id, amount, coins_used, method, paypal_email, status,
    requested_at, processed_at, processed_by, notes
"#;

fn redemption_from_row(r: &PgRow) -> Result<Redemption, Error> {
    let method: String = r.try_get("method")?;
    let status: String = r.try_get("status")?;
    Ok(Redemption {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        amount: r.try_get("amount")?,
        coins_used: r.try_get("coins_used")?,
        method: method.parse::<PayoutMethod>()?,
        paypal_email: r.try_get("paypal_email")?,
        status: status.parse::<RedemptionStatus>()?,
        requested_at: r.try_get("requested_at")?,
        processed_at: r.try_get("processed_at")?,
        processed_by: r.try_get("processed_by")?,
        notes: r.try_get("notes")?,
    })
}

#[async_trait]
impl RedemptionRepository for PostgresRedemptionRepository {
    async fn create_with_debit(
        &self,
        redemption: &Redemption,
        debit: &LedgerEntry,
    ) -> Result<LedgerReceipt, Error> {
        let mut tx = self.pool.begin().await?;

        // Debit first: a failed guard aborts before the redemption row exists.
        let receipt = apply_entry_in_tx(&mut tx, debit).await?;

        sqlx::query(
            r#"
            INSERT INTO redemptions (
                id,
                user_id,
                amount,
                coins_used,
                method,
                paypal_email,
                status,
                requested_at,
                processed_at,
                processed_by,
                notes
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            "#,
        )
            .bind(redemption.id)
            .bind(redemption.user_id)
            .bind(redemption.amount)
            .bind(redemption.coins_used)
            .bind(redemption.method.as_str())
            .bind(&redemption.paypal_email)
            .bind(redemption.status.as_str())
            .bind(redemption.requested_at)
            .bind(redemption.processed_at)
            .bind(redemption.processed_by)
            .bind(&redemption.notes)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(receipt)
    }

    async fn get_redemption(&self, redemption_id: Uuid) -> Result<Option<Redemption>, Error> {
        let sql = format!("SELECT {REDEMPTION_COLUMNS} FROM redemptions WHERE id = $1");
        let row_opt = sqlx::query(&sql)
            .bind(redemption_id)
            .fetch_optional(&self.pool)
            .await?;
        row_opt.as_ref().map(redemption_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Redemption>, Error> {
        let sql = format!(
            "SELECT {REDEMPTION_COLUMNS} FROM redemptions WHERE user_id = $1 ORDER BY requested_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(redemption_from_row).collect()
    }

    async fn list_by_status(
        &self,
        status: Option<RedemptionStatus>,
        limit: i64,
    ) -> Result<Vec<Redemption>, Error> {
        let sql = format!(
            r#"
            SELECT {REDEMPTION_COLUMNS}
            FROM redemptions
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY requested_at DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(redemption_from_row).collect()
    }

    async fn transition(
        &self,
        redemption_id: Uuid,
        from: RedemptionStatus,
        resolution: &RedemptionResolution,
    ) -> Result<Option<Redemption>, Error> {
        let sql = format!(
            r#"
            UPDATE redemptions
            SET status = $3,
                processed_at = $4,
                processed_by = $5,
                notes = COALESCE($6, notes)
            WHERE id = $1 AND status = $2
            RETURNING {REDEMPTION_COLUMNS}
            "#
        );
        let row_opt = sqlx::query(&sql)
            .bind(redemption_id)
            .bind(from.as_str())
            .bind(resolution.status.as_str())
            .bind(resolution.processed_at)
            .bind(resolution.processed_by)
            .bind(&resolution.notes)
            .fetch_optional(&self.pool)
            .await?;
        row_opt.as_ref().map(redemption_from_row).transpose()
    }

    async fn count_by_status(&self, status: RedemptionStatus) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM redemptions WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
