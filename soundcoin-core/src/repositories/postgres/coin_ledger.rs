// File: soundcoin-core/src/repositories/postgres/coin_ledger.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;
use soundcoin_common::error::Error;
use soundcoin_common::models::{BalanceSnapshot, CoinTransaction, LedgerEntry, LedgerReceipt, TransactionKind};
use soundcoin_common::traits::repository_traits::CoinLedgerRepository;

pub struct PostgresCoinLedgerRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresCoinLedgerRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Applies one ledger entry inside the caller's transaction.
///
/// The balance update is a single guarded statement, so concurrent writers
/// serialize on the profile row and a debit can never take `coins` below zero.
pub(crate) async fn apply_entry_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry: &LedgerEntry,
) -> Result<LedgerReceipt, Error> {
    let updated = sqlx::query(
        r#"
        UPDATE profiles
        SET coins = coins + $1,
            balance_version = balance_version + 1,
            total_earned = total_earned + GREATEST($1, 0),
            updated_at = NOW()
        WHERE id = $2
          AND coins + $1 >= 0
        RETURNING coins, balance_version
        "#,
    )
        .bind(entry.amount)
        .bind(entry.user_id)
        .fetch_optional(&mut **tx)
        .await?;

    let row = match updated {
        Some(r) => r,
        None => {
            let current: Option<i64> = sqlx::query_scalar("SELECT coins FROM profiles WHERE id = $1")
                .bind(entry.user_id)
                .fetch_optional(&mut **tx)
                .await?;
            return Err(match current {
                Some(balance) => Error::InsufficientFunds { balance, requested: -entry.amount },
                None if entry.is_debit() => Error::InsufficientFunds { balance: 0, requested: -entry.amount },
                None => Error::NotFound(format!("profile {}", entry.user_id)),
            });
        }
    };

    let transaction = entry.to_transaction(Utc::now());
    sqlx::query(
        r#"
        INSERT INTO coin_transactions (
            id,
            user_id,
            amount,
            kind,
            description,
            related_ad_id,
            created_at
        )
        VALUES ($1,$2,$3,$4,$5,$6,$7)
        "#,
    )
        .bind(transaction.id)
        .bind(transaction.user_id)
        .bind(transaction.amount)
        .bind(transaction.kind.as_str())
        .bind(&transaction.description)
        .bind(transaction.related_ad_id)
        .bind(transaction.created_at)
        .execute(&mut **tx)
        .await?;

    Ok(LedgerReceipt {
        transaction,
        balance: BalanceSnapshot {
            user_id: entry.user_id,
            coins: row.try_get("coins")?,
            version: row.try_get("balance_version")?,
        },
    })
}

fn transaction_from_row(r: &PgRow) -> Result<CoinTransaction, Error> {
    let kind: String = r.try_get("kind")?;
    Ok(CoinTransaction {
        id: r.try_get("id")?,
        user_id: r.try_get("user_id")?,
        amount: r.try_get("amount")?,
        kind: kind.parse::<TransactionKind>()?,
        description: r.try_get("description")?,
        related_ad_id: r.try_get("related_ad_id")?,
        created_at: r.try_get("created_at")?,
    })
}

#[async_trait]
impl CoinLedgerRepository for PostgresCoinLedgerRepository {
    async fn apply_entry(&self, entry: &LedgerEntry) -> Result<LedgerReceipt, Error> {
        let mut tx = self.pool.begin().await?;
        let receipt = apply_entry_in_tx(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(receipt)
    }

    async fn list_transactions(&self, user_id: Uuid, limit: i64) -> Result<Vec<CoinTransaction>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, amount, kind, description, related_ad_id, created_at
            FROM coin_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(transaction_from_row).collect()
    }

    async fn ledger_sum(&self, user_id: Uuid) -> Result<i64, Error> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::BIGINT FROM coin_transactions WHERE user_id = $1",
        )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(sum)
    }
}
