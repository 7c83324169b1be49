// File: soundcoin-core/src/repositories/postgres/ads.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;
use soundcoin_common::error::Error;
use soundcoin_common::models::{Ad, AdKind};
use soundcoin_common::traits::repository_traits::AdRepository;

pub struct PostgresAdRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresAdRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn ad_from_row(r: &PgRow) -> Result<Ad, Error> {
    let kind: String = r.try_get("kind")?;
    Ok(Ad {
        id: r.try_get("id")?,
        kind: kind.parse::<AdKind>()?,
        title: r.try_get("title")?,
        content_url: r.try_get("content_url")?,
        duration: r.try_get("duration")?,
        subtitle_text: r.try_get("subtitle_text")?,
        coin_reward: r.try_get("coin_reward")?,
        impressions: r.try_get("impressions")?,
        active: r.try_get("active")?,
        created_at: r.try_get("created_at")?,
    })
}

#[async_trait]
impl AdRepository for PostgresAdRepository {
    async fn create_ad(&self, ad: &Ad) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO ads (
                id,
                kind,
                title,
                content_url,
                duration,
                subtitle_text,
                coin_reward,
                impressions,
                active,
                created_at
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
            "#,
        )
            .bind(ad.id)
            .bind(ad.kind.as_str())
            .bind(&ad.title)
            .bind(&ad.content_url)
            .bind(ad.duration)
            .bind(&ad.subtitle_text)
            .bind(ad.coin_reward)
            .bind(ad.impressions)
            .bind(ad.active)
            .bind(ad.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_ad(&self, ad_id: Uuid) -> Result<Option<Ad>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT id, kind, title, content_url, duration, subtitle_text,
                   coin_reward, impressions, active, created_at
            FROM ads
            WHERE id = $1
            "#,
        )
            .bind(ad_id)
            .fetch_optional(&self.pool)
            .await?;
        row_opt.as_ref().map(ad_from_row).transpose()
    }

    async fn list_ads(&self, limit: i64) -> Result<Vec<Ad>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, title, content_url, duration, subtitle_text,
                   coin_reward, impressions, active, created_at
            FROM ads
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(ad_from_row).collect()
    }

    async fn next_active_ad(&self, kind: AdKind) -> Result<Option<Ad>, Error> {
        let row_opt = sqlx::query(
            r#"
            SELECT id, kind, title, content_url, duration, subtitle_text,
                   coin_reward, impressions, active, created_at
            FROM ads
            WHERE active = TRUE AND kind = $1
            ORDER BY impressions ASC, created_at ASC
            LIMIT 1
            "#,
        )
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row_opt.as_ref().map(ad_from_row).transpose()
    }

    async fn increment_impressions(&self, ad_id: Uuid) -> Result<(), Error> {
        let result = sqlx::query("UPDATE ads SET impressions = impressions + 1 WHERE id = $1")
            .bind(ad_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("ad {}", ad_id)));
        }
        Ok(())
    }

    async fn set_ad_active(&self, ad_id: Uuid, active: bool) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE ads SET active = $2 WHERE id = $1")
            .bind(ad_id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn count_ads(&self) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ads")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
