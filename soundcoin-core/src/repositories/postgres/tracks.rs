// File: soundcoin-core/src/repositories/postgres/tracks.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;
use soundcoin_common::error::Error;
use soundcoin_common::models::{Track, TrackFilter};
use soundcoin_common::traits::repository_traits::TrackRepository;

pub struct PostgresTrackRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresTrackRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const TRACK_COLUMNS: &str = r#"
    id, title, artist, album, duration, cover_url, audio_url, genre, mood,
    bpm, tags, plays, likes, created_at, is_ai_generated, source, active
"#;

fn track_from_row(r: &PgRow) -> Result<Track, Error> {
    Ok(Track {
        id: r.try_get("id")?,
        title: r.try_get("title")?,
        artist: r.try_get("artist")?,
        album: r.try_get("album")?,
        duration: r.try_get("duration")?,
        cover_url: r.try_get("cover_url")?,
        audio_url: r.try_get("audio_url")?,
        genre: r.try_get("genre")?,
        mood: r.try_get("mood")?,
        bpm: r.try_get("bpm")?,
        tags: r.try_get("tags")?,
        plays: r.try_get("plays")?,
        likes: r.try_get("likes")?,
        created_at: r.try_get("created_at")?,
        is_ai_generated: r.try_get("is_ai_generated")?,
        source: r.try_get("source")?,
        active: r.try_get("active")?,
    })
}

#[async_trait]
impl TrackRepository for PostgresTrackRepository {
    async fn create_track(&self, track: &Track) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO tracks (
                id, title, artist, album, duration, cover_url, audio_url, genre, mood,
                bpm, tags, plays, likes, created_at, is_ai_generated, source, active
            )
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17)
            "#,
        )
            .bind(track.id)
            .bind(&track.title)
            .bind(&track.artist)
            .bind(&track.album)
            .bind(track.duration)
            .bind(&track.cover_url)
            .bind(&track.audio_url)
            .bind(&track.genre)
            .bind(&track.mood)
            .bind(track.bpm)
            .bind(&track.tags)
            .bind(track.plays)
            .bind(track.likes)
            .bind(track.created_at)
            .bind(track.is_ai_generated)
            .bind(&track.source)
            .bind(track.active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_track(&self, track_id: Uuid) -> Result<Option<Track>, Error> {
        let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = $1");
        let row_opt = sqlx::query(&sql)
            .bind(track_id)
            .fetch_optional(&self.pool)
            .await?;
        row_opt.as_ref().map(track_from_row).transpose()
    }

    async fn search_tracks(&self, filter: &TrackFilter) -> Result<Vec<Track>, Error> {
        let sql = format!(
            r#"
            SELECT {TRACK_COLUMNS}
            FROM tracks
            WHERE active = TRUE
              AND ($1::TEXT IS NULL OR genre = $1)
              AND ($2::TEXT IS NULL OR mood = $2)
              AND ($3::TEXT IS NULL
                   OR title ILIKE $11 ESCAPE '\'
                   OR artist ILIKE $11 ESCAPE '\'
                   OR $3 = ANY(tags))
              AND ($4::INT IS NULL OR bpm >= $4)
              AND ($5::INT IS NULL OR bpm <= $5)
              AND ($6::INT IS NULL OR duration >= $6)
              AND ($7::INT IS NULL OR duration <= $7)
            ORDER BY
              CASE WHEN $8 = 'popular' THEN plays END DESC,
              CASE WHEN $8 = 'duration' THEN duration END ASC,
              CASE WHEN $8 = 'alphabetical' THEN title END ASC,
              created_at DESC
            LIMIT $9 OFFSET $10
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(&filter.genre)
            .bind(&filter.mood)
            .bind(&filter.search)
            .bind(filter.bpm_min)
            .bind(filter.bpm_max)
            .bind(filter.duration_min)
            .bind(filter.duration_max)
            .bind(filter.sort_by.to_string())
            .bind(filter.limit)
            .bind(filter.offset)
            .bind(filter.search.as_deref().map(contains_pattern))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(track_from_row).collect()
    }

    async fn list_genres(&self) -> Result<Vec<String>, Error> {
        let genres: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT genre FROM tracks WHERE active = TRUE AND genre <> '' ORDER BY genre",
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }

    async fn list_moods(&self) -> Result<Vec<String>, Error> {
        let moods: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT mood FROM tracks WHERE active = TRUE AND mood <> '' ORDER BY mood",
        )
            .fetch_all(&self.pool)
            .await?;
        Ok(moods)
    }

    async fn increment_plays(&self, track_id: Uuid) -> Result<(), Error> {
        let result = sqlx::query("UPDATE tracks SET plays = plays + 1 WHERE id = $1")
            .bind(track_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("track {}", track_id)));
        }
        Ok(())
    }

    async fn set_track_active(&self, track_id: Uuid, active: bool) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE tracks SET active = $2 WHERE id = $1")
            .bind(track_id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_recent_tracks(&self, limit: i64) -> Result<Vec<Track>, Error> {
        let sql = format!("SELECT {TRACK_COLUMNS} FROM tracks ORDER BY created_at DESC LIMIT $1");
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(track_from_row).collect()
    }

    async fn count_tracks(&self) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// `%needle%` with LIKE metacharacters in `needle` taken literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("calm"), "%calm%");
        assert_eq!(contains_pattern("100%"), r"%100\%%");
        assert_eq!(contains_pattern("lo_fi"), r"%lo\_fi%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
