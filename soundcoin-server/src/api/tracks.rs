//! soundcoin-server/src/api/tracks.rs

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use soundcoin_common::models::track::DEFAULT_TRACK_LIMIT;
use soundcoin_common::models::{TrackFilter, TrackSort};

use super::error::ApiError;
use super::extract::{ApiPath, ApiQuery};
use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TrackQuery {
    pub genre: Option<String>,
    pub mood: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub bpm_min: Option<i32>,
    pub bpm_max: Option<i32>,
    pub duration_min: Option<i32>,
    pub duration_max: Option<i32>,
    pub sort_by: Option<TrackSort>,
}

impl From<TrackQuery> for TrackFilter {
    fn from(q: TrackQuery) -> Self {
        TrackFilter {
            genre: q.genre,
            mood: q.mood,
            search: q.search,
            bpm_min: q.bpm_min,
            bpm_max: q.bpm_max,
            duration_min: q.duration_min,
            duration_max: q.duration_max,
            sort_by: q.sort_by.unwrap_or_default(),
            limit: q.limit.unwrap_or(DEFAULT_TRACK_LIMIT),
            offset: q.offset.unwrap_or(0),
        }
    }
}

pub async fn list_tracks(
    State(ctx): State<AppState>,
    ApiQuery(query): ApiQuery<TrackQuery>,
) -> Result<Json<Value>, ApiError> {
    let tracks = ctx.catalog.search(query.into()).await?;
    Ok(Json(json!({ "tracks": tracks })))
}

/// Any id that does not name a track, malformed ones included, yields `null`.
pub async fn get_track(
    State(ctx): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Value>, ApiError> {
    let track = match Uuid::parse_str(&id) {
        Ok(id) => ctx.catalog.get(id).await?,
        Err(_) => None,
    };
    Ok(Json(json!({ "track": track })))
}

pub async fn filters(State(ctx): State<AppState>) -> Result<Json<Value>, ApiError> {
    let filters = ctx.catalog.filters().await?;
    Ok(Json(json!({ "genres": filters.genres, "moods": filters.moods })))
}

pub async fn record_play(
    State(ctx): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ctx.catalog.record_play(id).await?;
    Ok(Json(json!({ "success": true })))
}
