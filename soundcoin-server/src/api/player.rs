//! soundcoin-server/src/api/player.rs
//!
//! Server-side player sessions. Clients report what their media element did
//! and get back what to play next.

use axum::extract::State;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use soundcoin_core::services::{SessionSettings, StepOutcome};

use super::error::ApiError;
use super::extract::{ApiJson, ApiPath, BearerToken};
use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/player/sessions", post(open_session))
        .route("/api/player/sessions/{id}", get(session_state).delete(close_session))
        .route("/api/player/sessions/{id}/play", post(play))
        .route("/api/player/sessions/{id}/ended", post(media_ended))
        .route("/api/player/sessions/{id}/next", post(skip_next))
        .route("/api/player/sessions/{id}/previous", post(skip_previous))
        .route("/api/player/sessions/{id}/settings", patch(update_settings))
        .route("/api/player/sessions/{id}/queue", post(enqueue).delete(clear_queue))
}

#[derive(Debug, Deserialize)]
pub struct OpenSessionBody {
    pub user_id: Uuid,
    #[serde(default)]
    pub queue: Vec<Uuid>,
    #[serde(flatten)]
    pub settings: SessionSettings,
}

#[derive(Debug, Deserialize)]
pub struct PlayBody {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct EnqueueBody {
    pub track_id: Uuid,
}

fn step_json(outcome: StepOutcome) -> Json<Value> {
    Json(json!({ "step": outcome.step, "state": outcome.state }))
}

async fn open_session(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiJson(body): ApiJson<OpenSessionBody>,
) -> Result<Json<Value>, ApiError> {
    let state = ctx
        .playback
        .open_session(body.user_id, body.queue, body.settings)
        .await?;
    Ok(Json(json!({ "session_id": state.session_id, "state": state })))
}

async fn session_state(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let state = ctx.playback.state(id).await?;
    Ok(Json(json!({ "state": state })))
}

async fn close_session(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ctx.playback.close_session(id)?;
    Ok(Json(json!({ "success": true })))
}

async fn play(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<PlayBody>,
) -> Result<Json<Value>, ApiError> {
    Ok(step_json(ctx.playback.play(id, body.index).await?))
}

async fn media_ended(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    Ok(step_json(ctx.playback.media_ended(id).await?))
}

async fn skip_next(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    Ok(step_json(ctx.playback.skip_next(id).await?))
}

async fn skip_previous(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    Ok(step_json(ctx.playback.skip_previous(id).await?))
}

async fn update_settings(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(settings): ApiJson<SessionSettings>,
) -> Result<Json<Value>, ApiError> {
    let state = ctx.playback.update_settings(id, settings).await?;
    Ok(Json(json!({ "state": state })))
}

async fn enqueue(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<EnqueueBody>,
) -> Result<Json<Value>, ApiError> {
    let state = ctx.playback.enqueue(id, body.track_id).await?;
    Ok(Json(json!({ "state": state })))
}

async fn clear_queue(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let state = ctx.playback.clear_queue(id).await?;
    Ok(Json(json!({ "state": state })))
}
