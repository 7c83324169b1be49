//! soundcoin-server/src/api/admin.rs
//!
//! Admin surface: stats, redemption review, catalog maintenance.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use soundcoin_common::models::{NewAd, NewTrack, RedemptionStatus};

use super::error::ApiError;
use super::extract::{ApiJson, ApiPath, ApiQuery, BearerToken};
use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/redemptions", get(list_redemptions))
        .route("/api/admin/redemptions/{id}/approve", post(approve))
        .route("/api/admin/redemptions/{id}/reject", post(reject))
        .route("/api/admin/redemptions/{id}/complete", post(complete))
        .route("/api/admin/tracks", get(list_tracks).post(create_track))
        .route("/api/admin/tracks/{id}/deactivate", post(deactivate_track))
        .route("/api/admin/ads", get(list_ads).post(create_ad))
        .route("/api/admin/ads/{id}/deactivate", post(deactivate_ad))
}

async fn stats(State(ctx): State<AppState>, _token: BearerToken) -> Result<Json<Value>, ApiError> {
    let stats = ctx.admin.stats().await?;
    Ok(Json(json!(stats)))
}

#[derive(Debug, Deserialize)]
pub struct RedemptionListQuery {
    pub status: Option<RedemptionStatus>,
    pub limit: Option<i64>,
}

async fn list_redemptions(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiQuery(query): ApiQuery<RedemptionListQuery>,
) -> Result<Json<Value>, ApiError> {
    let redemptions = ctx.redemptions.list_by_status(query.status, query.limit).await?;
    Ok(Json(json!({ "redemptions": redemptions })))
}

#[derive(Debug, Deserialize)]
pub struct ResolutionBody {
    pub admin_id: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
}

async fn resolve(
    ctx: AppState,
    id: Uuid,
    target: RedemptionStatus,
    body: ResolutionBody,
) -> Result<Json<Value>, ApiError> {
    let redemption = ctx.redemptions.resolve(id, target, body.admin_id, body.notes).await?;
    Ok(Json(json!({ "success": true, "redemption": redemption })))
}

async fn approve(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ResolutionBody>,
) -> Result<Json<Value>, ApiError> {
    resolve(ctx, id, RedemptionStatus::Approved, body).await
}

async fn reject(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ResolutionBody>,
) -> Result<Json<Value>, ApiError> {
    resolve(ctx, id, RedemptionStatus::Rejected, body).await
}

async fn complete(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ResolutionBody>,
) -> Result<Json<Value>, ApiError> {
    resolve(ctx, id, RedemptionStatus::Completed, body).await
}

async fn list_tracks(State(ctx): State<AppState>, _token: BearerToken) -> Result<Json<Value>, ApiError> {
    let tracks = ctx.catalog.list_recent().await?;
    Ok(Json(json!({ "tracks": tracks })))
}

async fn create_track(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiJson(new): ApiJson<NewTrack>,
) -> Result<Json<Value>, ApiError> {
    let track = ctx.catalog.create_track(new).await?;
    Ok(Json(json!({ "success": true, "track": track })))
}

async fn deactivate_track(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ctx.catalog.deactivate(id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn list_ads(State(ctx): State<AppState>, _token: BearerToken) -> Result<Json<Value>, ApiError> {
    let ads = ctx.ads.list_ads().await?;
    Ok(Json(json!({ "ads": ads })))
}

async fn create_ad(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiJson(new): ApiJson<NewAd>,
) -> Result<Json<Value>, ApiError> {
    let ad = ctx.ads.create_ad(new).await?;
    Ok(Json(json!({ "success": true, "ad": ad })))
}

async fn deactivate_ad(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ctx.ads.deactivate_ad(id).await?;
    Ok(Json(json!({ "success": true })))
}
