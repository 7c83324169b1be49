//! soundcoin-server/src/api/redemptions.rs

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use soundcoin_core::services::RedemptionRequest;

use super::error::ApiError;
use super::extract::{ApiJson, ApiQuery, BearerToken};
use super::AppState;

pub async fn create_redemption(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiJson(req): ApiJson<RedemptionRequest>,
) -> Result<Json<Value>, ApiError> {
    let receipt = ctx.redemptions.request(req).await?;
    Ok(Json(json!({
        "success": true,
        "redemption": receipt.redemption,
        "balance": receipt.balance.coins,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

pub async fn list_redemptions(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> Result<Json<Value>, ApiError> {
    let redemptions = ctx.redemptions.list_for_user(query.user_id).await?;
    Ok(Json(json!({ "redemptions": redemptions })))
}

pub async fn tiers(State(ctx): State<AppState>) -> Json<Value> {
    Json(json!({
        "coin_value_usd": ctx.redemptions.coin_value_usd(),
        "tiers": ctx.redemptions.tiers(),
    }))
}
