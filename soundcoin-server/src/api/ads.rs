//! soundcoin-server/src/api/ads.rs

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::error::ApiError;
use super::extract::{ApiJson, BearerToken};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct AdViewBody {
    pub ad_id: Uuid,
    #[serde(default)]
    pub track_id: Option<Uuid>,
    #[serde(default)]
    pub completed: bool,
    pub user_id: Uuid,
}

pub async fn record_view(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiJson(body): ApiJson<AdViewBody>,
) -> Result<Json<Value>, ApiError> {
    let outcome = ctx
        .ads
        .record_view(body.user_id, body.ad_id, body.track_id, body.completed)
        .await?;
    Ok(Json(json!({
        "success": true,
        "coins_earned": outcome.coins_earned,
    })))
}
