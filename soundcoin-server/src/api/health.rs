//! soundcoin-server/src/api/health.rs

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
