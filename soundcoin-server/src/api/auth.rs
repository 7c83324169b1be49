//! soundcoin-server/src/api/auth.rs
//!
//! Signup and login are relayed to the auth provider; its status and body
//! come back untouched.

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use soundcoin_core::HttpResponse;

use super::error::ApiError;
use super::extract::ApiJson;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(ctx): State<AppState>,
    ApiJson(body): ApiJson<RegisterBody>,
) -> Result<Response, ApiError> {
    let upstream = ctx
        .auth
        .register(&body.email, &body.password, body.full_name.as_deref())
        .await?;
    Ok(relay(upstream))
}

pub async fn login(
    State(ctx): State<AppState>,
    ApiJson(body): ApiJson<LoginBody>,
) -> Result<Response, ApiError> {
    let upstream = ctx.auth.login(&body.email, &body.password).await?;
    Ok(relay(upstream))
}

fn relay(upstream: HttpResponse) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, [(CONTENT_TYPE, "application/json")], upstream.body).into_response()
}
