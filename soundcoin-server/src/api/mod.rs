//! soundcoin-server/src/api/mod.rs
//!
//! The HTTP edge: routes, CORS and the JSON fallbacks.

pub mod error;
pub mod extract;

mod admin;
mod ads;
mod auth;
mod health;
mod player;
mod profiles;
mod redemptions;
mod tracks;

use std::sync::Arc;
use axum::extract::Request;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::context::ServerContext;
use error::ApiError;

pub type AppState = Arc<ServerContext>;

pub fn build_router(ctx: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/tracks", get(tracks::list_tracks))
        .route("/api/tracks/filters", get(tracks::filters))
        .route("/api/tracks/{id}", get(tracks::get_track))
        .route("/api/tracks/{id}/play", post(tracks::record_play))
        .route("/api/ads/view", post(ads::record_view))
        .route(
            "/api/redemptions",
            post(redemptions::create_redemption).get(redemptions::list_redemptions),
        )
        .route("/api/redemptions/tiers", get(redemptions::tiers))
        .route("/api/profiles/{id}", get(profiles::get_profile))
        .route("/api/profiles/{id}/balance", get(profiles::get_balance))
        .route("/api/profiles/{id}/balance/stream", get(profiles::balance_stream))
        .route("/api/profiles/{id}/transactions", get(profiles::list_transactions))
        .merge(admin::routes())
        .merge(player::routes())
        .fallback(path_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(ctx)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(cors)),
        )
}

async fn path_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Path {} not found", uri.path()))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Preflight requests never reach a handler; every response carries the
/// permissive CORS headers.
async fn cors(req: Request, next: Next) -> Response {
    let mut resp = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };

    let headers = resp.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, PATCH, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization, If-None-Match"),
    );
    resp
}
