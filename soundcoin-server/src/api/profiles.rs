//! soundcoin-server/src/api/profiles.rs
//!
//! Profile, balance and transaction reads. Balances can be polled with an
//! ETag carrying the balance version, or followed over server-sent events.

use std::convert::Infallible;
use std::time::Duration;
use axum::extract::State;
use axum::http::header::{ETAG, IF_NONE_MATCH};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::future;
use futures_util::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;
use uuid::Uuid;
use soundcoin_common::models::BalanceSnapshot;

use super::error::ApiError;
use super::extract::{ApiPath, ApiQuery, BearerToken};
use super::AppState;

pub async fn get_profile(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let profile = ctx.ledger.get_profile(user_id).await?;
    Ok(Json(json!({ "profile": profile })))
}

fn etag_for(snapshot: &BalanceSnapshot) -> String {
    format!("\"{}\"", snapshot.version)
}

pub async fn get_balance(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(user_id): ApiPath<Uuid>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let snapshot = ctx.ledger.get_balance(user_id).await?;
    let etag = etag_for(&snapshot);
    let etag_value = HeaderValue::from_str(&etag)
        .map_err(|e| ApiError::BadRequest(format!("bad etag: {}", e)))?;

    let unchanged = headers
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.split(',').any(|tag| tag.trim() == etag));
    if unchanged {
        return Ok((StatusCode::NOT_MODIFIED, [(ETAG, etag_value)]).into_response());
    }

    Ok(([(ETAG, etag_value)], Json(snapshot)).into_response())
}

fn balance_event(snapshot: &BalanceSnapshot) -> Event {
    Event::default()
        .event("balance")
        .id(snapshot.version.to_string())
        .json_data(snapshot)
        .unwrap_or_else(|_| Event::default().event("balance"))
}

/// First event is the balance as of subscription; later events follow every
/// change for this user. Bursts collapse to the newest version.
pub async fn balance_stream(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let rx = ctx.event_bus.watch_balance(user_id);
    let current = ctx.ledger.get_balance(user_id).await?;
    debug!("balance stream opened for {}", user_id);

    let mut last_version = current.version;
    let updates = WatchStream::new(rx).filter_map(move |latest| {
        let event = match latest {
            Some(snap) if snap.version > last_version => {
                last_version = snap.version;
                Some(Ok(balance_event(&snap)))
            }
            _ => None,
        };
        future::ready(event)
    });
    let stream = stream::once(async move { Ok(balance_event(&current)) }).chain(updates);

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub limit: Option<i64>,
}

pub async fn list_transactions(
    State(ctx): State<AppState>,
    _token: BearerToken,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> Result<Json<Value>, ApiError> {
    let transactions = ctx.ledger.list_transactions(user_id, query.limit).await?;
    Ok(Json(json!({ "transactions": transactions })))
}
