//! soundcoin-server/src/api/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;
use soundcoin_core::Error;

/// Everything a handler can fail with, rendered as `{error: "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    MethodNotAllowed,
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Core(e)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".into()),
            ApiError::Core(e) => match e {
                Error::InsufficientFunds { .. } => (StatusCode::BAD_REQUEST, "Insufficient coins".into()),
                Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                Error::Json(e) => (StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e)),
                Error::NotFound(msg) => (StatusCode::NOT_FOUND, format!("Not found: {}", msg)),
                Error::InvalidTransition(msg) => (StatusCode::CONFLICT, msg.clone()),
                Error::Auth(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".into()),
                other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("request failed: {}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_status_codes() {
        let cases = [
            (ApiError::from(Error::InsufficientFunds { balance: 1, requested: 2 }), StatusCode::BAD_REQUEST),
            (ApiError::from(Error::Validation("x".into())), StatusCode::BAD_REQUEST),
            (ApiError::from(Error::NotFound("x".into())), StatusCode::NOT_FOUND),
            (ApiError::from(Error::InvalidTransition("x".into())), StatusCode::CONFLICT),
            (ApiError::from(Error::Upstream("x".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_and_message().0, expected);
        }
    }

    #[test]
    fn insufficient_funds_uses_the_client_message() {
        let (_, msg) = ApiError::from(Error::InsufficientFunds { balance: 500, requested: 1000 })
            .status_and_message();
        assert_eq!(msg, "Insufficient coins");
    }
}
