//! Error types for the gateway crate.
//!
//! Every request failure ends up as a [`GatewayError`] and is turned into the
//! response envelope in exactly one place, its [`IntoResponse`] impl.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use slotgate_core::CoreError;
use slotgate_store::StoreError;

/// Errors that can occur while handling a command request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The single-command slot parsed as an integer outside `[0, 16)`.
    #[error("slot {0} out of range: must be in [0, 16)")]
    SlotOutOfRange(String),

    /// The single-command token is not whitelisted.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// The request is malformed or its arguments fail validation.
    #[error("{0}")]
    InvalidRequest(String),

    /// The backend could not be reached or rejected the command.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CoreError> for GatewayError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SlotOutOfRange { slot } => GatewayError::SlotOutOfRange(slot),
            other => GatewayError::InvalidRequest(other.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match &self {
            GatewayError::SlotOutOfRange(_) => (StatusCode::BAD_REQUEST, Json(json!({}))).into_response(),
            GatewayError::UnknownCommand(_) => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
            GatewayError::InvalidRequest(_) | GatewayError::Store(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({"message": self.to_string()}))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = match axum::body::to_bytes(resp.into_body(), 1024).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        }
    }

    #[tokio::test]
    async fn slot_out_of_range_is_400_with_empty_object() {
        let resp = GatewayError::SlotOutOfRange("16".to_owned()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({}));
    }

    #[tokio::test]
    async fn unknown_command_is_404_with_empty_object() {
        let resp = GatewayError::UnknownCommand("GET".to_owned()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await, json!({}));
    }

    #[tokio::test]
    async fn store_error_is_400_with_backend_text() {
        let err = GatewayError::Store(StoreError::Backend("WRONGTYPE Operation".to_owned()));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({"message": "WRONGTYPE Operation"}));
    }

    #[test]
    fn core_errors_map_to_matching_variants() {
        let out_of_range = GatewayError::from(CoreError::SlotOutOfRange { slot: "-1".to_owned() });
        assert!(matches!(out_of_range, GatewayError::SlotOutOfRange(ref s) if s == "-1"));

        let arity = GatewayError::from(CoreError::Arity { command: "ZRANGE", expected: "3 or 4", got: 1 });
        assert!(matches!(arity, GatewayError::InvalidRequest(ref m) if m.contains("ZRANGE")));
    }
}
