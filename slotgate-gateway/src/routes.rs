//! Axum router for the gateway: one authenticated `POST /`.
//!
//! A body sent with `Content-Type: application/json` is a batch; any other
//! body is a single slash-delimited command.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use slotgate_store::SlotPool;
use tower_http::trace::TraceLayer;

use crate::{
    auth::{self, Credential},
    batch::BatchExecutor,
    executor::CommandExecutor,
    registry::Registry,
};

// ── Shared state ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct AppState {
    single: CommandExecutor,
    batch: BatchExecutor,
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router around an already constructed pool.
pub fn create_router(pool: Arc<SlotPool>, credential: Arc<Credential>) -> Router {
    let registry = Arc::new(Registry::new());
    let state = AppState {
        single: CommandExecutor::new(Arc::clone(&pool), Arc::clone(&registry)),
        batch: BatchExecutor::new(pool, registry),
    };

    Router::new()
        .route(
            "/",
            post(dispatch).route_layer(middleware::from_fn_with_state(credential, auth::require_basic_auth)),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `POST /`: route to the batch or single-command executor.
async fn dispatch(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if is_json(&headers) {
        match state.batch.execute_body(&body).await {
            Ok(replies) => Json(replies).into_response(),
            Err(e) => e.into_response(),
        }
    } else {
        match state.single.execute(&body).await {
            Ok(reply) => Json(reply).into_response(),
            Err(e) => e.into_response(),
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Method, Request, StatusCode},
    };
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::{json, Value};
    use slotgate_store::MemoryConnector;
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> (Router, MemoryConnector) {
        let connector = MemoryConnector::new();
        let pool = Arc::new(SlotPool::new(Arc::new(connector.clone())));
        let credential = match Credential::new("gateway", "s3cret") {
            Ok(c) => Arc::new(c),
            Err(e) => panic!("hashing failed: {e}"),
        };
        (create_router(pool, credential), connector)
    }

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    fn request(auth: Option<&str>, content_type: Option<&str>, body: impl Into<Body>) -> Request<Body> {
        let mut builder = Request::builder().method(Method::POST).uri("/");
        if let Some(auth) = auth {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        match builder.body(body.into()) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        }
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Bytes) {
        let resp = match app.oneshot(req).await {
            Ok(r) => r,
            Err(e) => panic!("handler error: {e}"),
        };
        let status = resp.status();
        match axum::body::to_bytes(resp.into_body(), 64 * 1024).await {
            Ok(b) => (status, b),
            Err(e) => panic!("failed to read body: {e}"),
        }
    }

    fn json_body(bytes: &Bytes) -> Value {
        match serde_json::from_slice(bytes) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON: {e}"),
        }
    }

    #[tokio::test]
    async fn single_command_success_wraps_reply_in_command_name() {
        let (app, _) = test_app();
        let auth = basic("gateway", "s3cret");
        let (status, body) = send(app, request(Some(&auth), None, "0/SADD/s/a/b")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!({"SADD": 2}));
    }

    #[tokio::test]
    async fn single_command_error_statuses_and_bodies() {
        let (app, connector) = test_app();
        let auth = basic("gateway", "s3cret");

        let (status, body) = send(app.clone(), request(Some(&auth), None, "16/SADD/s/a")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body), json!({}));

        let (status, body) = send(app.clone(), request(Some(&auth), None, "0/HGETALL/h")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_body(&body), json!({}));

        let (status, body) = send(app, request(Some(&auth), None, "0/ZRANGE/z")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&body)["message"].as_str().is_some_and(|m| m.contains("ZRANGE")));

        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn batch_request_returns_ordered_array() {
        let (app, _) = test_app();
        let auth = basic("gateway", "s3cret");
        let body = json!({
            "db": "0",
            "cmds": [
                {"cmd": "sadd", "args": {"name": "s", "values": ["a", "b"]}},
                {"cmd": "zrange", "args": {"name": "z", "start": 0, "end": -1}}
            ]
        });
        let (status, bytes) = send(
            app,
            request(Some(&auth), Some("application/json; charset=utf-8"), body.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&bytes), json!([2, []]));
    }

    #[tokio::test]
    async fn batch_errors_carry_message() {
        let (app, _) = test_app();
        let auth = basic("gateway", "s3cret");
        let body = json!({"db": 99, "cmds": []});
        let (status, bytes) = send(app, request(Some(&auth), Some("application/json"), body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json_body(&bytes)["message"].is_string());
    }

    #[tokio::test]
    async fn unauthenticated_requests_are_rejected_before_validation() {
        let (app, connector) = test_app();
        let wrong = basic("gateway", "wrong");
        let unknown = basic("intruder", "s3cret");

        for auth in [None, Some(wrong.as_str()), Some(unknown.as_str()), Some("Basic %%%")] {
            // An out-of-range slot would be a 400 if validation ran first.
            let (status, body) = send(app.clone(), request(auth, None, "99/SADD/s/a")).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "auth {auth:?}");
            assert_eq!(&body[..], b"Unauthorized Access");
        }
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn only_post_is_routed() {
        let (app, _) = test_app();
        let auth = basic("gateway", "s3cret");
        for credentials in [None, Some(auth.as_str())] {
            for method in [Method::GET, Method::PUT, Method::DELETE] {
                let mut builder = Request::builder().method(method.clone()).uri("/");
                if let Some(credentials) = credentials {
                    builder = builder.header(AUTHORIZATION, credentials);
                }
                let req = match builder.body(Body::empty()) {
                    Ok(r) => r,
                    Err(e) => panic!("failed to build request: {e}"),
                };
                let (status, _) = send(app.clone(), req).await;
                assert_eq!(
                    status,
                    StatusCode::METHOD_NOT_ALLOWED,
                    "{method} with credentials {credentials:?} must be routed before auth"
                );
            }
        }
    }

    #[test]
    fn content_type_detection_ignores_parameters_and_case() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));
        headers.insert(CONTENT_TYPE, axum::http::HeaderValue::from_static("Application/JSON; charset=utf-8"));
        assert!(is_json(&headers));
        headers.insert(CONTENT_TYPE, axum::http::HeaderValue::from_static("text/plain"));
        assert!(!is_json(&headers));
    }
}
