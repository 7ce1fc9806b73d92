//! HTTP surface for the gateway.
//!
//! A thin axum layer over [`Gateway`]: one processing endpoint plus
//! introspection routes for stats and the audit trail. The credential
//! endpoint accepts a secret and returns nothing; the value is handed
//! straight to the invoker and never appears in any response or log line.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use llmgate_core::GatewayError;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::pipeline::Gateway;

/// Inputs longer than this are rejected before any processing.
pub const MAX_INPUT_CHARS: usize = 10_000;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// Build the gateway router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/process", post(process))
        .route("/v1/stats", get(stats))
        .route("/v1/audit", get(audit))
        .route("/v1/credential", put(set_credential))
        .with_state(state)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct ProcessRequest {
    use_case: String,
    input: String,
}

async fn process(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> Response {
    if request.input.chars().count() > MAX_INPUT_CHARS {
        return api_error(
            StatusCode::BAD_REQUEST,
            format!("input exceeds {MAX_INPUT_CHARS} characters"),
        );
    }

    match state.gateway.process(&request.use_case, &request.input).await {
        Ok(result) => {
            info!(use_case = %request.use_case, model = %result.model_used,
                  pii = result.pii_tokenized_count, "request processed");
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(GatewayError::ConfigNotFound { use_case }) => api_error(
            StatusCode::NOT_FOUND,
            format!("unknown use case: {use_case}"),
        ),
        Err(err) => api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

async fn stats(State(state): State<AppState>) -> Json<Value> {
    let stats = state.gateway.stats().await;
    Json(json!(stats))
}

#[derive(Debug, Deserialize)]
struct AuditQuery {
    #[serde(default = "default_audit_limit")]
    limit: usize,
}

fn default_audit_limit() -> usize {
    10
}

async fn audit(State(state): State<AppState>, Query(query): Query<AuditQuery>) -> Json<Value> {
    let entries = state.gateway.audit_log(query.limit).await;
    Json(json!({ "count": entries.len(), "entries": entries }))
}

#[derive(Deserialize)]
struct CredentialRequest {
    credential: String,
}

async fn set_credential(
    State(state): State<AppState>,
    Json(request): Json<CredentialRequest>,
) -> StatusCode {
    state
        .gateway
        .set_credential(SecretString::new(request.credential));
    StatusCode::NO_CONTENT
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::StaticInvoker;
    use crate::templates::InMemoryTemplateRegistry;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let gateway = Gateway::new(
            Arc::new(InMemoryTemplateRegistry::built_in()),
            Arc::new(StaticInvoker::new(
                r#"{"category": "billing", "confidence": 0.9, "reasoning": "ok"}"#,
            )),
        )
        .unwrap();
        build_router(AppState {
            gateway: Arc::new(gateway),
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_process_known_use_case() {
        let app = test_app();
        let response = app
            .oneshot(post_json(
                "/v1/process",
                json!({ "use_case": "support_ticket_classifier", "input": "why was I billed" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["model_used"], "gpt-4o-mini");
        assert_eq!(body["backend_output"]["data"]["category"], "billing");
    }

    #[tokio::test]
    async fn test_process_unknown_use_case_is_404() {
        let app = test_app();
        let response = app
            .oneshot(post_json(
                "/v1/process",
                json!({ "use_case": "bogus", "input": "hello" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_process_oversized_input_is_400() {
        let app = test_app();
        let input = "x".repeat(MAX_INPUT_CHARS + 1);
        let response = app
            .oneshot(post_json(
                "/v1/process",
                json!({ "use_case": "support_ticket_classifier", "input": input }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stats_starts_empty() {
        let app = test_app();
        let response = app
            .oneshot(Request::builder().uri("/v1/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["requests"], 0);
        assert_eq!(body["total_cost"], 0.0);
    }

    #[tokio::test]
    async fn test_audit_reflects_processed_requests() {
        let app = test_app();
        app.clone()
            .oneshot(post_json(
                "/v1/process",
                json!({ "use_case": "support_ticket_classifier", "input": "billing question" }),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/audit?limit=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["entries"][0]["use_case"], "support_ticket_classifier");
    }

    #[tokio::test]
    async fn test_set_credential_returns_no_content_and_no_body() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/v1/credential")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "credential": "sk-test" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_audit_entries_never_contain_raw_pii() {
        let app = test_app();
        app.clone()
            .oneshot(post_json(
                "/v1/process",
                json!({
                    "use_case": "support_ticket_classifier",
                    "input": "contact me at jane@corp.example or 555-867-5309"
                }),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/audit")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        let serialized = body.to_string();
        assert!(!serialized.contains("jane@corp.example"));
        assert!(!serialized.contains("555-867-5309"));
        assert_eq!(body["entries"][0]["pii_masked_count"], 2);
    }
}
