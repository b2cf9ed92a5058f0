//! API Router
//!
//! Combines the endpoints of every domain module into one stateful router.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;

use crate::core::shared::state::AppState;

/// Room for a multi-file upload plus multipart framing.
fn body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.saturating_mul(10).saturating_add(1024 * 1024)
}

pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(crate::main_module::configure_health_routes())
        .merge(crate::workspaces::configure_workspaces_routes())
        .merge(crate::documents::configure_documents_routes())
        .merge(crate::analysis::configure_analysis_routes())
        .merge(crate::comparisons::configure_comparisons_routes())
        .merge(crate::decision_matrix::configure_decision_matrix_routes())
        .merge(crate::qa::configure_qa_routes())
        .merge(crate::charts::configure_charts_routes())
}

pub fn configure_routes(state: Arc<AppState>) -> Router {
    let limit = body_limit(state.config.analysis.max_upload_bytes);
    configure_api_routes()
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::test_utils::{create_mock_app_state, MockLLMProvider};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app(provider: Arc<MockLLMProvider>) -> Router {
        configure_routes(create_mock_app_state(provider))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_body_limit_covers_ten_uploads() {
        assert_eq!(body_limit(1024), 10 * 1024 + 1024 * 1024);
        assert_eq!(body_limit(usize::MAX), usize::MAX);
    }

    #[tokio::test]
    async fn test_banner_and_health() {
        let provider = Arc::new(MockLLMProvider::new());
        let (status, body) = send(
            app(provider.clone()),
            Request::get("/").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Document Analysis API");

        let (status, body) = send(
            app(provider),
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(body["db_initialized"], false);
    }

    #[tokio::test]
    async fn test_compare_needs_two_documents() {
        let provider = Arc::new(MockLLMProvider::new());
        let (status, body) = send(
            app(provider.clone()),
            post_json("/compare", json!({"document_ids": [Uuid::new_v4()]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "At least 2 documents required for comparison");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_decision_matrix_rejects_bad_weights() {
        let provider = Arc::new(MockLLMProvider::new());
        let (status, body) = send(
            app(provider.clone()),
            post_json(
                "/decision-matrix",
                json!({
                    "name": "Vendor choice",
                    "document_ids": [Uuid::new_v4(), Uuid::new_v4()],
                    "criteria": [
                        {"name": "Cost", "weight": 0.6},
                        {"name": "Quality", "weight": 0.5}
                    ]
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Criteria weights must sum to 1.0 (current: 1.1)"
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_qa_requires_a_question() {
        let provider = Arc::new(MockLLMProvider::new());
        let (status, body) = send(
            app(provider.clone()),
            post_json(
                "/qa",
                json!({"document_ids": [Uuid::new_v4()], "question": "   "}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Question is required");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_workspace_name_required() {
        let (status, body) = send(
            app(Arc::new(MockLLMProvider::new())),
            post_json("/workspaces", json!({"name": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Workspace name is required");
    }

    #[tokio::test]
    async fn test_export_rejects_unknown_format() {
        let uri = format!("/export/{}?format=xml", Uuid::new_v4());
        let (status, body) = send(
            app(Arc::new(MockLLMProvider::new())),
            Request::get(uri).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unsupported export format 'xml'. Use json or csv.");
    }

    #[tokio::test]
    async fn test_unreachable_database_is_server_error() {
        let (status, body) = send(
            app(Arc::new(MockLLMProvider::new())),
            Request::get("/documents").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"]
            .as_str()
            .unwrap_or_default()
            .starts_with("Database error"));
    }
}
