//! Service banner and health check

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::shared::utils::{parse_database_url, redact};

pub const FEATURES: [&str; 8] = [
    "workspaces",
    "documents",
    "analysis",
    "comparison",
    "decision_matrix",
    "qa",
    "charts",
    "reports",
];

pub async fn service_info() -> Json<Value> {
    Json(json!({
        "message": "Document Analysis API",
        "version": env!("CARGO_PKG_VERSION"),
        "features": FEATURES,
    }))
}

/// Always answers 200; the body says whether the schema came up.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db = &state.db_status;
    let status = if db.initialized { "ok" } else { "error" };
    let (username, host, port, database) = parse_database_url(&state.config.database.url);

    Json(json!({
        "status": status,
        "service": "docserver",
        "version": env!("CARGO_PKG_VERSION"),
        "db_initialized": db.initialized,
        "db_error": db.error,
        "database": {
            "host": host,
            "port": port,
            "name": database,
            "user": redact(&username),
        },
        "llm_configured": state.config.llm.api_key.as_deref().is_some_and(|k| !k.is_empty()),
    }))
}

pub fn configure_health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::state::DatabaseStatus;
    use crate::core::shared::test_utils::{create_mock_app_state, MockLLMProvider};

    #[tokio::test]
    async fn test_service_info_lists_features() {
        let Json(body) = service_info().await;
        assert_eq!(body["message"], "Document Analysis API");
        assert_eq!(body["features"].as_array().map(Vec::len), Some(8));
        assert_eq!(body["features"][4], "decision_matrix");
    }

    #[tokio::test]
    async fn test_health_reports_database_failure() {
        let state = create_mock_app_state(Arc::new(MockLLMProvider::new()));
        let Json(body) = health_check(State(state)).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["db_initialized"], false);
        assert_eq!(body["database"]["host"], "127.0.0.1");
        assert_eq!(body["database"]["user"], "test...");
    }

    #[tokio::test]
    async fn test_health_ok_when_schema_ready() {
        let state = create_mock_app_state(Arc::new(MockLLMProvider::new()));
        let mut state = Arc::try_unwrap(state).unwrap();
        state.db_status = DatabaseStatus::ready();
        let Json(body) = health_check(State(Arc::new(state))).await;
        assert_eq!(body["status"], "ok");
        assert!(body["db_error"].is_null());
    }
}
