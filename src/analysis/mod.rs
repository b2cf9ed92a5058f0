use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub mod content;
pub mod docx;
pub mod export;
pub mod handlers;
pub mod prompts;
pub mod service;
pub mod storage;
pub mod task;
pub mod types;

pub use content::{build_comparison_parts, build_file_content, FileKind, ModelChoice, ModelInput};
pub use service::{AnalysisService, SourceDocument};
pub use storage::AnalysisRecord;
pub use task::{AnalysisTask, AnalysisType};

pub fn configure_analysis_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze", post(handlers::handle_analyze))
        .route("/analyze-upload", post(handlers::handle_analyze_upload))
        .route(
            "/analysis/{document_id}",
            get(handlers::handle_analysis_history),
        )
        .route("/report", post(handlers::handle_report))
        .route("/slides", post(handlers::handle_slides))
        .route("/export/{document_id}", get(handlers::handle_export))
        .route("/suggest/{document_id}", get(handlers::handle_suggestions))
}
