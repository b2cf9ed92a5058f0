use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub mod handlers;
pub mod storage;
pub mod types;

pub use types::{DocumentInfo, UploadedDocument, UploadedFile};

pub fn configure_documents_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(handlers::handle_upload))
        .route("/upload-multiple", post(handlers::handle_upload_multiple))
        .route("/documents", get(handlers::handle_list_documents))
        .route(
            "/documents/{id}",
            get(handlers::handle_get_document).delete(handlers::handle_delete_document),
        )
        .route(
            "/documents/{id}/workspace",
            put(handlers::handle_move_document),
        )
}
