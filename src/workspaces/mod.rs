use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;

pub mod handlers;
pub mod storage;
pub mod types;

pub use types::{Workspace, WorkspaceDetail, WorkspaceSummary};

pub fn configure_workspaces_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/workspaces",
            get(handlers::handle_list_workspaces).post(handlers::handle_create_workspace),
        )
        .route(
            "/workspaces/{id}",
            get(handlers::handle_get_workspace)
                .put(handlers::handle_update_workspace)
                .delete(handlers::handle_delete_workspace),
        )
        .route(
            "/workspaces/{id}/assign-all",
            post(handlers::handle_assign_all_documents),
        )
}
