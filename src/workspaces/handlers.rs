use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use log::info;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::storage::{self, WorkspaceChanges};
use super::types::{
    AssignAllResponse, CreateWorkspaceRequest, UpdateWorkspaceRequest, Workspace,
    WorkspaceDetail, WorkspaceSummary,
};
use crate::core::shared::error::{ApiError, ApiResult};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{strip_nul, with_conn, MAX_NAME_CHARS};
use crate::documents::storage as document_storage;

fn clean_name(name: &str) -> ApiResult<String> {
    let name = strip_nul(name.trim());
    if name.is_empty() {
        return Err(ApiError::validation("Workspace name is required"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::validation(format!(
            "Workspace name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    Ok(name)
}

pub async fn handle_create_workspace(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> ApiResult<(StatusCode, Json<Workspace>)> {
    let now = Utc::now();
    let workspace = Workspace {
        id: Uuid::new_v4(),
        name: clean_name(&req.name)?,
        description: req.description.as_deref().map(strip_nul),
        created_at: now,
        updated_at: now,
    };

    let created = workspace.clone();
    with_conn(&state.conn, move |conn| {
        storage::insert_workspace(conn, &workspace)?;
        Ok(())
    })
    .await?;

    info!("Created workspace {} ({})", created.id, created.name);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn handle_list_workspaces(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<WorkspaceSummary>>> {
    let workspaces = with_conn(&state.conn, |conn| Ok(storage::list_workspaces(conn)?)).await?;
    Ok(Json(workspaces))
}

pub async fn handle_get_workspace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WorkspaceDetail>> {
    let detail = with_conn(&state.conn, move |conn| {
        let workspace =
            storage::get_workspace(conn, id)?.ok_or_else(|| ApiError::not_found("Workspace"))?;
        let documents = document_storage::list_documents(conn, Some(id))?;
        Ok(WorkspaceDetail {
            workspace,
            documents,
        })
    })
    .await?;
    Ok(Json(detail))
}

pub async fn handle_update_workspace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateWorkspaceRequest>,
) -> ApiResult<Json<Workspace>> {
    let changes = WorkspaceChanges {
        name: req.name.as_deref().map(clean_name).transpose()?,
        description: req.description.as_deref().map(strip_nul),
        updated_at: Utc::now(),
    };

    let workspace = with_conn(&state.conn, move |conn| {
        if storage::update_workspace(conn, id, &changes)? == 0 {
            return Err(ApiError::not_found("Workspace"));
        }
        storage::get_workspace(conn, id)?.ok_or_else(|| ApiError::not_found("Workspace"))
    })
    .await?;
    Ok(Json(workspace))
}

pub async fn handle_delete_workspace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    with_conn(&state.conn, move |conn| {
        if storage::delete_workspace(conn, id)? == 0 {
            return Err(ApiError::not_found("Workspace"));
        }
        Ok(())
    })
    .await?;

    info!("Deleted workspace {id}");
    Ok(Json(json!({ "message": "Workspace deleted" })))
}

pub async fn handle_assign_all_documents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AssignAllResponse>> {
    let assigned = with_conn(&state.conn, move |conn| {
        if !storage::workspace_exists(conn, id)? {
            return Err(ApiError::not_found("Workspace"));
        }
        Ok(document_storage::assign_all(conn, id)?)
    })
    .await?;

    info!("Assigned {assigned} documents to workspace {id}");
    Ok(Json(AssignAllResponse {
        message: format!("Assigned {assigned} documents to workspace {id}"),
        workspace_id: id,
        assigned,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("  Contracts  ").unwrap(), "Contracts");
        assert_eq!(clean_name("Q3\u{0} deals").unwrap(), "Q3 deals");
        assert_eq!(
            clean_name("   ").unwrap_err().to_string(),
            "Workspace name is required"
        );
    }

    #[test]
    fn test_overlong_name_is_a_client_error() {
        assert!(clean_name(&"w".repeat(MAX_NAME_CHARS)).is_ok());
        let err = clean_name(&"w".repeat(MAX_NAME_CHARS + 1)).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Workspace name must be at most 255 characters"
        );
    }
}
