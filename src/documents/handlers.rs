use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use chrono::Utc;
use log::{error, info};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use super::storage::{self, NewDocument};
use super::types::{
    DocumentInfo, ListDocumentsQuery, MoveDocumentQuery, MultiUploadResponse, UploadFailure,
    UploadForm, UploadOutcome, UploadedDocument, UploadedFile,
};
use crate::analysis::{FileKind, SourceDocument};
use crate::core::config::AnalysisConfig;
use crate::core::shared::error::{ApiError, ApiResult};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{strip_nul, with_conn, MAX_NAME_CHARS};
use crate::workspaces::storage::ensure_workspace;

/// Checks the extension against the allow-list, then the size, then that the
/// name fits its column.
pub fn validate_upload(
    config: &AnalysisConfig,
    filename: &str,
    size: usize,
) -> ApiResult<FileKind> {
    let extension = if filename.contains('.') {
        FileKind::extension_of(filename)
    } else {
        String::new()
    };

    let kind = match extension.parse::<FileKind>() {
        Ok(kind) if config.is_allowed_extension(&extension) => kind,
        _ => {
            return Err(ApiError::UnsupportedFileType {
                extension,
                allowed: config.allowed_extensions.join(", "),
            })
        }
    };

    if size > config.max_upload_bytes {
        return Err(ApiError::FileTooLarge {
            size,
            limit_mb: config.max_upload_mb(),
        });
    }

    if filename.chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::validation(format!(
            "Filename must be at most {MAX_NAME_CHARS} characters"
        )));
    }

    Ok(kind)
}

pub fn parse_flag(value: &str) -> ApiResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ApiError::validation(format!("Invalid boolean value: {other}"))),
    }
}

/// Reads `file`/`files`, `workspace_id`, `auto_analyze` and `analysis_type`
/// fields from a multipart body.
pub async fn read_upload_form(mut multipart: Multipart) -> ApiResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "files" => {
                let filename = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("unknown")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;
                form.files.push(UploadedFile {
                    filename,
                    data: data.to_vec(),
                });
            }
            "workspace_id" | "auto_analyze" | "analysis_type" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Invalid form field {name}: {e}")))?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match name.as_str() {
                    "workspace_id" => {
                        let id = text
                            .parse()
                            .map_err(|_| ApiError::validation("Invalid workspace_id"))?;
                        form.workspace_id = Some(id);
                    }
                    "auto_analyze" => form.auto_analyze = Some(parse_flag(text)?),
                    _ => form.analysis_type = Some(text.to_string()),
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Validates and stores one upload. With `auto_analyze`, suggestions are
/// computed and cached; a failure there is logged and the upload still
/// succeeds with `suggestions: null`.
pub async fn store_upload(
    state: &AppState,
    file: UploadedFile,
    workspace_id: Option<Uuid>,
    auto_analyze: bool,
) -> ApiResult<UploadedDocument> {
    let filename = strip_nul(&file.filename);
    let kind = validate_upload(&state.config.analysis, &filename, file.data.len())?;

    let doc = NewDocument {
        id: Uuid::new_v4(),
        workspace_id,
        filename,
        file_type: kind.as_str().to_string(),
        file_size: file.data.len() as i64,
        file_data: file.data,
        created_at: Utc::now(),
    };
    let mut uploaded = UploadedDocument {
        id: doc.id,
        filename: doc.filename.clone(),
        file_type: doc.file_type.clone(),
        file_size: doc.file_size,
        workspace_id,
        suggestions: None,
    };

    let doc = with_conn(&state.conn, move |conn| {
        ensure_workspace(conn, workspace_id)?;
        storage::insert_document(conn, &doc)?;
        Ok(doc)
    })
    .await?;
    info!(
        "Stored document {} ({}, {} bytes, workspace {:?})",
        doc.id, doc.filename, doc.file_size, workspace_id
    );

    if auto_analyze {
        let source = SourceDocument {
            id: doc.id,
            filename: doc.filename,
            kind,
            data: doc.file_data,
        };
        uploaded.suggestions = cache_suggestions(state, &source).await;
    }

    Ok(uploaded)
}

async fn cache_suggestions(state: &AppState, source: &SourceDocument) -> Option<Value> {
    let suggestions = match state.analysis.suggestions(source).await {
        Ok(value) => value,
        Err(e) => {
            error!("Auto-analysis failed for document {}: {e}", source.id);
            return None;
        }
    };

    let id = source.id;
    let stored = suggestions.clone();
    match with_conn(&state.conn, move |conn| {
        Ok(storage::set_suggestions(conn, id, &stored)?)
    })
    .await
    {
        Ok(_) => Some(suggestions),
        Err(e) => {
            error!("Failed to cache suggestions for document {id}: {e}");
            None
        }
    }
}

pub async fn handle_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<Json<UploadedDocument>> {
    let form = read_upload_form(multipart).await?;
    let file = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::validation("No file uploaded"))?;

    let uploaded = store_upload(
        &state,
        file,
        form.workspace_id,
        form.auto_analyze.unwrap_or(true),
    )
    .await?;
    Ok(Json(uploaded))
}

/// Client errors for one file are reported in its slot; anything else
/// aborts the whole request.
pub async fn handle_upload_multiple(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<Json<MultiUploadResponse>> {
    let form = read_upload_form(multipart).await?;
    if form.files.is_empty() {
        return Err(ApiError::validation("No files uploaded"));
    }
    let auto_analyze = form.auto_analyze.unwrap_or(true);

    let mut uploaded = Vec::with_capacity(form.files.len());
    for file in form.files {
        let filename = file.filename.clone();
        match store_upload(&state, file, form.workspace_id, auto_analyze).await {
            Ok(doc) => uploaded.push(UploadOutcome::Uploaded(doc)),
            Err(e) if e.status_code().is_client_error() => {
                uploaded.push(UploadOutcome::Failed(UploadFailure {
                    filename,
                    error: e.to_string(),
                }))
            }
            Err(e) => return Err(e),
        }
    }

    Ok(Json(MultiUploadResponse { uploaded }))
}

pub async fn handle_list_documents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDocumentsQuery>,
) -> ApiResult<Json<Vec<DocumentInfo>>> {
    let docs = with_conn(&state.conn, move |conn| {
        Ok(storage::list_documents(conn, query.workspace_id)?)
    })
    .await?;
    Ok(Json(docs))
}

pub async fn handle_get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DocumentInfo>> {
    let doc = with_conn(&state.conn, move |conn| {
        storage::get_document_info(conn, id)?.ok_or_else(|| ApiError::not_found("Document"))
    })
    .await?;
    Ok(Json(doc))
}

pub async fn handle_delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    with_conn(&state.conn, move |conn| {
        if storage::delete_document(conn, id)? == 0 {
            return Err(ApiError::not_found("Document"));
        }
        Ok(())
    })
    .await?;

    info!("Deleted document {id}");
    Ok(Json(json!({ "message": "Document deleted" })))
}

pub async fn handle_move_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<MoveDocumentQuery>,
) -> ApiResult<Json<Value>> {
    let workspace_id = query.workspace_id;
    with_conn(&state.conn, move |conn| {
        ensure_workspace(conn, Some(workspace_id))?;
        if storage::set_workspace(conn, id, Some(workspace_id))? == 0 {
            return Err(ApiError::not_found("Document"));
        }
        Ok(())
    })
    .await?;

    Ok(Json(json!({
        "message": "Document moved to workspace",
        "document_id": id,
        "workspace_id": workspace_id,
    })))
}
