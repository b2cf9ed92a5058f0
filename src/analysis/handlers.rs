use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use log::info;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::export::{self, ExportFormat};
use super::storage::{self, AnalysisRecord};
use super::task::{AnalysisTask, AnalysisType};
use super::types::{
    AnalysisRequest, AnalysisResponse, AnalyzeUploadResponse, ExportQuery, SuggestQuery,
};
use crate::core::shared::error::{ApiError, ApiResult};
use crate::core::shared::state::AppState;
use crate::core::shared::utils::with_conn;
use crate::documents::handlers::{read_upload_form, store_upload};
use crate::documents::storage as document_storage;

/// Loads the document, runs the task upstream and appends the result to the
/// document's analysis history under the resolved type tag.
pub async fn run_analysis(
    state: &AppState,
    document_id: Uuid,
    task: AnalysisTask,
) -> ApiResult<AnalysisResponse> {
    let source = with_conn(&state.conn, move |conn| {
        document_storage::load_source(conn, document_id)?
            .ok_or_else(|| ApiError::not_found("Document"))
    })
    .await?;

    let result = state.analysis.analyze(&source, &task).await?;

    let record = AnalysisRecord::new(document_id, task.kind().as_str(), result);
    let response = AnalysisResponse {
        analysis_id: record.id,
        analysis_type: record.analysis_type.clone(),
        result: record.result_json.clone(),
    };
    with_conn(&state.conn, move |conn| {
        storage::insert_analysis(conn, &record)?;
        Ok(())
    })
    .await?;

    info!(
        "Saved {} analysis {} for document {document_id}",
        response.analysis_type, response.analysis_id
    );
    Ok(response)
}

fn task_for(
    state: &AppState,
    req: &AnalysisRequest,
    forced: Option<AnalysisType>,
) -> ApiResult<AnalysisTask> {
    let kind = match forced {
        Some(kind) => kind,
        None => state.analysis.resolve_type(req.analysis_type.as_deref())?,
    };
    Ok(AnalysisTask::new(
        kind,
        req.question.as_deref(),
        req.chart_type.as_deref(),
    ))
}

pub async fn handle_analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    let task = task_for(&state, &req, None)?;
    Ok(Json(run_analysis(&state, req.document_id, task).await?))
}

pub async fn handle_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    let task = task_for(&state, &req, Some(AnalysisType::Report))?;
    Ok(Json(run_analysis(&state, req.document_id, task).await?))
}

pub async fn handle_slides(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    let task = task_for(&state, &req, Some(AnalysisType::Slides))?;
    Ok(Json(run_analysis(&state, req.document_id, task).await?))
}

/// Upload without auto-analysis, then run the requested analysis on it.
pub async fn handle_analyze_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<Json<AnalyzeUploadResponse>> {
    let form = read_upload_form(multipart).await?;
    let kind = state
        .analysis
        .resolve_type(form.analysis_type.as_deref())?;
    let file = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::validation("No file uploaded"))?;

    let document = store_upload(
        &state,
        file,
        form.workspace_id,
        form.auto_analyze.unwrap_or(false),
    )
    .await?;
    let analysis = run_analysis(&state, document.id, AnalysisTask::new(kind, None, None)).await?;

    Ok(Json(AnalyzeUploadResponse { document, analysis }))
}

pub async fn handle_analysis_history(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<Json<Vec<AnalysisRecord>>> {
    let records = with_conn(&state.conn, move |conn| {
        Ok(storage::list_analyses(conn, document_id)?)
    })
    .await?;
    Ok(Json(records))
}

pub async fn handle_export(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let format = match query.format.as_deref() {
        Some(f) => f.parse::<ExportFormat>().map_err(ApiError::Validation)?,
        None => ExportFormat::default(),
    };

    let records = with_conn(&state.conn, move |conn| {
        Ok(storage::list_analyses(conn, document_id)?)
    })
    .await?;
    if records.is_empty() {
        return Err(ApiError::not_found("Analysis for this document"));
    }

    match format {
        ExportFormat::Json => Ok(Json(export::to_entries(&records)).into_response()),
        ExportFormat::Csv => {
            let body = export::to_csv(&records)
                .map_err(|e| ApiError::Internal(format!("CSV export failed: {e}")))?;
            let disposition = format!("attachment; filename=analysis_{document_id}.csv");
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response())
        }
    }
}

/// Serves the cached suggestions, computing and caching them when absent or
/// when `refresh` is set.
pub async fn handle_suggestions(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
    Query(query): Query<SuggestQuery>,
) -> ApiResult<Json<Value>> {
    let info = with_conn(&state.conn, move |conn| {
        document_storage::get_document_info(conn, document_id)?
            .ok_or_else(|| ApiError::not_found("Document"))
    })
    .await?;

    if let Some(cached) = info.suggestions.filter(|_| !query.refresh) {
        return Ok(Json(cached));
    }

    let source = with_conn(&state.conn, move |conn| {
        document_storage::load_source(conn, document_id)?
            .ok_or_else(|| ApiError::not_found("Document"))
    })
    .await?;

    let suggestions = state.analysis.suggestions(&source).await?;
    let stored = suggestions.clone();
    with_conn(&state.conn, move |conn| {
        document_storage::set_suggestions(conn, document_id, &stored)?;
        Ok(())
    })
    .await?;

    Ok(Json(suggestions))
}
