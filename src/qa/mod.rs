use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::shared::error::{ApiError, ApiResult};
use crate::core::shared::schema::qa_history;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{decode_json_list, strip_nul, strip_nul_json, with_conn};
use crate::documents::storage::load_sources;
use crate::workspaces::storage::ensure_workspace;

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = qa_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbQaEntry {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub document_ids: Value,
    pub question: String,
    pub answer_json: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaEntry {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub document_ids: Vec<Uuid>,
    pub question: String,
    pub answer_json: Value,
    pub created_at: DateTime<Utc>,
}

impl From<DbQaEntry> for QaEntry {
    fn from(db: DbQaEntry) -> Self {
        Self {
            id: db.id,
            workspace_id: db.workspace_id,
            document_ids: decode_json_list(db.document_ids, "qa_history.document_ids", &db.id),
            question: db.question,
            answer_json: db.answer_json,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QaRequest {
    pub document_ids: Vec<Uuid>,
    pub question: String,
    pub workspace_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaResponse {
    pub qa_id: Uuid,
    pub result: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QaHistoryQuery {
    pub workspace_id: Option<Uuid>,
    pub limit: Option<i64>,
}

impl QaHistoryQuery {
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

pub fn validate_request(req: &QaRequest) -> ApiResult<()> {
    if req.document_ids.is_empty() {
        return Err(ApiError::validation("At least one document required"));
    }
    if req.question.trim().is_empty() {
        return Err(ApiError::validation("Question is required"));
    }
    Ok(())
}

pub fn insert_entry(conn: &mut PgConnection, entry: &DbQaEntry) -> QueryResult<usize> {
    diesel::insert_into(qa_history::table)
        .values(entry)
        .execute(conn)
}

/// Newest first.
pub fn list_history(
    conn: &mut PgConnection,
    workspace_id: Option<Uuid>,
    limit: i64,
) -> QueryResult<Vec<QaEntry>> {
    let mut query = qa_history::table
        .select(DbQaEntry::as_select())
        .order(qa_history::created_at.desc())
        .limit(limit)
        .into_boxed();
    if let Some(workspace_id) = workspace_id {
        query = query.filter(qa_history::workspace_id.eq(workspace_id));
    }
    let rows: Vec<DbQaEntry> = query.load(conn)?;
    Ok(rows.into_iter().map(QaEntry::from).collect())
}

pub async fn handle_ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QaRequest>,
) -> ApiResult<Json<QaResponse>> {
    validate_request(&req)?;

    let ids = req.document_ids.clone();
    let workspace_id = req.workspace_id;
    let sources = with_conn(&state.conn, move |conn| {
        ensure_workspace(conn, workspace_id)?;
        load_sources(conn, &ids)
    })
    .await?;

    let question = strip_nul(req.question.trim());
    info!("Answering question over {} document(s)", sources.len());
    let result = state.analysis.answer(&sources, &question).await?;

    let entry = DbQaEntry {
        id: Uuid::new_v4(),
        workspace_id,
        document_ids: serde_json::to_value(&req.document_ids)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        question,
        answer_json: strip_nul_json(result),
        created_at: Utc::now(),
    };
    let qa_id = entry.id;
    let result = entry.answer_json.clone();
    with_conn(&state.conn, move |conn| {
        insert_entry(conn, &entry)?;
        Ok(())
    })
    .await?;

    Ok(Json(QaResponse { qa_id, result }))
}

pub async fn handle_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QaHistoryQuery>,
) -> ApiResult<Json<Vec<QaEntry>>> {
    let limit = query.effective_limit();
    let history = with_conn(&state.conn, move |conn| {
        Ok(list_history(conn, query.workspace_id, limit)?)
    })
    .await?;
    Ok(Json(history))
}

pub fn configure_qa_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/qa", post(handle_ask))
        .route("/qa-history", get(handle_history))
}
