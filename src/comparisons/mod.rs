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
use crate::core::shared::schema::comparisons;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{decode_json_list, strip_nul_json, with_conn};
use crate::documents::storage::load_sources;
use crate::workspaces::storage::ensure_workspace;

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = comparisons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbComparison {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub document_ids: Value,
    pub result_json: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub document_ids: Vec<Uuid>,
    pub result_json: Value,
    pub created_at: DateTime<Utc>,
}

impl From<DbComparison> for Comparison {
    fn from(db: DbComparison) -> Self {
        Self {
            id: db.id,
            workspace_id: db.workspace_id,
            document_ids: decode_json_list(db.document_ids, "comparisons.document_ids", &db.id),
            result_json: db.result_json,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompareRequest {
    pub document_ids: Vec<Uuid>,
    pub workspace_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResponse {
    pub comparison_id: Uuid,
    pub result: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListComparisonsQuery {
    pub workspace_id: Option<Uuid>,
}

pub fn validate_document_count(document_ids: &[Uuid]) -> ApiResult<()> {
    if document_ids.len() < 2 {
        return Err(ApiError::validation(
            "At least 2 documents required for comparison",
        ));
    }
    Ok(())
}

pub fn insert_comparison(conn: &mut PgConnection, comparison: &DbComparison) -> QueryResult<usize> {
    diesel::insert_into(comparisons::table)
        .values(comparison)
        .execute(conn)
}

pub fn list_comparisons(
    conn: &mut PgConnection,
    workspace_id: Option<Uuid>,
) -> QueryResult<Vec<Comparison>> {
    let mut query = comparisons::table
        .select(DbComparison::as_select())
        .order(comparisons::created_at.desc())
        .into_boxed();
    if let Some(workspace_id) = workspace_id {
        query = query.filter(comparisons::workspace_id.eq(workspace_id));
    }
    let rows: Vec<DbComparison> = query.load(conn)?;
    Ok(rows.into_iter().map(Comparison::from).collect())
}

pub async fn handle_compare(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CompareRequest>,
) -> ApiResult<Json<CompareResponse>> {
    validate_document_count(&req.document_ids)?;

    let ids = req.document_ids.clone();
    let workspace_id = req.workspace_id;
    let sources = with_conn(&state.conn, move |conn| {
        ensure_workspace(conn, workspace_id)?;
        load_sources(conn, &ids)
    })
    .await?;

    info!("Comparing {} documents", sources.len());
    let result = state.analysis.compare(&sources).await?;

    let record = DbComparison {
        id: Uuid::new_v4(),
        workspace_id,
        document_ids: serde_json::to_value(&req.document_ids)
            .map_err(|e| ApiError::Internal(e.to_string()))?,
        result_json: strip_nul_json(result),
        created_at: Utc::now(),
    };
    let comparison_id = record.id;
    let result = record.result_json.clone();
    with_conn(&state.conn, move |conn| {
        insert_comparison(conn, &record)?;
        Ok(())
    })
    .await?;

    Ok(Json(CompareResponse {
        comparison_id,
        result,
    }))
}

pub async fn handle_list_comparisons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListComparisonsQuery>,
) -> ApiResult<Json<Vec<Comparison>>> {
    let comparisons = with_conn(&state.conn, move |conn| {
        Ok(list_comparisons(conn, query.workspace_id)?)
    })
    .await?;
    Ok(Json(comparisons))
}

pub fn configure_comparisons_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/compare", post(handle_compare))
        .route("/comparisons", get(handle_list_comparisons))
}
