use axum::{
    extract::{Path, State},
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

use crate::analysis::types::AnalysisRequest;
use crate::analysis::{AnalysisTask, AnalysisType};
use crate::core::shared::error::{ApiError, ApiResult};
use crate::core::shared::schema::charts;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{
    strip_nul_json, truncate_chars, with_conn, MAX_NAME_CHARS, MAX_TAG_CHARS,
};
use crate::documents::storage::load_source;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = charts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Chart {
    pub id: Uuid,
    pub document_id: Uuid,
    pub chart_type: String,
    pub title: Option<String>,
    pub chart_data: Value,
    pub created_at: DateTime<Utc>,
}

impl Chart {
    /// Type and title come from the model's answer, falling back to `bar`
    /// and `Chart`, and are cut to their column widths.
    pub fn from_result(document_id: Uuid, result: Value) -> Self {
        let result = strip_nul_json(result);
        let chart_type = result
            .get("chart_type")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| truncate_chars(t, MAX_TAG_CHARS).to_string())
            .unwrap_or_else(|| "bar".to_string());
        let title = result
            .get("title")
            .and_then(Value::as_str)
            .map(|t| truncate_chars(t, MAX_NAME_CHARS).to_string())
            .unwrap_or_else(|| "Chart".to_string());
        Self {
            id: Uuid::new_v4(),
            document_id,
            chart_type,
            title: Some(title),
            chart_data: result,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub chart_id: Uuid,
    pub result: Value,
}

pub fn insert_chart(conn: &mut PgConnection, chart: &Chart) -> QueryResult<usize> {
    diesel::insert_into(charts::table)
        .values(chart)
        .execute(conn)
}

pub fn list_charts(conn: &mut PgConnection, document_id: Uuid) -> QueryResult<Vec<Chart>> {
    charts::table
        .filter(charts::document_id.eq(document_id))
        .order(charts::created_at.desc())
        .select(Chart::as_select())
        .load(conn)
}

pub async fn handle_create_chart(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> ApiResult<Json<ChartResponse>> {
    let document_id = req.document_id;
    let source = with_conn(&state.conn, move |conn| {
        load_source(conn, document_id)?.ok_or_else(|| ApiError::not_found("Document"))
    })
    .await?;

    let task = AnalysisTask::new(AnalysisType::Chart, None, req.chart_type.as_deref());
    let result = state.analysis.analyze(&source, &task).await?;

    let chart = Chart::from_result(document_id, result);
    let chart_id = chart.id;
    let result = chart.chart_data.clone();
    info!(
        "Saved {} chart {chart_id} for document {document_id}",
        chart.chart_type
    );
    with_conn(&state.conn, move |conn| {
        insert_chart(conn, &chart)?;
        Ok(())
    })
    .await?;

    Ok(Json(ChartResponse { chart_id, result }))
}

pub async fn handle_list_charts(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Chart>>> {
    let charts = with_conn(&state.conn, move |conn| {
        Ok(list_charts(conn, document_id)?)
    })
    .await?;
    Ok(Json(charts))
}

pub fn configure_charts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/charts", post(handle_create_chart))
        .route("/charts/{document_id}", get(handle_list_charts))
}
