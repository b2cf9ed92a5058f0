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
use crate::core::shared::schema::decision_matrices;
use crate::core::shared::state::AppState;
use crate::core::shared::utils::{
    decode_json_list, strip_nul, strip_nul_json, with_conn, MAX_NAME_CHARS,
};
use crate::documents::storage::load_sources;
use crate::workspaces::storage::ensure_workspace;

/// Allowed distance of the weight sum from 1.0.
pub const WEIGHT_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub name: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixOption {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = decision_matrices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbDecisionMatrix {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub name: String,
    pub criteria: Value,
    pub options: Value,
    pub result_json: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionMatrix {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub name: String,
    pub criteria: Vec<Criterion>,
    pub options: Vec<MatrixOption>,
    pub result_json: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<DbDecisionMatrix> for DecisionMatrix {
    fn from(db: DbDecisionMatrix) -> Self {
        Self {
            id: db.id,
            workspace_id: db.workspace_id,
            name: db.name,
            criteria: decode_json_list(db.criteria, "decision_matrices.criteria", &db.id),
            options: decode_json_list(db.options, "decision_matrices.options", &db.id),
            result_json: db.result_json,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionMatrixRequest {
    pub name: String,
    pub document_ids: Vec<Uuid>,
    pub criteria: Vec<Criterion>,
    pub workspace_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMatrixResponse {
    pub matrix_id: Uuid,
    pub result: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMatricesQuery {
    pub workspace_id: Option<Uuid>,
}

pub fn weight_sum(criteria: &[Criterion]) -> f64 {
    criteria.iter().map(|c| c.weight).sum()
}

/// Checks the request before any document is loaded or upstream call made.
pub fn validate_request(req: &DecisionMatrixRequest) -> ApiResult<()> {
    if req.document_ids.len() < 2 {
        return Err(ApiError::validation("At least 2 documents required"));
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::validation("Decision matrix name is required"));
    }
    if req.name.trim().chars().count() > MAX_NAME_CHARS {
        return Err(ApiError::validation(format!(
            "Decision matrix name must be at most {MAX_NAME_CHARS} characters"
        )));
    }
    if let Some(unnamed) = req.criteria.iter().position(|c| c.name.trim().is_empty()) {
        return Err(ApiError::validation(format!(
            "Criterion {} has no name",
            unnamed + 1
        )));
    }

    let total = weight_sum(&req.criteria);
    // 1e-9 absorbs binary rounding so 0.99 and 1.01 stay inside the band.
    if (total - 1.0).abs() > WEIGHT_TOLERANCE + 1e-9 {
        let shown = (total * 10_000.0).round() / 10_000.0;
        return Err(ApiError::validation(format!(
            "Criteria weights must sum to 1.0 (current: {shown})"
        )));
    }
    Ok(())
}

pub fn insert_matrix(conn: &mut PgConnection, matrix: &DbDecisionMatrix) -> QueryResult<usize> {
    diesel::insert_into(decision_matrices::table)
        .values(matrix)
        .execute(conn)
}

pub fn list_matrices(
    conn: &mut PgConnection,
    workspace_id: Option<Uuid>,
) -> QueryResult<Vec<DecisionMatrix>> {
    let mut query = decision_matrices::table
        .select(DbDecisionMatrix::as_select())
        .order(decision_matrices::created_at.desc())
        .into_boxed();
    if let Some(workspace_id) = workspace_id {
        query = query.filter(decision_matrices::workspace_id.eq(workspace_id));
    }
    let rows: Vec<DbDecisionMatrix> = query.load(conn)?;
    Ok(rows.into_iter().map(DecisionMatrix::from).collect())
}

pub async fn handle_create_matrix(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DecisionMatrixRequest>,
) -> ApiResult<Json<DecisionMatrixResponse>> {
    validate_request(&req)?;

    let ids = req.document_ids.clone();
    let workspace_id = req.workspace_id;
    let sources = with_conn(&state.conn, move |conn| {
        ensure_workspace(conn, workspace_id)?;
        load_sources(conn, &ids)
    })
    .await?;

    info!(
        "Building decision matrix '{}' over {} documents and {} criteria",
        req.name,
        sources.len(),
        req.criteria.len()
    );
    let result = state
        .analysis
        .decision_matrix(&sources, &req.criteria)
        .await?;
    let result = strip_nul_json(result);

    let options: Vec<MatrixOption> = sources
        .iter()
        .map(|s| MatrixOption {
            id: s.id,
            name: s.filename.clone(),
        })
        .collect();
    let record = DbDecisionMatrix {
        id: Uuid::new_v4(),
        workspace_id,
        name: strip_nul(req.name.trim()),
        criteria: strip_nul_json(
            serde_json::to_value(&req.criteria).map_err(|e| ApiError::Internal(e.to_string()))?,
        ),
        options: strip_nul_json(
            serde_json::to_value(&options).map_err(|e| ApiError::Internal(e.to_string()))?,
        ),
        result_json: Some(result.clone()),
        created_at: Utc::now(),
    };
    let matrix_id = record.id;
    with_conn(&state.conn, move |conn| {
        insert_matrix(conn, &record)?;
        Ok(())
    })
    .await?;

    Ok(Json(DecisionMatrixResponse { matrix_id, result }))
}

pub async fn handle_list_matrices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMatricesQuery>,
) -> ApiResult<Json<Vec<DecisionMatrix>>> {
    let matrices = with_conn(&state.conn, move |conn| {
        Ok(list_matrices(conn, query.workspace_id)?)
    })
    .await?;
    Ok(Json(matrices))
}

pub fn configure_decision_matrix_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/decision-matrix", post(handle_create_matrix))
        .route("/decision-matrices", get(handle_list_matrices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_validation_err;

    fn request(weights: &[f64], documents: usize) -> DecisionMatrixRequest {
        DecisionMatrixRequest {
            name: "Vendor choice".to_string(),
            document_ids: (0..documents).map(|_| Uuid::new_v4()).collect(),
            criteria: weights
                .iter()
                .enumerate()
                .map(|(i, w)| Criterion {
                    name: format!("C{i}"),
                    weight: *w,
                    description: String::new(),
                })
                .collect(),
            workspace_id: None,
        }
    }

    #[test]
    fn test_rejects_weights_over_one() {
        let err = validate_request(&request(&[0.6, 0.5], 2)).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Criteria weights must sum to 1.0 (current: 1.1)"
        );
    }

    #[test]
    fn test_accepts_band_edges() {
        assert!(validate_request(&request(&[0.5, 0.49], 2)).is_ok());
        assert!(validate_request(&request(&[0.5, 0.51], 2)).is_ok());
        assert!(validate_request(&request(&[0.3, 0.3, 0.4], 3)).is_ok());
        assert!(validate_request(&request(&[0.1, 0.2, 0.3, 0.4], 2)).is_ok());
    }

    #[test]
    fn test_rejects_outside_band() {
        assert!(validate_request(&request(&[0.5, 0.48], 2)).is_err());
        assert!(validate_request(&request(&[0.5, 0.52], 2)).is_err());
        let err = validate_request(&request(&[], 2)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Criteria weights must sum to 1.0 (current: 0)"
        );
    }

    #[test]
    fn test_requires_two_documents() {
        let err = validate_request(&request(&[1.0], 1)).unwrap_err();
        assert_eq!(err.to_string(), "At least 2 documents required");
    }

    #[test]
    fn test_rejects_overlong_name() {
        let mut req = request(&[1.0], 2);
        req.name = "M".repeat(MAX_NAME_CHARS);
        assert!(validate_request(&req).is_ok());
        req.name.push('M');
        assert_validation_err!(
            validate_request(&req),
            "Decision matrix name must be at most 255 characters"
        );
    }

    #[test]
    fn test_malformed_stored_lists_read_as_empty() {
        let db = DbDecisionMatrix {
            id: Uuid::new_v4(),
            workspace_id: None,
            name: "Vendors".to_string(),
            criteria: serde_json::json!({"Cost": 0.5}),
            options: serde_json::json!([{"id": Uuid::new_v4(), "name": "a.pdf"}]),
            result_json: None,
            created_at: Utc::now(),
        };
        let matrix = DecisionMatrix::from(db);
        assert!(matrix.criteria.is_empty());
        assert_eq!(matrix.options[0].name, "a.pdf");
    }

    #[test]
    fn test_criterion_defaults() {
        let c: Criterion = serde_json::from_str(r#"{"name": "Cost"}"#).unwrap();
        assert_eq!(c.weight, 0.0);
        assert_eq!(c.description, "");
    }
}
