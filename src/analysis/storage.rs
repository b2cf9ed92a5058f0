use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::core::shared::schema::analysis_results;
use crate::core::shared::utils::strip_nul_json;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = analysis_results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub document_id: Uuid,
    pub analysis_type: String,
    pub result_json: Value,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// The result is stored without U+0000, which `jsonb` rejects.
    pub fn new(document_id: Uuid, analysis_type: &str, result: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            analysis_type: analysis_type.to_string(),
            result_json: strip_nul_json(result),
            created_at: Utc::now(),
        }
    }
}

pub fn insert_analysis(conn: &mut PgConnection, record: &AnalysisRecord) -> QueryResult<usize> {
    diesel::insert_into(analysis_results::table)
        .values(record)
        .execute(conn)
}

/// Newest first.
pub fn list_analyses(conn: &mut PgConnection, document_id: Uuid) -> QueryResult<Vec<AnalysisRecord>> {
    analysis_results::table
        .filter(analysis_results::document_id.eq(document_id))
        .order(analysis_results::created_at.desc())
        .select(AnalysisRecord::as_select())
        .load(conn)
}
