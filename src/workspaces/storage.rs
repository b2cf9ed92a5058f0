use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Timestamptz, Uuid as SqlUuid, Varchar};
use uuid::Uuid;

use super::types::{Workspace, WorkspaceSummary};
use crate::core::shared::error::{ApiError, ApiResult};
use crate::core::shared::schema::workspaces;

#[derive(Debug, QueryableByName)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct WorkspaceCountRow {
    #[diesel(sql_type = SqlUuid)]
    id: Uuid,
    #[diesel(sql_type = Varchar)]
    name: String,
    #[diesel(sql_type = Nullable<Text>)]
    description: Option<String>,
    #[diesel(sql_type = Timestamptz)]
    created_at: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    updated_at: DateTime<Utc>,
    #[diesel(sql_type = BigInt)]
    document_count: i64,
}

impl From<WorkspaceCountRow> for WorkspaceSummary {
    fn from(row: WorkspaceCountRow) -> Self {
        Self {
            workspace: Workspace {
                id: row.id,
                name: row.name,
                description: row.description,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            document_count: row.document_count,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = workspaces)]
pub struct WorkspaceChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub fn insert_workspace(conn: &mut PgConnection, workspace: &Workspace) -> QueryResult<usize> {
    diesel::insert_into(workspaces::table)
        .values(workspace)
        .execute(conn)
}

pub fn get_workspace(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Workspace>> {
    workspaces::table
        .find(id)
        .select(Workspace::as_select())
        .first(conn)
        .optional()
}

pub fn workspace_exists(conn: &mut PgConnection, id: Uuid) -> QueryResult<bool> {
    diesel::select(diesel::dsl::exists(workspaces::table.find(id))).get_result(conn)
}

/// `NotFound` when a workspace reference points nowhere.
pub fn ensure_workspace(conn: &mut PgConnection, id: Option<Uuid>) -> ApiResult<()> {
    match id {
        Some(id) if !workspace_exists(conn, id)? => Err(ApiError::not_found("Workspace")),
        _ => Ok(()),
    }
}

/// Most recently updated first, each with its document count.
pub fn list_workspaces(conn: &mut PgConnection) -> QueryResult<Vec<WorkspaceSummary>> {
    let rows: Vec<WorkspaceCountRow> = diesel::sql_query(
        "SELECT w.id, w.name, w.description, w.created_at, w.updated_at, \
         COUNT(d.id) AS document_count \
         FROM workspaces w \
         LEFT JOIN documents d ON d.workspace_id = w.id \
         GROUP BY w.id \
         ORDER BY w.updated_at DESC",
    )
    .load(conn)?;
    Ok(rows.into_iter().map(WorkspaceSummary::from).collect())
}

pub fn update_workspace(
    conn: &mut PgConnection,
    id: Uuid,
    changes: &WorkspaceChanges,
) -> QueryResult<usize> {
    diesel::update(workspaces::table.find(id))
        .set(changes)
        .execute(conn)
}

/// Documents and other rows pointing at the workspace keep existing with a
/// null reference.
pub fn delete_workspace(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    diesel::delete(workspaces::table.find(id)).execute(conn)
}
