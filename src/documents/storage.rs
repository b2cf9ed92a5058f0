use chrono::{DateTime, Utc};
use diesel::prelude::*;
use log::warn;
use serde_json::Value;
use uuid::Uuid;

use super::types::DocumentInfo;
use crate::analysis::{FileKind, SourceDocument};
use crate::core::shared::error::{ApiError, ApiResult};
use crate::core::shared::schema::documents;
use crate::core::shared::utils::strip_nul_json;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DbDocumentMeta {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub suggestions: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<DbDocumentMeta> for DocumentInfo {
    fn from(db: DbDocumentMeta) -> Self {
        Self {
            id: db.id,
            filename: db.filename,
            file_type: db.file_type,
            file_size: db.file_size,
            workspace_id: db.workspace_id,
            suggestions: db.suggestions,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
pub struct NewDocument {
    pub id: Uuid,
    pub workspace_id: Option<Uuid>,
    pub filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub file_data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct DbDocumentContent {
    id: Uuid,
    filename: String,
    file_type: String,
    file_data: Vec<u8>,
}

impl From<DbDocumentContent> for SourceDocument {
    fn from(db: DbDocumentContent) -> Self {
        let kind = db.file_type.parse().unwrap_or_else(|_| {
            warn!(
                "Document {} has unrecognised type {:?}, reading it as text",
                db.id, db.file_type
            );
            FileKind::Txt
        });
        Self {
            id: db.id,
            filename: db.filename,
            kind,
            data: db.file_data,
        }
    }
}

pub fn insert_document(conn: &mut PgConnection, doc: &NewDocument) -> QueryResult<usize> {
    diesel::insert_into(documents::table)
        .values(doc)
        .execute(conn)
}

pub fn get_document_info(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<DocumentInfo>> {
    documents::table
        .find(id)
        .select(DbDocumentMeta::as_select())
        .first(conn)
        .optional()
        .map(|doc| doc.map(DocumentInfo::from))
}

/// Newest first, optionally limited to one workspace.
pub fn list_documents(
    conn: &mut PgConnection,
    workspace_id: Option<Uuid>,
) -> QueryResult<Vec<DocumentInfo>> {
    let mut query = documents::table
        .select(DbDocumentMeta::as_select())
        .order(documents::created_at.desc())
        .into_boxed();

    if let Some(workspace_id) = workspace_id {
        query = query.filter(documents::workspace_id.eq(workspace_id));
    }

    let rows: Vec<DbDocumentMeta> = query.load(conn)?;
    Ok(rows.into_iter().map(DocumentInfo::from).collect())
}

pub fn load_source(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<SourceDocument>> {
    documents::table
        .find(id)
        .select(DbDocumentContent::as_select())
        .first(conn)
        .optional()
        .map(|doc| doc.map(SourceDocument::from))
}

/// Loads every listed document in request order; the first missing id is a
/// `NotFound` naming it.
pub fn load_sources(conn: &mut PgConnection, ids: &[Uuid]) -> ApiResult<Vec<SourceDocument>> {
    let mut sources = Vec::with_capacity(ids.len());
    for id in ids {
        let source =
            load_source(conn, *id)?.ok_or_else(|| ApiError::not_found(format!("Document {id}")))?;
        sources.push(source);
    }
    Ok(sources)
}

pub fn set_suggestions(conn: &mut PgConnection, id: Uuid, suggestions: &Value) -> QueryResult<usize> {
    diesel::update(documents::table.find(id))
        .set(documents::suggestions.eq(Some(strip_nul_json(suggestions.clone()))))
        .execute(conn)
}

pub fn set_workspace(
    conn: &mut PgConnection,
    id: Uuid,
    workspace_id: Option<Uuid>,
) -> QueryResult<usize> {
    diesel::update(documents::table.find(id))
        .set(documents::workspace_id.eq(workspace_id))
        .execute(conn)
}

/// Moves every stored document into `workspace_id`.
pub fn assign_all(conn: &mut PgConnection, workspace_id: Uuid) -> QueryResult<usize> {
    diesel::update(documents::table)
        .set(documents::workspace_id.eq(Some(workspace_id)))
        .execute(conn)
}

pub fn delete_document(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    diesel::delete(documents::table.find(id)).execute(conn)
}
