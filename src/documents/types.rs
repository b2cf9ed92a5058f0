use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Document metadata. File bytes are never part of an API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub workspace_id: Option<Uuid>,
    pub suggestions: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub workspace_id: Option<Uuid>,
    pub suggestions: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFailure {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadOutcome {
    Uploaded(UploadedDocument),
    Failed(UploadFailure),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiUploadResponse {
    pub uploaded: Vec<UploadOutcome>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListDocumentsQuery {
    pub workspace_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveDocumentQuery {
    pub workspace_id: Uuid,
}

/// One uploaded file as read from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// The recognised fields of an upload form; unknown fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub workspace_id: Option<Uuid>,
    pub auto_analyze: Option<bool>,
    pub analysis_type: Option<String>,
}
