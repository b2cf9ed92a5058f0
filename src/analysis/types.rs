use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::documents::UploadedDocument;

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub document_id: Uuid,
    pub analysis_type: Option<String>,
    pub question: Option<String>,
    pub chart_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub analysis_type: String,
    pub result: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeUploadResponse {
    pub document: UploadedDocument,
    pub analysis: AnalysisResponse,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub refresh: bool,
}
