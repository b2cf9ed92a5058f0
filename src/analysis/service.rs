use log::info;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::content::{
    build_comparison_parts, build_file_content, FileKind, ModelCatalog, ModelChoice,
};
use super::prompts;
use super::task::{AnalysisTask, AnalysisType};
use crate::core::config::AppConfig;
use crate::core::shared::error::{ApiError, ApiResult};
use crate::decision_matrix::Criterion;
use crate::llm::{ContentPart, LLMProvider, LlmError};

/// A stored document loaded with its bytes, ready to be sent upstream.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub id: Uuid,
    pub filename: String,
    pub kind: FileKind,
    pub data: Vec<u8>,
}

pub struct AnalysisService {
    provider: Arc<dyn LLMProvider>,
    models: ModelCatalog,
    docx_char_budget: usize,
    comparison_char_budget: usize,
    strict_analysis_types: bool,
}

impl AnalysisService {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &AppConfig) -> Self {
        Self {
            provider,
            models: ModelCatalog::from_config(&config.llm),
            docx_char_budget: config.analysis.docx_char_budget,
            comparison_char_budget: config.analysis.comparison_char_budget,
            strict_analysis_types: config.analysis.strict_analysis_types,
        }
    }

    /// A missing tag means `summarize`.
    pub fn resolve_type(&self, tag: Option<&str>) -> ApiResult<AnalysisType> {
        match tag.map(str::trim).filter(|t| !t.is_empty()) {
            None => Ok(AnalysisType::Summarize),
            Some(tag) => AnalysisType::resolve(tag, self.strict_analysis_types)
                .map_err(ApiError::Validation),
        }
    }

    pub async fn analyze(
        &self,
        doc: &SourceDocument,
        task: &AnalysisTask,
    ) -> Result<Value, LlmError> {
        let mut input =
            build_file_content(&doc.data, &doc.filename, doc.kind, self.docx_char_budget);

        if let AnalysisTask::Qa { question } = task {
            input.parts.insert(
                0,
                ContentPart::text(format!(
                    "Document: {}\n\nQuestion: {question}",
                    doc.filename
                )),
            );
        }

        info!(
            "Running {} on document {} ({})",
            task.kind(),
            doc.id,
            doc.kind
        );
        self.provider
            .generate_json(
                &task.system_prompt(),
                &input.parts,
                self.models.resolve(input.model),
            )
            .await
    }

    pub async fn suggestions(&self, doc: &SourceDocument) -> Result<Value, LlmError> {
        let input =
            build_file_content(&doc.data, &doc.filename, doc.kind, self.docx_char_budget);
        info!("Computing suggestions for document {}", doc.id);
        self.provider
            .generate_json(
                prompts::SUGGESTIONS,
                &input.parts,
                self.models.resolve(input.model),
            )
            .await
    }

    /// Two documents get the side-by-side prompt, more get the ranking prompt.
    pub async fn compare(&self, docs: &[SourceDocument]) -> Result<Value, LlmError> {
        let (intro, prompt) = match docs {
            [first, second] => (
                format!(
                    "Compare these two documents in detail:\nDocument 1: {}\nDocument 2: {}",
                    first.filename, second.filename
                ),
                prompts::COMPARE_TWO,
            ),
            _ => (
                format!("Compare these {} documents in detail:", docs.len()),
                prompts::COMPARE_MANY,
            ),
        };

        let (parts, model) = self.multi_document_parts(intro, docs);
        self.provider
            .generate_json(prompt, &parts, self.models.resolve(model))
            .await
    }

    pub async fn decision_matrix(
        &self,
        docs: &[SourceDocument],
        criteria: &[Criterion],
    ) -> Result<Value, LlmError> {
        let mut intro = format!(
            "Evaluate these {} documents/options against the following criteria:\n\nCriteria:\n",
            docs.len()
        );
        for c in criteria {
            intro.push_str(&format!(
                "- {} (weight: {}): {}\n",
                c.name, c.weight, c.description
            ));
        }
        intro.push_str("\nDocuments to evaluate:");

        let criteria_json = serde_json::to_string(criteria)
            .map_err(|e| LlmError::InvalidJson(e.to_string()))?;
        let (parts, model) = self.multi_document_parts(intro, docs);
        self.provider
            .generate_json(
                &prompts::decision_matrix(&criteria_json),
                &parts,
                self.models.resolve(model),
            )
            .await
    }

    /// Question answering over one or more documents. The question always
    /// travels as its own leading part.
    pub async fn answer(
        &self,
        docs: &[SourceDocument],
        question: &str,
    ) -> Result<Value, LlmError> {
        if let [doc] = docs {
            let task = AnalysisTask::new(AnalysisType::Qa, Some(question), None);
            return self.analyze(doc, &task).await;
        }

        let intro = format!(
            "Question: {question}\n\nAnswer using these {} documents:",
            docs.len()
        );
        let (parts, model) = self.multi_document_parts(intro, docs);
        self.provider
            .generate_json(prompts::QA, &parts, self.models.resolve(model))
            .await
    }

    fn multi_document_parts(
        &self,
        intro: String,
        docs: &[SourceDocument],
    ) -> (Vec<ContentPart>, ModelChoice) {
        let mut parts = vec![ContentPart::text(intro)];
        for (i, doc) in docs.iter().enumerate() {
            parts.extend(build_comparison_parts(
                &doc.data,
                &doc.filename,
                doc.kind,
                i + 1,
                self.comparison_char_budget,
            ));
        }

        let model = if docs.iter().any(|d| d.kind == FileKind::Pdf) {
            ModelChoice::Document
        } else {
            ModelChoice::General
        };
        (parts, model)
    }
}
