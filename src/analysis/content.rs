use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::docx::extract_docx_text;
use crate::core::config::LlmConfig;
use crate::core::shared::utils::truncate_chars;
use crate::llm::ContentPart;

/// File types accepted for upload, keyed by lowercase extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Docx,
    Doc,
    Png,
    Jpg,
    Jpeg,
    Gif,
    Webp,
    Txt,
    Md,
    Csv,
}

impl FileKind {
    pub const ALL: [FileKind; 11] = [
        FileKind::Pdf,
        FileKind::Docx,
        FileKind::Doc,
        FileKind::Png,
        FileKind::Jpg,
        FileKind::Jpeg,
        FileKind::Gif,
        FileKind::Webp,
        FileKind::Txt,
        FileKind::Md,
        FileKind::Csv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Docx => "docx",
            FileKind::Doc => "doc",
            FileKind::Png => "png",
            FileKind::Jpg => "jpg",
            FileKind::Jpeg => "jpeg",
            FileKind::Gif => "gif",
            FileKind::Webp => "webp",
            FileKind::Txt => "txt",
            FileKind::Md => "md",
            FileKind::Csv => "csv",
        }
    }

    /// Lowercased text after the last `.`, or the whole name when there is none.
    pub fn extension_of(filename: &str) -> String {
        filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or(filename)
            .to_lowercase()
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileKind::Pdf => "application/pdf",
            FileKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            FileKind::Doc => "application/msword",
            FileKind::Png => "image/png",
            FileKind::Jpg | FileKind::Jpeg => "image/jpeg",
            FileKind::Gif => "image/gif",
            FileKind::Webp => "image/webp",
            FileKind::Txt => "text/plain",
            FileKind::Md => "text/markdown",
            FileKind::Csv => "text/csv",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self,
            FileKind::Png | FileKind::Jpg | FileKind::Jpeg | FileKind::Gif | FileKind::Webp
        )
    }

    pub fn is_word(&self) -> bool {
        matches!(self, FileKind::Docx | FileKind::Doc)
    }

    pub fn data_uri(&self, data: &[u8]) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(data))
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        FileKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| format!("unsupported file type: {s}"))
    }
}

/// Which configured model a payload must be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    /// Accepts PDF file attachments.
    Document,
    /// Text and vision.
    General,
}

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    pub document_model: String,
    pub general_model: String,
}

impl ModelCatalog {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            document_model: config.pdf_model.clone(),
            general_model: config.text_model.clone(),
        }
    }

    pub fn resolve(&self, choice: ModelChoice) -> &str {
        match choice {
            ModelChoice::Document => &self.document_model,
            ModelChoice::General => &self.general_model,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub parts: Vec<ContentPart>,
    pub model: ModelChoice,
}

/// Turns raw upload bytes into the user-message parts for a single-document
/// request. Never fails: unreadable content becomes a placeholder notice.
pub fn build_file_content(
    data: &[u8],
    filename: &str,
    kind: FileKind,
    char_budget: usize,
) -> ModelInput {
    if kind.is_word() {
        let text = extract_docx_text(data);
        let part = if text.trim().is_empty() {
            ContentPart::text(format!("Unable to extract text from: {filename}"))
        } else {
            ContentPart::text(format!(
                "Analyze this document:\n\nFilename: {filename}\n\nContent:\n{}",
                truncate_chars(&text, char_budget)
            ))
        };
        return ModelInput {
            parts: vec![part],
            model: ModelChoice::General,
        };
    }

    if kind.is_image() {
        return ModelInput {
            parts: vec![
                ContentPart::text(format!("Analyze this image: {filename}")),
                ContentPart::image(kind.data_uri(data)),
            ],
            model: ModelChoice::General,
        };
    }

    if kind == FileKind::Pdf {
        return ModelInput {
            parts: vec![
                ContentPart::text(format!("Analyze this document: {filename}")),
                ContentPart::file(filename, kind.data_uri(data)),
            ],
            model: ModelChoice::Document,
        };
    }

    let part = match std::str::from_utf8(data) {
        Ok(text) if !text.trim().is_empty() => ContentPart::text(format!(
            "Analyze this document:\n\nFilename: {filename}\n\nContent:\n{}",
            truncate_chars(text, char_budget)
        )),
        Ok(_) => ContentPart::text(format!("Empty file: {filename}")),
        Err(_) => ContentPart::text(format!("Unable to read file: {filename}")),
    };
    ModelInput {
        parts: vec![part],
        model: ModelChoice::General,
    }
}

/// Parts contributed by one document of a multi-document request. `position`
/// is 1-based and appears in the `Document N` label.
pub fn build_comparison_parts(
    data: &[u8],
    filename: &str,
    kind: FileKind,
    position: usize,
    char_budget: usize,
) -> Vec<ContentPart> {
    let label = format!("Document {position}: {filename}");

    if kind == FileKind::Pdf {
        return vec![ContentPart::file(label, kind.data_uri(data))];
    }

    if kind.is_image() {
        return vec![
            ContentPart::text(format!("\n\n--- {label} ---")),
            ContentPart::image(kind.data_uri(data)),
        ];
    }

    let body = if kind.is_word() {
        let text = extract_docx_text(data);
        if text.trim().is_empty() {
            "[Unable to extract text]".to_string()
        } else {
            truncate_chars(&text, char_budget).to_string()
        }
    } else {
        match std::str::from_utf8(data) {
            Ok(text) => truncate_chars(text, char_budget).to_string(),
            Err(_) => "[Unable to read]".to_string(),
        }
    };

    vec![ContentPart::text(format!("\n\n--- {label} ---\n{body}"))]
}
