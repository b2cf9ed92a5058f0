use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::prompts;

pub const DEFAULT_QUESTION: &str = "What is this document about?";
pub const DEFAULT_CHART_TYPE: &str = "bar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    Summarize,
    ProsCons,
    GapsRisks,
    Upgrade,
    Qa,
    Chart,
    Report,
    Slides,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 8] = [
        AnalysisType::Summarize,
        AnalysisType::ProsCons,
        AnalysisType::GapsRisks,
        AnalysisType::Upgrade,
        AnalysisType::Qa,
        AnalysisType::Chart,
        AnalysisType::Report,
        AnalysisType::Slides,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Summarize => "summarize",
            AnalysisType::ProsCons => "pros_cons",
            AnalysisType::GapsRisks => "gaps_risks",
            AnalysisType::Upgrade => "upgrade",
            AnalysisType::Qa => "qa",
            AnalysisType::Chart => "chart",
            AnalysisType::Report => "report",
            AnalysisType::Slides => "slides",
        }
    }

    /// Maps a client-supplied tag to a type. Unknown tags become `Summarize`
    /// unless `strict` is set.
    pub fn resolve(tag: &str, strict: bool) -> Result<Self, String> {
        match tag.parse() {
            Ok(kind) => Ok(kind),
            Err(e) if strict => Err(e),
            Err(_) => {
                warn!("Unknown analysis type {tag:?}, falling back to summarize");
                Ok(AnalysisType::Summarize)
            }
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        AnalysisType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .ok_or_else(|| {
                let known: Vec<&str> = AnalysisType::ALL.iter().map(|k| k.as_str()).collect();
                format!(
                    "Unknown analysis type '{tag}'. Expected one of: {}",
                    known.join(", ")
                )
            })
    }
}

/// A fully parameterised analysis request for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisTask {
    Summarize,
    ProsCons,
    GapsRisks,
    Upgrade,
    Qa { question: String },
    Chart { chart_type: String },
    Report,
    Slides,
}

impl AnalysisTask {
    pub fn new(kind: AnalysisType, question: Option<&str>, chart_type: Option<&str>) -> Self {
        match kind {
            AnalysisType::Summarize => AnalysisTask::Summarize,
            AnalysisType::ProsCons => AnalysisTask::ProsCons,
            AnalysisType::GapsRisks => AnalysisTask::GapsRisks,
            AnalysisType::Upgrade => AnalysisTask::Upgrade,
            AnalysisType::Qa => AnalysisTask::Qa {
                question: question
                    .map(str::trim)
                    .filter(|q| !q.is_empty())
                    .unwrap_or(DEFAULT_QUESTION)
                    .to_string(),
            },
            AnalysisType::Chart => AnalysisTask::Chart {
                chart_type: sanitize_chart_type(chart_type),
            },
            AnalysisType::Report => AnalysisTask::Report,
            AnalysisType::Slides => AnalysisTask::Slides,
        }
    }

    pub fn kind(&self) -> AnalysisType {
        match self {
            AnalysisTask::Summarize => AnalysisType::Summarize,
            AnalysisTask::ProsCons => AnalysisType::ProsCons,
            AnalysisTask::GapsRisks => AnalysisType::GapsRisks,
            AnalysisTask::Upgrade => AnalysisType::Upgrade,
            AnalysisTask::Qa { .. } => AnalysisType::Qa,
            AnalysisTask::Chart { .. } => AnalysisType::Chart,
            AnalysisTask::Report => AnalysisType::Report,
            AnalysisTask::Slides => AnalysisType::Slides,
        }
    }

    pub fn system_prompt(&self) -> String {
        match self {
            AnalysisTask::Summarize => prompts::SUMMARIZE.to_string(),
            AnalysisTask::ProsCons => prompts::PROS_CONS.to_string(),
            AnalysisTask::GapsRisks => prompts::GAPS_RISKS.to_string(),
            AnalysisTask::Upgrade => prompts::UPGRADE.to_string(),
            AnalysisTask::Qa { .. } => prompts::QA.to_string(),
            AnalysisTask::Chart { chart_type } => prompts::chart(chart_type),
            AnalysisTask::Report => prompts::REPORT.to_string(),
            AnalysisTask::Slides => prompts::SLIDES.to_string(),
        }
    }
}

/// Chart types are interpolated into the prompt, so only short identifiers
/// are accepted.
fn sanitize_chart_type(chart_type: Option<&str>) -> String {
    chart_type
        .map(|t| t.trim().to_lowercase())
        .filter(|t| {
            !t.is_empty()
                && t.len() <= 32
                && t.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        })
        .unwrap_or_else(|| DEFAULT_CHART_TYPE.to_string())
}
