use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static BRACED: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| Regex::new(r"\{[\s\S]*\}"));

/// Parses a model reply that must be a JSON object.
pub fn parse_object(raw: &str) -> Result<Map<String, Value>, serde_json::Error> {
    serde_json::from_str::<Map<String, Value>>(raw.trim())
}

/// Salvage pass for replies wrapped in prose or code fences: take the span from
/// the first `{` to the last `}` and parse that.
pub fn salvage_object(raw: &str) -> Option<Map<String, Value>> {
    let re = BRACED.as_ref().ok()?;
    let span = re.find(raw)?;
    parse_object(span.as_str()).ok()
}
