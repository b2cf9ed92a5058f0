use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::storage::AnalysisRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("Unsupported export format '{other}'. Use json or csv.")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    pub analysis_type: String,
    pub created_at: String,
    pub result: Value,
}

pub fn to_entries(records: &[AnalysisRecord]) -> Vec<ExportEntry> {
    records
        .iter()
        .map(|r| ExportEntry {
            analysis_type: r.analysis_type.clone(),
            created_at: r.created_at.to_rfc3339(),
            result: r.result_json.clone(),
        })
        .collect()
}

/// An empty line. `write_record([""])` would emit a quoted empty field.
fn blank_line(wtr: &mut csv::Writer<Vec<u8>>) -> Result<(), csv::Error> {
    wtr.flush()?;
    wtr.get_mut().push(b'\n');
    Ok(())
}

/// One block per analysis: type, timestamp, blank row, then the top-level
/// scalar fields as key/value rows and arrays as key/JSON rows. Nested
/// objects and nulls are left out.
pub fn to_csv(records: &[AnalysisRecord]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for record in records {
        wtr.write_record(["Analysis Type", record.analysis_type.as_str()])?;
        wtr.write_record(["Created At", record.created_at.to_rfc3339().as_str()])?;
        blank_line(&mut wtr)?;

        if let Value::Object(fields) = &record.result_json {
            for (key, value) in fields {
                let cell = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Array(_) => value.to_string(),
                    Value::Object(_) | Value::Null => continue,
                };
                wtr.write_record([key.as_str(), cell.as_str()])?;
            }
        }
        blank_line(&mut wtr)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn record(analysis_type: &str, result: Value) -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            analysis_type: analysis_type.to_string(),
            result_json: result,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_csv_layout() {
        let records = vec![record(
            "summarize",
            json!({
                "title": "Lease, 2025",
                "page_count": 4,
                "key_highlights": ["rent", "term"],
                "document_overview": {"type": "contract"},
                "warning": null
            }),
        )];

        let csv = to_csv(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Analysis Type,summarize");
        assert_eq!(lines[1], "Created At,2025-03-01T12:00:00+00:00");
        assert_eq!(lines[2], "");
        assert_eq!(lines.last(), Some(&""));
        assert!(!csv.contains("\"\"\n"));
        assert!(csv.contains("title,\"Lease, 2025\""));
        assert!(csv.contains("page_count,4"));
        assert!(csv.contains(r#"key_highlights,"[""rent"",""term""]""#));
        assert!(!csv.contains("document_overview"));
        assert!(!csv.contains("warning"));
    }

    #[test]
    fn test_csv_blocks_are_separated_by_empty_lines() {
        let records = vec![
            record("report", json!({"title": "B"})),
            record("summarize", json!({"title": "A"})),
        ];
        let csv = to_csv(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Analysis Type,report",
                "Created At,2025-03-01T12:00:00+00:00",
                "",
                "title,B",
                "",
                "Analysis Type,summarize",
                "Created At,2025-03-01T12:00:00+00:00",
                "",
                "title,A",
                "",
            ]
        );
    }

    #[test]
    fn test_json_entries_keep_order() {
        let records = vec![
            record("report", json!({"title": "B"})),
            record("summarize", json!({"title": "A"})),
        ];
        let entries = to_entries(&records);
        assert_eq!(entries[0].analysis_type, "report");
        assert_eq!(entries[1].result["title"], "A");
    }
}
