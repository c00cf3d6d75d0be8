mod markdown;

pub use markdown::clean_markdown;

use crate::Result;
use crate::models::AnalysisResultItem;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;

/// Returned when there is no payload at all
pub const NO_RESULTS: &str = "No results available";

/// Returned when the payload is an empty list
pub const NO_ANALYSIS_RESULTS: &str = "No analysis results found";

/// Placeholder the service uses when it skipped the aggregate query
pub const NO_AGGREGATE_SENTINEL: &str = "No aggregate query generated.";

const SEPARATOR_WIDTH: usize = 51;

/// Sections of a rendered report, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportSection {
    Repository,
    PrimaryAnalysis,
    FactCheck,
    Aggregate,
    ExecutiveSummary,
}

impl ReportSection {
    pub fn heading(&self) -> &'static str {
        match self {
            ReportSection::Repository => "📁 REPOSITORY ANALYSIS",
            ReportSection::PrimaryAnalysis => "🔍 PRIMARY ANALYSIS",
            ReportSection::FactCheck => "🧪 FACT CHECK ANALYSIS",
            ReportSection::Aggregate => "📊 AGGREGATE ANALYSIS",
            ReportSection::ExecutiveSummary => "📋 EXECUTIVE SUMMARY",
        }
    }
}

/// A section with its display-ready body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSection {
    pub section: ReportSection,
    pub body: String,
}

/// Decode a raw payload into result items.
///
/// The service sends either a JSON array or a string holding one.
pub fn parse_items(payload: &Value) -> Result<Vec<AnalysisResultItem>> {
    let items = match payload {
        Value::String(raw) => serde_json::from_str(raw)?,
        other => serde_json::from_value(other.clone())?,
    };
    Ok(items)
}

/// Build the sections for every item, keeping item order
pub fn build_sections(items: &[AnalysisResultItem]) -> Vec<RenderedSection> {
    let mut sections = Vec::new();

    for item in items {
        if let Some(repo) = non_empty(&item.comparison_repo) {
            sections.push(RenderedSection {
                section: ReportSection::Repository,
                body: format!("Repository: {}", repo),
            });
        }

        if let Some(analysis) = non_empty(&item.analysis_result) {
            sections.push(RenderedSection {
                section: ReportSection::PrimaryAnalysis,
                body: analysis.to_string(),
            });
        }

        if let Some(fact_check) = non_empty(&item.fact_check_result) {
            sections.push(RenderedSection {
                section: ReportSection::FactCheck,
                body: clean_markdown(fact_check),
            });
        }

        if let Some(aggregate) = non_empty(&item.aggregate_query_result)
            && aggregate != NO_AGGREGATE_SENTINEL
        {
            sections.push(RenderedSection {
                section: ReportSection::Aggregate,
                body: aggregate.to_string(),
            });
        }

        if let Some(summary) = non_empty(&item.final_summary) {
            sections.push(RenderedSection {
                section: ReportSection::ExecutiveSummary,
                body: clean_markdown(summary),
            });
        }
    }

    sections
}

/// Concatenate sections into the plain-text report
pub fn render(sections: &[RenderedSection]) -> String {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    let mut output = String::new();

    for section in sections {
        output.push_str(section.section.heading());
        output.push('\n');
        output.push_str(&separator);
        output.push('\n');
        output.push_str(&section.body);
        output.push_str("\n\n");
    }

    output
}

/// Turn a raw analysis payload into a readable report.
///
/// Never fails: a payload that cannot be decoded produces an error message
/// followed by a pretty-printed dump of the input.
pub fn format_results(results: Option<&Value>) -> String {
    let Some(payload) = results.filter(|value| !value.is_null()) else {
        return NO_RESULTS.to_string();
    };

    match parse_items(payload) {
        Ok(items) if items.is_empty() => NO_ANALYSIS_RESULTS.to_string(),
        Ok(items) => {
            tracing::debug!("Formatting {} analysis result items", items.len());
            render(&build_sections(&items))
        }
        Err(e) => {
            tracing::warn!("Could not decode analysis results: {}", e);
            let raw = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            format!("Error formatting results: {}\n\nRaw data:\n{}", e, raw)
        }
    }
}

/// Read a saved payload from a file or stdin.
///
/// Accepts a bare payload or a whole results response, in which case its
/// `analysis_result` is used. Text that is not JSON is kept as a string so
/// the formatter can report it.
pub fn read_payload<R: Read>(mut reader: R) -> Result<Option<Value>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let value = match serde_json::from_str::<Value>(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Payload is not JSON ({}), keeping raw text", e);
            Value::String(content)
        }
    };

    let payload = match value {
        Value::Object(mut map) if map.contains_key("analysis_result") => {
            map.remove("analysis_result")
        }
        other => Some(other),
    };

    Ok(payload.filter(|value| !value.is_null()))
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_none_returns_no_results() {
        assert_eq!(format_results(None), "No results available");
        assert_eq!(format_results(Some(&Value::Null)), "No results available");
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(format_results(Some(&json!([]))), NO_ANALYSIS_RESULTS);
        assert_eq!(format_results(Some(&json!("[]"))), NO_ANALYSIS_RESULTS);
    }

    #[test]
    fn test_summary_with_confidence_rating() {
        let payload = json!(r#"[{"finalSummary":"Confidence Rating: **High**"}]"#);

        let output = format_results(Some(&payload));

        assert!(output.contains("🎯 CONFIDENCE LEVEL: High"));
        assert!(output.contains("EXECUTIVE SUMMARY"));
        assert!(!output.contains("AGGREGATE ANALYSIS"));
    }

    #[test]
    fn test_aggregate_sentinel_is_skipped() {
        let payload = json!([{
            "analysisResult": "primary",
            "aggregateQueryResult": "No aggregate query generated."
        }]);

        let output = format_results(Some(&payload));

        assert!(output.contains("🔍 PRIMARY ANALYSIS"));
        assert!(!output.contains("AGGREGATE ANALYSIS"));
    }

    #[test]
    fn test_aggregate_included_when_present() {
        let payload = json!([{"aggregateQueryResult": "3 of 4 repos use CI"}]);

        let output = format_results(Some(&payload));

        assert!(output.starts_with("📊 AGGREGATE ANALYSIS\n"));
        assert!(output.contains("3 of 4 repos use CI"));
    }

    #[test]
    fn test_full_item_section_order() {
        let payload = json!([{
            "comparisonRepo": "org/other",
            "analysisResult": "## Not cleaned",
            "factCheckResult": "## Claims\nok",
            "aggregateQueryResult": "aggregate",
            "finalSummary": "summary"
        }]);

        let output = format_results(Some(&payload));
        let separator = "=".repeat(51);

        let expected = format!(
            "📁 REPOSITORY ANALYSIS\n{sep}\nRepository: org/other\n\n\
             🔍 PRIMARY ANALYSIS\n{sep}\n## Not cleaned\n\n\
             🧪 FACT CHECK ANALYSIS\n{sep}\nClaims\nok\n\n\
             📊 AGGREGATE ANALYSIS\n{sep}\naggregate\n\n\
             📋 EXECUTIVE SUMMARY\n{sep}\nsummary\n\n",
            sep = separator
        );
        assert_eq!(output, expected);
    }

    #[test]
    fn test_items_rendered_in_order_without_regrouping() {
        let payload = json!([
            {"comparisonRepo": "org/a", "finalSummary": "first"},
            {"comparisonRepo": "org/b", "finalSummary": "second"}
        ]);

        let sections = build_sections(&parse_items(&payload).unwrap());
        let kinds: Vec<ReportSection> = sections.iter().map(|s| s.section).collect();

        assert_eq!(
            kinds,
            vec![
                ReportSection::Repository,
                ReportSection::ExecutiveSummary,
                ReportSection::Repository,
                ReportSection::ExecutiveSummary,
            ]
        );
        assert_eq!(sections[2].body, "Repository: org/b");
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let payload = json!([{"comparisonRepo": "", "analysisResult": "", "finalSummary": "x"}]);

        let sections = build_sections(&parse_items(&payload).unwrap());

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section, ReportSection::ExecutiveSummary);
    }

    #[test]
    fn test_unparseable_input_reports_error_with_dump() {
        let payload = json!("definitely not json");

        let output = format_results(Some(&payload));

        assert!(output.starts_with("Error formatting results:"));
        assert!(output.contains("Raw data:\n\"definitely not json\""));
    }

    #[test]
    fn test_wrong_shape_reports_error_with_pretty_dump() {
        let payload = json!({"unexpected": {"nested": true}});

        let output = format_results(Some(&payload));

        assert!(output.starts_with("Error formatting results:"));
        assert!(output.contains("{\n  \"unexpected\": {\n    \"nested\": true\n  }\n}"));
    }

    #[test]
    fn test_read_payload_extracts_analysis_result() {
        let input = r#"{"session_id":"s","status":"completed","analysis_result":[{"finalSummary":"x"}]}"#;

        let payload = read_payload(input.as_bytes()).unwrap();

        assert_eq!(payload, Some(json!([{"finalSummary": "x"}])));
    }

    #[test]
    fn test_read_payload_keeps_raw_text() {
        let payload = read_payload("not json at all".as_bytes()).unwrap();
        assert_eq!(payload, Some(json!("not json at all")));
    }

    #[test]
    fn test_read_payload_null_result() {
        let input = r#"{"session_id":"s","status":"processing","analysis_result":null}"#;
        assert_eq!(read_payload(input.as_bytes()).unwrap(), None);
    }
}
