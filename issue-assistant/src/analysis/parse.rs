//! Typed boundary between raw model text and [`IssueAnalysis`].

use super::types::{json_type, IssueAnalysis, IssueType, PriorityScore};
use serde_json::{Map, Value};
use std::fmt;

/// Why a model reply was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The reply is not a JSON object.
    Malformed(String),

    /// The reply is a JSON object that breaks the analysis schema.
    SchemaViolation(String),
}

impl Rejection {
    /// Human-readable reason.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Rejection::Malformed(reason) | Rejection::SchemaViolation(reason) => reason,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Outcome of parsing one model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAnalysis {
    /// The reply satisfies the schema.
    Valid(IssueAnalysis),

    /// The reply was rejected.
    Invalid(Rejection),
}

/// Parses a model reply into an [`IssueAnalysis`].
///
/// A single surrounding Markdown code fence is stripped first. Unknown
/// extra fields are ignored.
#[must_use]
pub fn parse_analysis(text: &str) -> ParsedAnalysis {
    let json = strip_code_fence(text);
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(e) => {
            return ParsedAnalysis::Invalid(Rejection::Malformed(format!(
                "response is not valid JSON ({e})"
            )))
        }
    };

    let map = match value {
        Value::Object(map) => map,
        other => {
            return ParsedAnalysis::Invalid(Rejection::Malformed(format!(
                "response must be a JSON object, got {}",
                json_type(&other)
            )))
        }
    };

    match analysis_from_object(&map) {
        Ok(analysis) => ParsedAnalysis::Valid(analysis),
        Err(reason) => ParsedAnalysis::Invalid(Rejection::SchemaViolation(reason)),
    }
}

fn analysis_from_object(map: &Map<String, Value>) -> Result<IssueAnalysis, String> {
    let summary = required_text(map, "summary")?;
    let issue_type = normalize_type(required_str(map, "type")?).parse::<IssueType>()?;
    let priority = map
        .get("priority_score")
        .ok_or_else(|| missing("priority_score"))?;
    let fallback = map.get("priority_justification").and_then(Value::as_str);
    let priority_score = PriorityScore::coerce(priority, fallback)?;
    let suggested_labels = required_labels(map)?;
    let potential_impact = required_text(map, "potential_impact")?;

    Ok(IssueAnalysis {
        summary,
        issue_type,
        priority_score,
        suggested_labels,
        potential_impact,
    })
}

fn missing(field: &str) -> String {
    format!("missing required field `{field}`")
}

fn required_str<'a>(map: &'a Map<String, Value>, field: &str) -> Result<&'a str, String> {
    match map.get(field) {
        None | Some(Value::Null) => Err(missing(field)),
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(format!(
            "`{field}` must be a string (got {})",
            json_type(other)
        )),
    }
}

fn required_text(map: &Map<String, Value>, field: &str) -> Result<String, String> {
    let text = required_str(map, field)?.trim();
    if text.is_empty() {
        return Err(format!("`{field}` must not be empty"));
    }
    Ok(text.to_string())
}

fn required_labels(map: &Map<String, Value>) -> Result<Vec<String>, String> {
    let items = match map.get("suggested_labels") {
        None | Some(Value::Null) => return Err(missing("suggested_labels")),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(format!(
                "`suggested_labels` must be an array of strings (got {})",
                json_type(other)
            ))
        }
    };

    let mut labels = Vec::with_capacity(items.len());
    for item in items {
        let label = item.as_str().ok_or_else(|| {
            format!(
                "`suggested_labels` must only contain strings (got {})",
                json_type(item)
            )
        })?;
        let label = label.trim();
        if !label.is_empty() {
            labels.push(label.to_string());
        }
    }
    Ok(labels)
}

/// Accepts `Feature Request` / `feature-request` for `feature_request`.
fn normalize_type(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .replace([' ', '-'], "_")
}

/// Removes one surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => {
            let body = body.trim_start();
            body.strip_prefix("json")
                .or_else(|| body.strip_prefix("JSON"))
                .unwrap_or(body)
                .trim()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn valid_json() -> Value {
        json!({
            "summary": "Cleanup callback fires twice under StrictMode.",
            "type": "bug",
            "priority_score": "3 - Development-only behaviour that confuses users",
            "suggested_labels": ["bug", "strict-mode"],
            "potential_impact": "Developers may ship workarounds for expected behaviour."
        })
    }

    fn schema_reason(text: &str) -> String {
        match parse_analysis(text) {
            ParsedAnalysis::Invalid(Rejection::SchemaViolation(reason)) => reason,
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn parses_valid_reply() {
        let ParsedAnalysis::Valid(analysis) = parse_analysis(&valid_json().to_string()) else {
            panic!("expected valid analysis");
        };
        assert_eq!(analysis.issue_type, IssueType::Bug);
        assert_eq!(analysis.priority_score.score(), 3);
        assert_eq!(analysis.suggested_labels, ["bug", "strict-mode"]);
    }

    #[rstest]
    #[case(format!("```json\n{}\n```", valid_json()))]
    #[case(format!("```\n{}\n```", valid_json()))]
    #[case(format!("\n\n  {}  \n", valid_json()))]
    #[case(format!("```json {}```", valid_json()))]
    #[case(format!("```JSON{}```", valid_json()))]
    #[case(format!("```{}```", valid_json()))]
    fn tolerates_fences_and_whitespace(#[case] text: String) {
        assert!(matches!(parse_analysis(&text), ParsedAnalysis::Valid(_)));
    }

    #[rstest]
    #[case("")]
    #[case("Sure! Here is the analysis:")]
    #[case("{\"summary\": \"cut off")]
    #[case("Here you go: {\"summary\": \"x\"}")]
    fn non_json_is_malformed(#[case] text: &str) {
        assert!(matches!(
            parse_analysis(text),
            ParsedAnalysis::Invalid(Rejection::Malformed(_))
        ));
    }

    #[rstest]
    #[case("[1, 2, 3]")]
    #[case("\"just a string\"")]
    #[case("42")]
    fn non_object_json_is_malformed(#[case] text: &str) {
        assert!(matches!(
            parse_analysis(text),
            ParsedAnalysis::Invalid(Rejection::Malformed(_))
        ));
    }

    #[rstest]
    #[case("summary")]
    #[case("type")]
    #[case("priority_score")]
    #[case("suggested_labels")]
    #[case("potential_impact")]
    fn each_missing_field_is_a_schema_violation(#[case] field: &str) {
        let mut value = valid_json();
        value.as_object_mut().unwrap().remove(field);
        let reason = schema_reason(&value.to_string());
        assert!(reason.contains(field), "{reason}");
    }

    #[rstest]
    #[case(json!("4.5 - High impact"))]
    #[case(json!("3-4 - medium"))]
    #[case(json!("1e3"))]
    fn fractional_or_ranged_priority_text_is_a_schema_violation(#[case] priority: Value) {
        let mut value = valid_json();
        value["priority_score"] = priority;
        assert!(schema_reason(&value.to_string()).contains("whole number"));
    }

    #[test]
    fn priority_out_of_range_is_a_schema_violation() {
        let mut value = valid_json();
        value["priority_score"] = json!(6);
        assert!(schema_reason(&value.to_string()).contains("between 1 and 5"));
    }

    #[rstest]
    #[case("type", json!("enhancement"))]
    #[case("type", json!(3))]
    #[case("summary", json!(""))]
    #[case("summary", json!(null))]
    #[case("suggested_labels", json!("bug, ui"))]
    #[case("suggested_labels", json!(["bug", 7]))]
    #[case("potential_impact", json!(["a"]))]
    fn wrong_field_values_are_schema_violations(#[case] field: &str, #[case] replacement: Value) {
        let mut value = valid_json();
        value[field] = replacement;
        schema_reason(&value.to_string());
    }

    #[rstest]
    #[case("Feature Request", IssueType::FeatureRequest)]
    #[case("feature-request", IssueType::FeatureRequest)]
    #[case(" Documentation ", IssueType::Documentation)]
    #[case("QUESTION", IssueType::Question)]
    fn type_spelling_is_normalized(#[case] raw: &str, #[case] expected: IssueType) {
        let mut value = valid_json();
        value["type"] = json!(raw);
        let ParsedAnalysis::Valid(analysis) = parse_analysis(&value.to_string()) else {
            panic!("expected valid analysis for {raw:?}");
        };
        assert_eq!(analysis.issue_type, expected);
    }

    #[test]
    fn separate_priority_justification_is_used() {
        let mut value = valid_json();
        value["priority_score"] = json!(5);
        value["priority_justification"] = json!("Data loss for every user");
        let ParsedAnalysis::Valid(analysis) = parse_analysis(&value.to_string()) else {
            panic!("expected valid analysis");
        };
        assert_eq!(analysis.priority_score.to_string(), "5 - Data loss for every user");
    }

    #[test]
    fn blank_labels_are_dropped_and_extra_fields_ignored() {
        let mut value = valid_json();
        value["suggested_labels"] = json!([" bug ", "", "  "]);
        value["confidence"] = json!(0.9);
        let ParsedAnalysis::Valid(analysis) = parse_analysis(&value.to_string()) else {
            panic!("expected valid analysis");
        };
        assert_eq!(analysis.suggested_labels, ["bug"]);
    }
}
