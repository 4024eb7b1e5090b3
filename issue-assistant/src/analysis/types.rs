//! Issue analysis result types.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Issue classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Something is broken.
    Bug,
    /// A request for new functionality.
    FeatureRequest,
    /// Missing or wrong documentation.
    Documentation,
    /// A usage question.
    Question,
    /// Anything else.
    Other,
}

impl IssueType {
    /// Every variant, in schema order.
    pub const ALL: [IssueType; 5] = [
        IssueType::Bug,
        IssueType::FeatureRequest,
        IssueType::Documentation,
        IssueType::Question,
        IssueType::Other,
    ];

    /// Wire name of the variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Bug => "bug",
            IssueType::FeatureRequest => "feature_request",
            IssueType::Documentation => "documentation",
            IssueType::Question => "question",
            IssueType::Other => "other",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            IssueType::Bug => "Bug",
            IssueType::FeatureRequest => "Feature Request",
            IssueType::Documentation => "Documentation",
            IssueType::Question => "Question",
            IssueType::Other => "Other",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "`type` must be one of bug, feature_request, documentation, question, other (got \"{s}\")"
                )
            })
    }
}

/// Priority from 1 (low) to 5 (critical) with its justification.
///
/// Serialized as a single string, `"4 - Breaks sign-in for all users"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityScore {
    score: u8,
    justification: String,
}

impl PriorityScore {
    /// Lowest accepted score.
    pub const MIN: u8 = 1;

    /// Highest accepted score.
    pub const MAX: u8 = 5;

    /// Creates a priority, rejecting scores outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns a description of the violation if the score is out of range.
    pub fn new(score: i64, justification: impl Into<String>) -> Result<Self, String> {
        u8::try_from(score)
            .ok()
            .filter(|s| (Self::MIN..=Self::MAX).contains(s))
            .map(|score| Self {
                score,
                justification: justification.into().trim().to_string(),
            })
            .ok_or_else(|| format!("`priority_score` must be between 1 and 5 (got {score})"))
    }

    /// Numeric score.
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    /// Justification text; may be empty when the model gave only a number.
    #[must_use]
    pub fn justification(&self) -> &str {
        &self.justification
    }

    /// Coerces the forms models produce for `priority_score`.
    ///
    /// Accepted: an integer; an integral float; a string starting with the
    /// score (`"4"`, `"4 - text"`, `"4: text"`, `"4/5 - text"`, `"(4) text"`);
    /// an object `{ "score": 4, "justification": "text" }`. A top-level
    /// `priority_justification` string is used when the score carries none.
    ///
    /// # Errors
    ///
    /// Returns a description of the violation.
    pub fn coerce(value: &Value, fallback_justification: Option<&str>) -> Result<Self, String> {
        let fallback = fallback_justification.unwrap_or_default();
        match value {
            Value::Number(number) => {
                let score = number
                    .as_i64()
                    .or_else(|| number.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                    .ok_or_else(|| format!("`priority_score` must be an integer (got {number})"))?;
                Self::new(score, fallback)
            }
            Value::String(text) => {
                let (score, rest) = split_leading_score(text)?;
                let justification = if rest.is_empty() { fallback } else { rest };
                Self::new(score, justification)
            }
            Value::Object(map) => {
                let score = map
                    .get("score")
                    .ok_or_else(|| "`priority_score.score` is missing".to_string())?;
                let justification = map
                    .get("justification")
                    .and_then(Value::as_str)
                    .or(fallback_justification);
                Self::coerce(score, justification)
            }
            other => Err(format!(
                "`priority_score` must be a number or string (got {})",
                json_type(other)
            )),
        }
    }
}

/// Splits `"4/5 - text"` into `(4, "text")`.
///
/// The score must be a whole number standing on its own: `"4.5"`, `"1e3"`
/// and ranges such as `"3-4"` are rejected rather than cut down to their
/// first digits.
fn split_leading_score(text: &str) -> Result<(i64, &str), String> {
    let unusable =
        || format!("`priority_score` must start with a whole number from 1 to 5 (got \"{text}\")");
    let trimmed = text.trim().trim_start_matches(['(', '[']);
    let digits_end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(trimmed.len(), |(index, _)| index);
    let (digits, rest) = trimmed.split_at(digits_end);
    let score: i64 = digits.parse().map_err(|_| unusable())?;

    let rest = rest.strip_prefix("/5").unwrap_or(rest);
    if !ends_score(rest) {
        return Err(unusable());
    }
    let rest = rest.trim_start_matches([')', ']', ' ', '-', ':', '–', '—', ',']);
    Ok((score, rest.trim()))
}

/// True if the text after the score digits starts with a separator that is
/// not immediately followed by another number.
fn ends_score(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_whitespace() || matches!(c, ')' | ']' | '-' | ':' | '–' | '—' | ',') => {
            !chars
                .next()
                .is_some_and(|next| next.is_ascii_digit() || next == '.')
        }
        Some(_) => false,
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for PriorityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.justification.is_empty() {
            write!(f, "{}", self.score)
        } else {
            write!(f, "{} - {}", self.score, self.justification)
        }
    }
}

impl Serialize for PriorityScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PriorityScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::coerce(&value, None).map_err(de::Error::custom)
    }
}

/// Structured analysis of one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueAnalysis {
    /// One-sentence summary of the problem or request.
    pub summary: String,

    /// Classification.
    #[serde(rename = "type")]
    pub issue_type: IssueType,

    /// Priority with justification.
    pub priority_score: PriorityScore,

    /// Suggested labels, in the model's order.
    pub suggested_labels: Vec<String>,

    /// Potential impact on users.
    pub potential_impact: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(4), 4, "")]
    #[case(json!(1.0), 1, "")]
    #[case(json!("5"), 5, "")]
    #[case(json!("3 - Affects a minority of users"), 3, "Affects a minority of users")]
    #[case(json!("2: cosmetic"), 2, "cosmetic")]
    #[case(json!("4/5 - Breaks CI"), 4, "Breaks CI")]
    #[case(json!("(1) Typo in README"), 1, "Typo in README")]
    #[case(json!("5 — data loss"), 5, "data loss")]
    #[case(json!("4- no space"), 4, "no space")]
    #[case(json!("5 - 10k users affected"), 5, "10k users affected")]
    #[case(json!("[2] minor"), 2, "minor")]
    #[case(json!({"score": 3, "justification": "Workaround exists"}), 3, "Workaround exists")]
    #[case(json!({"score": "2"}), 2, "")]
    fn coerces_priority_forms(#[case] value: Value, #[case] score: u8, #[case] justification: &str) {
        let priority = PriorityScore::coerce(&value, None).unwrap();
        assert_eq!(priority.score(), score);
        assert_eq!(priority.justification(), justification);
    }

    #[rstest]
    #[case(json!(6))]
    #[case(json!(0))]
    #[case(json!(-2))]
    #[case(json!(4.5))]
    #[case(json!("6 - very urgent"))]
    #[case(json!("high"))]
    #[case(json!(""))]
    #[case(json!(null))]
    #[case(json!(true))]
    #[case(json!([4]))]
    #[case(json!("4.5 - x"))]
    #[case(json!("3-4"))]
    #[case(json!("3-4 - medium"))]
    #[case(json!("1e3"))]
    #[case(json!("2/4 - half"))]
    #[case(json!("4 5"))]
    #[case(json!({"justification": "no score"}))]
    fn rejects_out_of_range_or_unusable_priority(#[case] value: Value) {
        assert!(PriorityScore::coerce(&value, None).is_err());
    }

    #[test]
    fn fallback_justification_used_for_bare_score() {
        let priority = PriorityScore::coerce(&json!(4), Some("Blocks releases")).unwrap();
        assert_eq!(priority.to_string(), "4 - Blocks releases");
    }

    #[test]
    fn priority_serializes_as_single_string() {
        let priority = PriorityScore::new(4, "Blocks releases").unwrap();
        assert_eq!(serde_json::to_value(&priority).unwrap(), json!("4 - Blocks releases"));

        let bare = PriorityScore::new(2, "").unwrap();
        assert_eq!(serde_json::to_value(&bare).unwrap(), json!("2"));
    }

    #[test]
    fn issue_type_round_trips_wire_names() {
        for kind in IssueType::ALL {
            assert_eq!(kind.as_str().parse::<IssueType>().unwrap(), kind);
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
        assert!("enhancement".parse::<IssueType>().is_err());
        assert!("Bug".parse::<IssueType>().is_err());
    }

    #[test]
    fn analysis_serializes_type_field_name() {
        let analysis = IssueAnalysis {
            summary: "Crash on upload".into(),
            issue_type: IssueType::Bug,
            priority_score: PriorityScore::new(4, "Common path").unwrap(),
            suggested_labels: vec!["bug".into(), "upload".into()],
            potential_impact: "Users lose work".into(),
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["type"], "bug");
        assert_eq!(value["priority_score"], "4 - Common path");
        assert_eq!(value["suggested_labels"], json!(["bug", "upload"]));
    }
}
