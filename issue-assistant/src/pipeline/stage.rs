//! Request lifecycle stages and error kinds.

use serde::Serialize;
use std::fmt;

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Validating,
    Fetching,
    Prompting,
    Requesting,
    Completed,
    Failed,
}

impl Stage {
    /// Wire name of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Validating => "validating",
            Stage::Fetching => "fetching",
            Stage::Prompting => "prompting",
            Stage::Requesting => "requesting",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    InvalidIssueNumber,
    IssueNotFound,
    RateLimited,
    UpstreamUnavailable,
    MalformedModelOutput,
    SchemaViolation,
    ModelUnavailable,
    Internal,
}

impl ErrorKind {
    /// HTTP status for this kind when the failure was not a timeout.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidUrl | ErrorKind::InvalidIssueNumber => 400,
            ErrorKind::IssueNotFound => 404,
            ErrorKind::RateLimited => 429,
            ErrorKind::UpstreamUnavailable
            | ErrorKind::MalformedModelOutput
            | ErrorKind::SchemaViolation
            | ErrorKind::ModelUnavailable => 502,
            ErrorKind::Internal => 500,
        }
    }
}
