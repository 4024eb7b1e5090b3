//! Input validation error types.

use thiserror::Error;

/// Errors that can occur while validating an analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The repository URL is not a GitHub repository URL.
    #[error("Invalid GitHub repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The issue number is not a positive integer.
    #[error("Invalid issue number '{value}': must be a positive integer")]
    InvalidIssueNumber { value: String },
}

impl ValidationError {
    pub(crate) fn invalid_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
