//! Pipeline error types.

use super::stage::{ErrorKind, Stage};
use crate::analysis::RequestError;
use crate::issues::FetchError;
use crate::llm::{GenerationError, LlmError};
use crate::prompt::TemplateError;
use crate::validation::ValidationError;
use thiserror::Error;

/// A failed analysis request, tagged by the component that raised it.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Request input was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The issue could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The prompt template failed to render.
    #[error(transparent)]
    Prompt(#[from] TemplateError),

    /// The model did not produce a usable analysis.
    #[error(transparent)]
    Request(#[from] RequestError),
}

impl AnalysisError {
    /// Machine-readable classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Validation(ValidationError::InvalidUrl { .. }) => ErrorKind::InvalidUrl,
            AnalysisError::Validation(ValidationError::InvalidIssueNumber { .. }) => {
                ErrorKind::InvalidIssueNumber
            }
            AnalysisError::Fetch(FetchError::IssueNotFound { .. }) => ErrorKind::IssueNotFound,
            AnalysisError::Fetch(FetchError::RateLimited { .. }) => ErrorKind::RateLimited,
            AnalysisError::Fetch(
                FetchError::Upstream { .. } | FetchError::Unavailable(_) | FetchError::Timeout(_),
            ) => ErrorKind::UpstreamUnavailable,
            AnalysisError::Prompt(_) => ErrorKind::Internal,
            AnalysisError::Request(RequestError::MalformedModelOutput { .. }) => {
                ErrorKind::MalformedModelOutput
            }
            AnalysisError::Request(RequestError::SchemaViolation { .. }) => {
                ErrorKind::SchemaViolation
            }
            AnalysisError::Request(RequestError::ModelUnavailable(_)) => {
                ErrorKind::ModelUnavailable
            }
        }
    }

    /// Stage that was running when the failure occurred.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            AnalysisError::Validation(_) => Stage::Validating,
            AnalysisError::Fetch(_) => Stage::Fetching,
            AnalysisError::Prompt(_) => Stage::Prompting,
            AnalysisError::Request(_) => Stage::Requesting,
        }
    }

    /// Returns true if an outbound call ran out of time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            AnalysisError::Fetch(e) => e.is_timeout(),
            AnalysisError::Request(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// HTTP status; timeouts map to 504.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        if self.is_timeout() {
            504
        } else {
            self.kind().status_code()
        }
    }
}

impl From<GenerationError> for AnalysisError {
    fn from(error: GenerationError) -> Self {
        AnalysisError::Request(error.into())
    }
}

/// Errors that prevent the pipeline from starting.
#[derive(Debug, Error)]
pub enum SetupError {
    /// LLM configuration or credential errors.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// The built-in prompt template failed to register.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
