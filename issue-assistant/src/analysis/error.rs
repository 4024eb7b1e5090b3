//! Analysis request error types.

use super::parse::Rejection;
use crate::llm::GenerationError;
use thiserror::Error;

/// Errors from requesting an analysis from the model.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Every reply was unparseable.
    #[error("Model returned malformed output after {attempts} attempt(s): {reason}")]
    MalformedModelOutput { reason: String, attempts: u8 },

    /// The last reply parsed but broke the analysis schema.
    #[error("Model output violated the analysis schema after {attempts} attempt(s): {reason}")]
    SchemaViolation { reason: String, attempts: u8 },

    /// The provider call itself failed. Not retried.
    #[error(transparent)]
    ModelUnavailable(#[from] GenerationError),
}

impl RequestError {
    pub(crate) fn rejected(rejection: Rejection, attempts: u8) -> Self {
        match rejection {
            Rejection::Malformed(reason) => Self::MalformedModelOutput { reason, attempts },
            Rejection::SchemaViolation(reason) => Self::SchemaViolation { reason, attempts },
        }
    }

    /// Returns true if the provider call timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ModelUnavailable(GenerationError::Timeout(_)))
    }
}
