//! Issue fetching error types.

use super::rate_limit::{is_rate_limited, TOKEN_HINT};
use thiserror::Error;

/// Errors that can occur while fetching an issue.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The repository or issue does not exist (or is not visible).
    #[error("Issue #{number} not found in {owner}/{repo}")]
    IssueNotFound {
        owner: String,
        repo: String,
        number: u64,
    },

    /// GitHub rejected the request because of rate limiting.
    #[error("{hint}")]
    RateLimited { hint: String },

    /// GitHub answered with an unexpected error status.
    #[error("GitHub API error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    /// The request never produced a GitHub response (network, TLS, decoding).
    #[error("GitHub API unavailable: {0}")]
    Unavailable(String),

    /// The fetch did not finish within the configured bound.
    #[error("GitHub API timed out after {0} seconds")]
    Timeout(u64),
}

impl FetchError {
    /// Classifies an octocrab error for a given issue.
    pub(crate) fn from_github(error: octocrab::Error, owner: &str, repo: &str, number: u64) -> Self {
        match &error {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                if status == 404 {
                    Self::IssueNotFound {
                        owner: owner.to_string(),
                        repo: repo.to_string(),
                        number,
                    }
                } else if is_rate_limited(status, &source.message) {
                    Self::RateLimited {
                        hint: TOKEN_HINT.to_string(),
                    }
                } else {
                    Self::Upstream {
                        status,
                        message: source.message.clone(),
                    }
                }
            }
            _ => Self::Unavailable(error.to_string()),
        }
    }

    /// Returns true if the failure was the fetch timeout elapsing.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
