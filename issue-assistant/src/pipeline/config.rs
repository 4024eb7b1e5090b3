//! Pipeline configuration.

use crate::issues::DEFAULT_FETCH_TIMEOUT;
use crate::llm::DEFAULT_GENERATION_TIMEOUT;
use crate::prompt::PromptLimits;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for building a [`Pipeline`](super::Pipeline).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// GitHub token used for API calls; anonymous when absent.
    github_token: Option<String>,
    /// Path to the LLM config file.
    llm_config_path: PathBuf,
    /// Bound on the issue fetch.
    fetch_timeout: Duration,
    /// Bound on each generation call.
    generation_timeout: Duration,
    /// Truncation budgets for issue text.
    limits: PromptLimits,
}

impl PipelineConfig {
    /// Creates a configuration with default timeouts and budgets.
    pub fn new(llm_config_path: PathBuf) -> Self {
        Self {
            github_token: None,
            llm_config_path,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            limits: PromptLimits::default(),
        }
    }

    /// Sets the GitHub token. Blank tokens are treated as absent.
    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Sets the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Sets the generation timeout.
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Sets the truncation budgets.
    pub fn with_limits(mut self, limits: PromptLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the configured GitHub token.
    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }

    /// Returns the LLM config file path.
    pub fn llm_config_path(&self) -> &Path {
        &self.llm_config_path
    }

    /// Returns the fetch timeout.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Returns the generation timeout.
    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }

    /// Returns the truncation budgets.
    pub fn limits(&self) -> PromptLimits {
        self.limits
    }
}
