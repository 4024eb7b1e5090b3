//! LLM error types.

use thiserror::Error;

/// Errors raised while configuring the text-generation backend.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to read LLM config file.
    #[error("Failed to read LLM config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse LLM config file.
    #[error("Failed to parse LLM config '{path}': {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// No API key could be resolved for the selected provider.
    #[error("No API key for LLM provider '{provider}'; set {env_var} or `api_key` in config.toml")]
    MissingApiKey {
        provider: String,
        env_var: &'static str,
    },

    /// Model error.
    #[error("Model error: {0}")]
    Model(#[from] serdes_ai_models::ModelError),
}

/// Errors raised by a single generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider call failed (transport, authentication, quota, provider error).
    #[error("Model request failed: {0}")]
    Failed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The call did not finish within the configured bound.
    #[error("Model request timed out after {0} seconds")]
    Timeout(u64),
}

impl From<serdes_ai::agent::AgentRunError> for GenerationError {
    fn from(error: serdes_ai::agent::AgentRunError) -> Self {
        Self::Failed(Box::new(error))
    }
}
