//! LLM configuration and serdes-ai harness.

mod config;
mod error;

pub(crate) use config::LlmConfig;
pub use error::{GenerationError, LlmError};

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serdes_ai::{agent::Agent, agent::AgentBuilder};
use serdes_ai_models::Model;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable selecting the model as `provider:model`.
pub const MODEL_ENV: &str = "ISSUE_ASSISTANT_LLM_MODEL";
const TEMPERATURE_ENV: &str = "ISSUE_ASSISTANT_LLM_TEMPERATURE";
const MAX_TOKENS_ENV: &str = "ISSUE_ASSISTANT_LLM_MAX_TOKENS";

/// Model used when neither `config.toml` nor [`MODEL_ENV`] selects one.
pub const DEFAULT_MODEL: &str = "openai:gpt-4o-mini";

/// Default bound on a single generation call.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You are an assistant that triages GitHub issues for maintainers. \
Answer with a single JSON object and nothing else.";

/// Top-level structure for `config.toml` with a single `[llm]` section.
#[derive(Debug, Clone, Deserialize)]
struct LlmConfigFile {
    /// LLM provider configuration.
    llm: LlmConfig,
}

/// Sampling parameters sent with every generation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Sampling temperature, 0.0-2.0.
    pub temperature: f64,
    /// Upper bound on output tokens.
    pub max_tokens: u64,
}

impl GenerationParams {
    /// Low temperature keeps the JSON shape stable.
    pub const DEFAULT_TEMPERATURE: f64 = 0.3;

    /// Room for the five fields without runaway prose.
    pub const DEFAULT_MAX_TOKENS: u64 = 1000;
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }
}

/// Produces a text completion for a prompt.
///
/// The pipeline only depends on this trait, so tests can swap in scripted
/// replies without touching a provider.
pub trait TextGenerator: Send + Sync {
    /// Runs one completion.
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> BoxFuture<'a, Result<String, GenerationError>>;
}

/// [`TextGenerator`] backed by a serdes-ai model.
pub struct SerdesAiGenerator {
    model: Arc<dyn Model>,
    timeout: Duration,
}

impl SerdesAiGenerator {
    /// Wraps a model; each call is bounded by `timeout`.
    pub fn new(model: Arc<dyn Model>, timeout: Duration) -> Self {
        Self { model, timeout }
    }
}

impl TextGenerator for SerdesAiGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        params: &'a GenerationParams,
    ) -> BoxFuture<'a, Result<String, GenerationError>> {
        async move {
            let agent = build_agent(Arc::clone(&self.model), params);
            let result = tokio::time::timeout(self.timeout, agent.run(prompt.to_string(), ()))
                .await
                .map_err(|_| GenerationError::Timeout(self.timeout.as_secs()))??;
            Ok(result.output)
        }
        .boxed()
    }
}

/// Generator plus the sampling parameters resolved alongside it.
pub struct ConfiguredGenerator {
    /// The provider-backed generator.
    pub generator: SerdesAiGenerator,
    /// Resolved sampling parameters.
    pub params: GenerationParams,
}

/// Builds the generator from `config.toml` (if present) and the environment.
///
/// # Arguments
///
/// * `config_path` - Path to the LLM config.toml file
/// * `timeout` - Bound on each generation call
///
/// # Errors
///
/// Fails if the config cannot be read, no API key is available for the
/// selected provider, or the model cannot be constructed.
pub fn build_generator(
    config_path: &Path,
    timeout: Duration,
) -> Result<ConfiguredGenerator, LlmError> {
    let config = load_config(config_path)?;
    let model = resolve_model(config.as_ref())?;
    let params = GenerationParams {
        temperature: resolve_temperature(config.as_ref())
            .unwrap_or(GenerationParams::DEFAULT_TEMPERATURE),
        max_tokens: resolve_max_tokens(config.as_ref())
            .unwrap_or(GenerationParams::DEFAULT_MAX_TOKENS),
    };
    tracing::info!(
        temperature = params.temperature,
        max_tokens = params.max_tokens,
        "Configured LLM"
    );

    Ok(ConfiguredGenerator {
        generator: SerdesAiGenerator::new(model, timeout),
        params,
    })
}

/// Resolves the LLM model from config or environment.
fn resolve_model(config: Option<&LlmConfig>) -> Result<Arc<dyn Model>, LlmError> {
    if let Some(config) = config {
        config.ensure_api_key()?;
        tracing::debug!(
            provider = config.provider(),
            model = config.model(),
            "Using model from config file"
        );
        return config.build_model();
    }
    let model_spec = model_spec_from_env();
    config::ensure_env_api_key(spec_provider(&model_spec))?;
    serdes_ai_models::infer_model(&model_spec).map_err(LlmError::Model)
}

fn model_spec_from_env() -> String {
    std::env::var(MODEL_ENV)
        .ok()
        .filter(|spec| !spec.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Provider part of `provider:model`; bare model names go to OpenAI.
fn spec_provider(model_spec: &str) -> &str {
    model_spec
        .split_once(':')
        .map_or("openai", |(provider, _)| provider)
}

/// Validates that a temperature value is finite and within 0.0-2.0.
fn validate_temperature(value: f64, source: &str) -> Option<f64> {
    if !value.is_finite() || !(0.0..=2.0).contains(&value) {
        tracing::warn!(
            "Invalid temperature {value} from {source}: must be finite and in range 0.0-2.0"
        );
        return None;
    }
    Some(value)
}

/// Resolves the temperature from environment or config.
///
/// Environment variable takes precedence over config file.
fn resolve_temperature(config: Option<&LlmConfig>) -> Option<f64> {
    if let Ok(val) = std::env::var(TEMPERATURE_ENV) {
        if let Ok(temp) = val.parse::<f64>() {
            return validate_temperature(temp, "environment variable");
        }
    }
    config
        .and_then(LlmConfig::temperature)
        .and_then(|t| validate_temperature(t, "config file"))
}

fn validate_max_tokens(value: u64, source: &str) -> Option<u64> {
    if value == 0 {
        tracing::warn!("Invalid max tokens 0 from {source}: must be positive");
        return None;
    }
    Some(value)
}

/// Resolves the output token bound; environment wins over config file.
fn resolve_max_tokens(config: Option<&LlmConfig>) -> Option<u64> {
    if let Ok(val) = std::env::var(MAX_TOKENS_ENV) {
        if let Ok(tokens) = val.parse::<u64>() {
            return validate_max_tokens(tokens, "environment variable");
        }
    }
    config
        .and_then(LlmConfig::max_tokens)
        .and_then(|t| validate_max_tokens(t, "config file"))
}

/// Loads the LLM config file if it exists.
fn load_config(path: &Path) -> Result<Option<LlmConfig>, LlmError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|source| LlmError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let parsed: LlmConfigFile = toml::from_str(&contents).map_err(|source| LlmError::Toml {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(parsed.llm))
}

/// Builds a tool-less agent for one completion.
fn build_agent(model: Arc<dyn Model>, params: &GenerationParams) -> Agent<(), String> {
    AgentBuilder::from_arc(model)
        .system_prompt(SYSTEM_PROMPT)
        .temperature(params.temperature)
        .max_tokens(params.max_tokens)
        .build()
}
