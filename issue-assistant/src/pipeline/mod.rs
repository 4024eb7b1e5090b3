//! Orchestrates one analysis request.
//!
//! `Received -> Validating -> Fetching -> Prompting -> Requesting`, ending in
//! `Completed` or `Failed`. Each step is a direct call; the first failure
//! ends the request with its kind and stage attached.

mod config;
mod error;
mod stage;

pub use config::PipelineConfig;
pub use error::{AnalysisError, SetupError};
pub use stage::{ErrorKind, Stage};

use crate::analysis::{AnalysisRequester, IssueAnalysis};
use crate::issues::{GitHubIssueSource, IssueSource};
use crate::llm::{build_generator, GenerationParams, TextGenerator};
use crate::prompt::{PromptBuilder, PromptLimits};
use crate::validation::{validate_request, IssueRequest};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Validates, fetches, prompts and requests, in that order.
pub struct Pipeline {
    source: Arc<dyn IssueSource>,
    prompts: PromptBuilder,
    requester: AnalysisRequester,
}

impl Pipeline {
    /// Builds a pipeline backed by GitHub and the configured LLM provider.
    ///
    /// # Errors
    ///
    /// Fails if no API key is available for the LLM provider, the LLM config
    /// is unreadable, or the GitHub client cannot be built.
    pub fn connect(config: &PipelineConfig) -> Result<Self, SetupError> {
        let configured = build_generator(config.llm_config_path(), config.generation_timeout())?;
        let source = GitHubIssueSource::new(config.github_token(), config.fetch_timeout())?;
        if config.github_token().is_none() {
            warn!("No GitHub token configured; anonymous requests are limited to 60 per hour");
        }
        Self::with_components(
            Arc::new(source),
            Arc::new(configured.generator),
            config.limits(),
            configured.params,
        )
    }

    /// Builds a pipeline from explicit collaborators.
    ///
    /// # Errors
    ///
    /// Fails if the prompt template cannot be registered.
    pub fn with_components(
        source: Arc<dyn IssueSource>,
        generator: Arc<dyn TextGenerator>,
        limits: PromptLimits,
        params: GenerationParams,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            source,
            prompts: PromptBuilder::new(limits)?,
            requester: AnalysisRequester::new(generator, params),
        })
    }

    /// Runs the full request from raw inputs.
    ///
    /// # Errors
    ///
    /// Returns the first failure, tagged with its kind and stage.
    pub async fn analyze(
        &self,
        repo_url: &str,
        issue_number: &Value,
    ) -> Result<IssueAnalysis, AnalysisError> {
        let span = info_span!("analyze", repo = %repo_url, issue_number = %issue_number);
        async move {
            debug!(stage = %Stage::Received, "Request received");
            debug!(stage = %Stage::Validating, "Validating request");
            let request = validate_request(repo_url, issue_number)
                .inspect_err(|e| warn!(stage = %Stage::Validating, error = %e, "Request rejected"))?;
            self.run(&request).await
        }
        .instrument(span)
        .await
    }

    /// Runs the request from an already validated [`IssueRequest`].
    ///
    /// # Errors
    ///
    /// Returns the first failure, tagged with its kind and stage.
    pub async fn analyze_request(
        &self,
        request: &IssueRequest,
    ) -> Result<IssueAnalysis, AnalysisError> {
        let span = info_span!(
            "analyze",
            repo = %request.repository,
            issue_number = request.number
        );
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: &IssueRequest) -> Result<IssueAnalysis, AnalysisError> {
        let result = self.run_stages(request).await;
        match &result {
            Ok(analysis) => info!(
                stage = %Stage::Completed,
                issue_type = %analysis.issue_type,
                priority = analysis.priority_score.score(),
                "Analysis completed"
            ),
            Err(e) => warn!(
                stage = %Stage::Failed,
                failed_at = %e.stage(),
                kind = ?e.kind(),
                error = %e,
                "Analysis failed"
            ),
        }
        result
    }

    async fn run_stages(&self, request: &IssueRequest) -> Result<IssueAnalysis, AnalysisError> {
        let repository = &request.repository;

        debug!(stage = %Stage::Fetching, "Fetching issue");
        let issue = self
            .source
            .fetch(&repository.owner, &repository.name, request.number)
            .await?;

        debug!(stage = %Stage::Prompting, comments = issue.comments.len(), "Building prompt");
        let prompt = self.prompts.build(&issue)?;

        debug!(stage = %Stage::Requesting, "Requesting analysis");
        Ok(self.requester.request(&prompt).await?)
    }
}
