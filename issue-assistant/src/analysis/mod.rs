//! Analysis results and the model request loop.

mod error;
mod parse;
mod types;

pub use error::RequestError;
pub use parse::{parse_analysis, ParsedAnalysis, Rejection};
pub use types::{IssueAnalysis, IssueType, PriorityScore};

use crate::llm::{GenerationParams, TextGenerator};
use crate::prompt::build_repair_prompt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Corrective re-requests allowed after a rejected reply.
pub const MAX_REPAIR_ATTEMPTS: u8 = 1;

/// Sends prompts to a [`TextGenerator`] and validates the replies.
#[derive(Clone)]
pub struct AnalysisRequester {
    generator: Arc<dyn TextGenerator>,
    params: GenerationParams,
}

impl AnalysisRequester {
    /// Creates a requester using `params` for every call.
    pub fn new(generator: Arc<dyn TextGenerator>, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    /// Sampling parameters in use.
    #[must_use]
    pub fn params(&self) -> GenerationParams {
        self.params
    }

    /// Requests an analysis for `prompt`.
    ///
    /// A rejected reply triggers at most [`MAX_REPAIR_ATTEMPTS`] corrective
    /// requests that restate the original prompt plus the rejection reason.
    /// Provider failures are returned immediately.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] describing the last failure.
    pub async fn request(&self, prompt: &str) -> Result<IssueAnalysis, RequestError> {
        let mut repairs_left = MAX_REPAIR_ATTEMPTS;
        let mut attempts: u8 = 0;
        let mut repair_prompt: Option<String> = None;

        loop {
            attempts += 1;
            let current = repair_prompt.as_deref().unwrap_or(prompt);
            let reply = match self.generator.generate(current, &self.params).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(attempt = attempts, error = %e, "Model request failed");
                    return Err(e.into());
                }
            };

            match parse_analysis(&reply) {
                ParsedAnalysis::Valid(analysis) => {
                    debug!(attempts, "Model reply accepted");
                    return Ok(analysis);
                }
                ParsedAnalysis::Invalid(rejection) if repairs_left > 0 => {
                    repairs_left -= 1;
                    warn!(attempt = attempts, reason = %rejection, "Model reply rejected, requesting a corrected reply");
                    repair_prompt = Some(build_repair_prompt(prompt, rejection.reason()));
                }
                ParsedAnalysis::Invalid(rejection) => {
                    warn!(attempt = attempts, reason = %rejection, "Model reply rejected, giving up");
                    return Err(RequestError::rejected(rejection, attempts));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationError;
    use futures::future::{BoxFuture, FutureExt};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const VALID: &str = r#"{"summary":"Upload crashes on PNG files.","type":"bug","priority_score":"4 - Common path","suggested_labels":["bug"],"potential_impact":"Users cannot upload images."}"#;
    const MISSING_TYPE: &str = r#"{"summary":"s","priority_score":3,"suggested_labels":[],"potential_impact":"i"}"#;
    const PRIORITY_SIX: &str = r#"{"summary":"s","type":"bug","priority_score":6,"suggested_labels":[],"potential_impact":"i"}"#;

    struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, GenerationError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: impl IntoIterator<Item = Result<&'static str, GenerationError>>) -> Arc<Self> {
            let replies = replies.into_iter().map(|r| r.map(str::to_string)).collect();
            Arc::new(Self {
                replies: Mutex::new(replies),
                prompts: Mutex::default(),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate<'a>(
            &'a self,
            prompt: &'a str,
            _params: &'a GenerationParams,
        ) -> BoxFuture<'a, Result<String, GenerationError>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("generator called more often than scripted");
            async move { reply }.boxed()
        }
    }

    fn requester(generator: &Arc<ScriptedGenerator>) -> AnalysisRequester {
        AnalysisRequester::new(generator.clone(), GenerationParams::default())
    }

    #[tokio::test]
    async fn valid_first_reply_needs_one_call() {
        let generator = ScriptedGenerator::new([Ok(VALID)]);
        let analysis = requester(&generator).request("prompt").await.unwrap();
        assert_eq!(analysis.issue_type, IssueType::Bug);
        assert_eq!(generator.prompts(), ["prompt"]);
    }

    #[tokio::test]
    async fn malformed_then_valid_is_repaired() {
        let generator = ScriptedGenerator::new([Ok("Sure, here you go!"), Ok(VALID)]);
        let analysis = requester(&generator).request("prompt").await.unwrap();
        assert_eq!(analysis.priority_score.score(), 4);

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].starts_with("prompt"));
        assert!(prompts[1].contains("not valid JSON"));
    }

    #[tokio::test]
    async fn missing_type_is_a_schema_violation_after_one_repair() {
        let generator = ScriptedGenerator::new([Ok(MISSING_TYPE), Ok(MISSING_TYPE)]);
        let error = requester(&generator).request("prompt").await.unwrap_err();
        match error {
            RequestError::SchemaViolation { reason, attempts } => {
                assert!(reason.contains("`type`"), "{reason}");
                assert_eq!(attempts, 2);
            }
            other => panic!("expected schema violation, got {other:?}"),
        }
        assert_eq!(generator.prompts().len(), 2);
    }

    #[tokio::test]
    async fn out_of_range_priority_is_never_clamped() {
        let generator = ScriptedGenerator::new([Ok(PRIORITY_SIX), Ok(PRIORITY_SIX)]);
        let error = requester(&generator).request("prompt").await.unwrap_err();
        assert!(matches!(error, RequestError::SchemaViolation { .. }));
        assert_eq!(generator.prompts().len(), 2);
    }

    #[tokio::test]
    async fn last_rejection_decides_the_error_kind() {
        let generator = ScriptedGenerator::new([Ok(MISSING_TYPE), Ok("not json")]);
        let error = requester(&generator).request("prompt").await.unwrap_err();
        assert!(matches!(
            error,
            RequestError::MalformedModelOutput { attempts: 2, .. }
        ));
    }

    #[tokio::test]
    async fn provider_failure_is_not_retried() {
        let generator =
            ScriptedGenerator::new([Err(GenerationError::Failed("401 Unauthorized".into()))]);
        let error = requester(&generator).request("prompt").await.unwrap_err();
        assert!(matches!(error, RequestError::ModelUnavailable(_)));
        assert!(!error.is_timeout());
        assert_eq!(generator.prompts().len(), 1);
    }

    #[tokio::test]
    async fn provider_failure_during_repair_is_reported() {
        let generator =
            ScriptedGenerator::new([Ok("```\nnope\n```"), Err(GenerationError::Timeout(60))]);
        let error = requester(&generator).request("prompt").await.unwrap_err();
        assert!(error.is_timeout());
        assert_eq!(generator.prompts().len(), 2);
    }
}
