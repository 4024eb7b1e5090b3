#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod analysis;
pub mod issues;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod validation;

pub use analysis::{
    parse_analysis, AnalysisRequester, IssueAnalysis, IssueType, ParsedAnalysis, PriorityScore,
    Rejection, RequestError, MAX_REPAIR_ATTEMPTS,
};
pub use issues::{FetchError, GitHubIssueSource, IssueComment, IssueSource, RawIssue};
pub use llm::{
    build_generator, GenerationError, GenerationParams, LlmError, SerdesAiGenerator,
    TextGenerator,
};
pub use pipeline::{AnalysisError, ErrorKind, Pipeline, PipelineConfig, SetupError, Stage};
pub use prompt::{PromptBuilder, PromptLimits, TemplateError};
pub use server::{router, serve, AnalyzeRequest, ApiError};
pub use validation::{validate_request, IssueRequest, RepositoryRef, ValidationError};
