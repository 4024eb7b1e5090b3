//! Prompt construction.
//!
//! Renders a [`RawIssue`] into the single prompt sent to the model. The
//! template is fixed; only the issue's own text fields are ever truncated,
//! so the instructions, schema and examples always reach the model intact.

mod error;
mod renderer;
mod template;
mod truncate;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, PromptRenderer};
pub use template::{ISSUE_SECTION_HEADING, OUTPUT_SCHEMA};
pub use truncate::{truncate_to_budget, MIN_BUDGET, TRUNCATION_MARKER};

use crate::issues::{IssueComment, RawIssue};
use serde::Serialize;
use std::borrow::Cow;
use template::EXAMPLES;
use tracing::{debug, warn};

/// Placeholder rendered in place of an empty issue body.
pub const NO_DESCRIPTION: &str = "No description provided.";

/// Character budget for the issue title.
pub const TITLE_BUDGET: usize = 256;

/// Per-field character budgets for issue text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptLimits {
    body_budget: usize,
    comments_budget: usize,
}

impl PromptLimits {
    /// Default budget for the issue body.
    pub const DEFAULT_BODY_BUDGET: usize = 4_000;

    /// Default budget for all comments combined.
    pub const DEFAULT_COMMENTS_BUDGET: usize = 3_000;

    /// Creates limits, raising any budget below [`MIN_BUDGET`] to it.
    #[must_use]
    pub fn new(body_budget: usize, comments_budget: usize) -> Self {
        Self {
            body_budget: clamp_budget("body", body_budget),
            comments_budget: clamp_budget("comments", comments_budget),
        }
    }

    /// Returns the body budget in characters.
    #[must_use]
    pub fn body_budget(&self) -> usize {
        self.body_budget
    }

    /// Returns the combined comments budget in characters.
    #[must_use]
    pub fn comments_budget(&self) -> usize {
        self.comments_budget
    }
}

impl Default for PromptLimits {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BODY_BUDGET, Self::DEFAULT_COMMENTS_BUDGET)
    }
}

fn clamp_budget(field: &str, budget: usize) -> usize {
    if budget < MIN_BUDGET {
        warn!(field, budget, min = MIN_BUDGET, "Truncation budget too small, raising it");
        return MIN_BUDGET;
    }
    budget
}

#[derive(Serialize)]
struct ExampleData {
    number: usize,
    input: &'static str,
    output: &'static str,
}

#[derive(Serialize)]
struct PromptData<'a> {
    schema: &'static str,
    examples: Vec<ExampleData>,
    title: Cow<'a, str>,
    labels: String,
    body: Cow<'a, str>,
    comments: String,
    comment_count: usize,
}

/// Builds analysis prompts from fetched issues.
pub struct PromptBuilder {
    renderer: PromptRenderer,
    limits: PromptLimits,
}

impl PromptBuilder {
    /// Creates a builder with the given truncation limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in template fails to compile.
    pub fn new(limits: PromptLimits) -> Result<Self, TemplateError> {
        Ok(Self {
            renderer: PromptRenderer::new()?,
            limits,
        })
    }

    /// Returns the configured limits.
    #[must_use]
    pub fn limits(&self) -> PromptLimits {
        self.limits
    }

    /// Renders the prompt for an issue.
    ///
    /// Rendering is deterministic: the same issue always produces the same
    /// text.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if rendering fails.
    pub fn build(&self, issue: &RawIssue) -> Result<String, TemplateError> {
        let body = if issue.has_body() {
            truncate_to_budget(&issue.body, self.limits.body_budget)
        } else {
            Cow::Borrowed(NO_DESCRIPTION)
        };

        let comments = render_comments(&issue.comments);
        let comments = truncate_to_budget(&comments, self.limits.comments_budget).into_owned();

        let labels = if issue.labels.is_empty() {
            "none".to_string()
        } else {
            issue.labels.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
        };

        let data = PromptData {
            schema: OUTPUT_SCHEMA,
            examples: EXAMPLES
                .iter()
                .enumerate()
                .map(|(index, example)| ExampleData {
                    number: index + 1,
                    input: example.input,
                    output: example.output,
                })
                .collect(),
            title: truncate_to_budget(issue.title.trim(), TITLE_BUDGET),
            labels,
            body,
            comments,
            comment_count: issue.comments.len(),
        };

        let prompt = self.renderer.render(&data)?;
        debug!(chars = prompt.chars().count(), "Built prompt");
        Ok(prompt)
    }
}

/// Concatenates comments as `@author: body`, one blank line apart.
#[must_use]
pub fn render_comments(comments: &[IssueComment]) -> String {
    comments
        .iter()
        .map(|comment| format!("@{}: {}", comment.author, comment.body.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Extends a prompt with a stricter JSON-only instruction after a rejected reply.
#[must_use]
pub fn build_repair_prompt(prompt: &str, reason: &str) -> String {
    format!(
        "{prompt}\n\
## Correction\n\
Your previous reply was rejected: {reason}.\n\
Return ONLY a valid JSON object that matches the output schema above. \
Include all five fields. Do not use Markdown code fences and do not add any other text.\n"
    )
}
