//! Built-in prompt template, output schema and few-shot examples.

/// Registry name of the analysis prompt.
pub(crate) const ANALYSIS_TEMPLATE_NAME: &str = "analysis";

/// Heading that opens the section holding the issue under analysis.
pub const ISSUE_SECTION_HEADING: &str = "## Issue to analyze";

pub(crate) const ANALYSIS_TEMPLATE: &str = r#"You are an experienced open-source maintainer who triages GitHub issues.
Analyze the GitHub issue below and return a structured assessment.

## Instructions
1. Read the title, description and comments of the issue.
2. Summarize the user's problem or request in one sentence.
3. Classify the issue as exactly one of: bug, feature_request, documentation, question, other.
4. Score its priority from 1 (low) to 5 (critical) and justify the score briefly.
5. Suggest 2-3 GitHub labels that fit the issue.
6. Describe the potential impact on users.
Respond with a single JSON object that follows the schema below. Do not wrap it in Markdown and do not add any text before or after it.

## Output schema
{{schema}}

## Examples
{{#each examples}}
### Example {{number}}
Input:
{{input}}

Output:
{{output}}

{{/each}}
## Issue to analyze
Title: {{title}}
Labels: {{labels}}

### Description
{{body}}
{{#if comments}}

### Comments ({{comment_count}})
{{comments}}
{{/if}}
"#;

/// Description of the JSON object the model must return.
pub const OUTPUT_SCHEMA: &str = r#"{
  "summary": "A one-sentence summary of the user's problem or request.",
  "type": "Exactly one of: bug, feature_request, documentation, question, other.",
  "priority_score": "A score from 1 (low) to 5 (critical) followed by a brief justification, e.g. \"4 - Breaks sign-in for all users\".",
  "suggested_labels": ["An array of 2-3 relevant GitHub labels."],
  "potential_impact": "A brief sentence on the potential impact on users if the issue is not addressed."
}"#;

/// An input/output pair shown to the model before the real issue.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FewShotExample {
    pub input: &'static str,
    pub output: &'static str,
}

pub(crate) const EXAMPLES: [FewShotExample; 2] = [
    FewShotExample {
        input: "Title: App crashes when uploading a PNG larger than 10 MB
Labels: none

### Description
Uploading a large PNG from the gallery closes the app immediately. Smaller images work fine. Android 14, app version 3.2.1.

### Comments (1)
@maintainer: Reproduced on a Pixel 8, the stack trace points at the image resizer.",
        output: r#"{
  "summary": "The app crashes whenever a user uploads a PNG image larger than 10 MB.",
  "type": "bug",
  "priority_score": "4 - A crash on a common action, although smaller uploads still work.",
  "suggested_labels": ["bug", "crash", "image-upload"],
  "potential_impact": "Users cannot share large images and lose unsaved work when the app closes."
}"#,
    },
    FewShotExample {
        input: "Title: Add a dark theme to the documentation site
Labels: docs

### Description
Reading the docs at night is hard on the eyes. It would be great to have a dark theme that follows the system preference.",
        output: r#"{
  "summary": "The user asks for a dark theme on the documentation site that follows the system setting.",
  "type": "feature_request",
  "priority_score": "2 - A comfort improvement that does not block anyone from using the docs.",
  "suggested_labels": ["enhancement", "documentation", "ui"],
  "potential_impact": "Readers who prefer dark interfaces would find the documentation more comfortable to use."
}"#,
    },
];
