//! Fetched issue data.

use serde::Serialize;
use std::collections::BTreeSet;

/// A single comment in an issue thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueComment {
    /// Login of the comment author.
    pub author: String,

    /// Comment text.
    pub body: String,
}

/// An issue as fetched from the tracker, with missing fields normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawIssue {
    /// Issue title.
    pub title: String,

    /// Issue body; an absent body is stored as an empty string.
    pub body: String,

    /// Label names, sorted and deduplicated.
    pub labels: BTreeSet<String>,

    /// Comment thread in chronological order.
    pub comments: Vec<IssueComment>,
}

impl RawIssue {
    /// Builds a normalized issue.
    ///
    /// An absent body becomes `""`. Comments without text are dropped.
    pub fn new(
        title: impl Into<String>,
        body: Option<String>,
        labels: impl IntoIterator<Item = String>,
        comments: impl IntoIterator<Item = IssueComment>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.unwrap_or_default(),
            labels: labels.into_iter().collect(),
            comments: comments
                .into_iter()
                .filter(|comment| !comment.body.trim().is_empty())
                .collect(),
        }
    }

    /// Returns true if the body holds anything besides whitespace.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}
