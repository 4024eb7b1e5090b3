//! GitHub issue fetching.
//!
//! This module retrieves one issue and its comment thread from the GitHub
//! REST API and normalizes them into a [`RawIssue`]. Callers depend on the
//! [`IssueSource`] capability so tests can substitute a fake tracker.

mod error;
mod raw_issue;
pub mod rate_limit;

pub use error::FetchError;
pub use raw_issue::{IssueComment, RawIssue};

use futures::future::BoxFuture;
use futures::FutureExt;
use octocrab::models::issues::Comment;
use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use std::time::Duration;
use tracing::{debug, info_span, warn, Instrument};

/// Comments requested per page.
const COMMENTS_PER_PAGE: u8 = 100;

/// Upper bound on comments collected for a single issue.
pub const MAX_COMMENTS: usize = 500;

/// Default bound on a complete fetch (issue plus comments).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A read-only source of issues.
pub trait IssueSource: Send + Sync {
    /// Fetches one issue with its comments.
    fn fetch<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        number: u64,
    ) -> BoxFuture<'a, Result<RawIssue, FetchError>>;
}

/// [`IssueSource`] backed by the GitHub REST API.
#[derive(Clone)]
pub struct GitHubIssueSource {
    octocrab: Octocrab,
    timeout: Duration,
}

impl GitHubIssueSource {
    /// Creates a GitHub client, authenticated when a token is supplied.
    ///
    /// Anonymous access works for public repositories but is limited to
    /// 60 requests per hour.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: Option<&str>, timeout: Duration) -> Result<Self, octocrab::Error> {
        Ok(Self::from_client(build_client(token, None)?, timeout))
    }

    /// Wraps an already configured client.
    #[must_use]
    pub fn from_client(octocrab: Octocrab, timeout: Duration) -> Self {
        Self { octocrab, timeout }
    }
}

/// Builds an octocrab client with octocrab's own retries turned off.
///
/// `base_uri` overrides `https://api.github.com` (GitHub Enterprise, tests).
///
/// # Errors
///
/// Returns an error if `base_uri` is not a valid URI or the client cannot
/// be built.
pub fn build_client(
    token: Option<&str>,
    base_uri: Option<&str>,
) -> Result<Octocrab, octocrab::Error> {
    let mut builder = Octocrab::builder();
    builder.add_retry_config(RetryConfig::None);
    if let Some(token) = token {
        builder = builder.personal_token(token.to_string());
    }
    if let Some(base_uri) = base_uri {
        builder = builder.base_uri(base_uri)?;
    }
    builder.build()
}

impl IssueSource for GitHubIssueSource {
    fn fetch<'a>(
        &'a self,
        owner: &'a str,
        repo: &'a str,
        number: u64,
    ) -> BoxFuture<'a, Result<RawIssue, FetchError>> {
        let span = info_span!("fetch_issue", owner = %owner, repo = %repo, issue_number = number);
        async move {
            tokio::time::timeout(self.timeout, fetch_issue(&self.octocrab, owner, repo, number))
                .await
                .map_err(|_| FetchError::Timeout(self.timeout.as_secs()))?
        }
        .instrument(span)
        .boxed()
    }
}

/// Fetches an issue and its comments.
///
/// Performs one request for the issue and one paginated listing for the
/// comments. Nothing is retried.
///
/// # Errors
///
/// Returns [`FetchError`] classified from the GitHub response.
pub async fn fetch_issue(
    octocrab: &Octocrab,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<RawIssue, FetchError> {
    debug!("Fetching issue");
    let issue = octocrab
        .issues(owner, repo)
        .get(number)
        .await
        .map_err(|e| FetchError::from_github(e, owner, repo, number))?;

    let comments = fetch_comments(octocrab, owner, repo, number).await?;
    let labels = issue.labels.into_iter().map(|label| label.name);
    let raw = RawIssue::new(issue.title, issue.body, labels, comments);

    debug!(
        labels = raw.labels.len(),
        comments = raw.comments.len(),
        has_body = raw.has_body(),
        "Fetched issue"
    );
    Ok(raw)
}

/// Collects the comment thread, following pagination up to [`MAX_COMMENTS`].
async fn fetch_comments(
    octocrab: &Octocrab,
    owner: &str,
    repo: &str,
    number: u64,
) -> Result<Vec<IssueComment>, FetchError> {
    let classify = |e| FetchError::from_github(e, owner, repo, number);

    let mut page = octocrab
        .issues(owner, repo)
        .list_comments(number)
        .per_page(COMMENTS_PER_PAGE)
        .send()
        .await
        .map_err(classify)?;

    let mut comments: Vec<IssueComment> = page.items.drain(..).map(to_comment).collect();

    while comments.len() < MAX_COMMENTS {
        let Some(mut next_page) = octocrab
            .get_page::<Comment>(&page.next)
            .await
            .map_err(classify)?
        else {
            break;
        };
        comments.extend(next_page.items.drain(..).map(to_comment));
        page = next_page;
    }

    if comments.len() > MAX_COMMENTS {
        warn!(max = MAX_COMMENTS, "Comment thread exceeds limit, keeping the oldest comments");
        comments.truncate(MAX_COMMENTS);
    }
    Ok(comments)
}

fn to_comment(comment: Comment) -> IssueComment {
    IssueComment {
        author: comment.user.login,
        body: comment.body.unwrap_or_default(),
    }
}
