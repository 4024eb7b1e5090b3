//! Request validation.
//!
//! Turns the raw `repo_url` / `issue_number` pair received by the service
//! into an [`IssueRequest`]. Everything here is pure; no network access.

mod error;
mod request;

pub use error::ValidationError;
pub use request::{IssueRequest, RepositoryRef};

use serde_json::Value;
use url::Url;

/// The only issue tracker host accepted.
const GITHUB_HOST: &str = "github.com";

/// Validates both request fields and builds an [`IssueRequest`].
///
/// The URL is checked first, so a request with two bad fields reports
/// [`ValidationError::InvalidUrl`].
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first invalid field.
pub fn validate_request(repo_url: &str, issue_number: &Value) -> Result<IssueRequest, ValidationError> {
    let repository = parse_repository_url(repo_url)?;
    let number = parse_issue_number(issue_number)?;
    Ok(IssueRequest { repository, number })
}

/// Extracts owner and repository name from a GitHub repository URL.
///
/// Accepts `https://github.com/owner/repo`, `http://`, `www.github.com`,
/// scheme-less `github.com/owner/repo`, a trailing `.git`, and any extra
/// path segments (e.g. `/issues/12`), query or fragment.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidUrl`] if the host is not GitHub or the
/// owner/name segments are missing or malformed.
pub fn parse_repository_url(input: &str) -> Result<RepositoryRef, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::invalid_url(input, "URL is empty"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ValidationError::invalid_url(input, format!("not a URL ({e})")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::invalid_url(
            input,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    let host = url
        .host_str()
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| ValidationError::invalid_url(input, "missing host"))?;
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host != GITHUB_HOST {
        return Err(ValidationError::invalid_url(
            input,
            format!("host must be {GITHUB_HOST}"),
        ));
    }

    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty());
    let owner = segments
        .next()
        .ok_or_else(|| ValidationError::invalid_url(input, "missing repository owner"))?;
    let name = segments
        .next()
        .ok_or_else(|| ValidationError::invalid_url(input, "missing repository name"))?;
    let name = name.strip_suffix(".git").unwrap_or(name);

    if !is_valid_segment(owner) {
        return Err(ValidationError::invalid_url(
            input,
            format!("invalid repository owner '{owner}'"),
        ));
    }
    if !is_valid_segment(name) {
        return Err(ValidationError::invalid_url(
            input,
            format!("invalid repository name '{name}'"),
        ));
    }

    Ok(RepositoryRef::new(owner, name))
}

/// Checks an issue number received as JSON.
///
/// Only JSON integers are accepted; floats, strings, booleans and `null`
/// are rejected even when they look numeric.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidIssueNumber`] unless the value is a
/// positive integer.
pub fn parse_issue_number(value: &Value) -> Result<u64, ValidationError> {
    let invalid = || ValidationError::InvalidIssueNumber {
        value: value.to_string(),
    };
    match value {
        Value::Number(number) => match (number.as_u64(), number.as_i64()) {
            (Some(n), _) => validate_issue_number(n).map_err(|_| invalid()),
            (None, Some(n)) => validate_signed_issue_number(n),
            (None, None) => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

/// Checks an unsigned issue number.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidIssueNumber`] for zero.
pub fn validate_issue_number(number: u64) -> Result<u64, ValidationError> {
    if number == 0 {
        return Err(ValidationError::InvalidIssueNumber {
            value: number.to_string(),
        });
    }
    Ok(number)
}

/// Checks a signed issue number, as typed by a user.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidIssueNumber`] for values `<= 0`.
pub fn validate_signed_issue_number(number: i64) -> Result<u64, ValidationError> {
    u64::try_from(number)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ValidationError::InvalidIssueNumber {
            value: number.to_string(),
        })
}

/// GitHub owner and repository names use ASCII alphanumerics, `-`, `_` and `.`.
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("https://github.com/facebook/react", "facebook", "react")]
    #[case("http://github.com/facebook/react", "facebook", "react")]
    #[case("https://www.github.com/facebook/react", "facebook", "react")]
    #[case("github.com/facebook/react", "facebook", "react")]
    #[case("https://github.com/facebook/react/", "facebook", "react")]
    #[case("https://github.com/facebook/react.git", "facebook", "react")]
    #[case("https://github.com/facebook/react/issues/28000", "facebook", "react")]
    #[case("https://github.com/vercel/next.js?tab=readme", "vercel", "next.js")]
    #[case("https://GitHub.com/rust-lang/rust#readme", "rust-lang", "rust")]
    #[case("  https://github.com/tokio-rs/tokio  ", "tokio-rs", "tokio")]
    #[case("https://github.com/some_user/repo_name", "some_user", "repo_name")]
    fn extracts_owner_and_name(#[case] url: &str, #[case] owner: &str, #[case] name: &str) {
        let repository = parse_repository_url(url).unwrap();
        assert_eq!(repository, RepositoryRef::new(owner, name));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("facebook/react")]
    #[case("https://gitlab.com/facebook/react")]
    #[case("https://github.com")]
    #[case("https://github.com/")]
    #[case("https://github.com/facebook")]
    #[case("https://github.com/facebook/")]
    #[case("ftp://github.com/facebook/react")]
    #[case("https:///facebook/react")]
    #[case("https://notgithub.com/facebook/react")]
    #[case("https://github.com.evil.io/facebook/react")]
    #[case("https://github.com/face book/react")]
    #[case("https://github.com/facebook/re@ct")]
    #[case("https://github.com/facebook/..")]
    fn rejects_malformed_urls(#[case] url: &str) {
        let result = parse_repository_url(url);
        assert!(
            matches!(result, Err(ValidationError::InvalidUrl { .. })),
            "expected InvalidUrl for {url:?}, got {result:?}"
        );
    }

    #[rstest]
    #[case(json!(1), 1)]
    #[case(json!(28000), 28000)]
    #[case(json!(i64::MAX), i64::MAX as u64)]
    #[case(json!(u64::MAX), u64::MAX)]
    fn accepts_positive_integers(#[case] value: Value, #[case] expected: u64) {
        assert_eq!(parse_issue_number(&value).unwrap(), expected);
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!(-1))]
    #[case(json!(i64::MIN))]
    #[case(json!(1.5))]
    #[case(json!(2.0))]
    #[case(json!("12"))]
    #[case(json!(true))]
    #[case(json!(null))]
    #[case(json!([1]))]
    fn rejects_non_positive_or_non_integers(#[case] value: Value) {
        assert!(matches!(
            parse_issue_number(&value),
            Err(ValidationError::InvalidIssueNumber { .. })
        ));
    }

    #[test]
    fn signed_numbers_pass_through_unchanged() {
        for n in [1_i64, 7, 42, 999_999] {
            assert_eq!(validate_signed_issue_number(n).unwrap(), n as u64);
        }
        assert!(validate_signed_issue_number(0).is_err());
        assert!(validate_signed_issue_number(-5).is_err());
    }

    #[test]
    fn url_is_checked_before_issue_number() {
        let error = validate_request("not a url", &json!(-1)).unwrap_err();
        assert!(matches!(error, ValidationError::InvalidUrl { .. }));
    }

    #[test]
    fn builds_request() {
        let request = validate_request("https://github.com/facebook/react", &json!(28000)).unwrap();
        assert_eq!(request.repository.full_name(), "facebook/react");
        assert_eq!(request.number, 28000);
    }
}
