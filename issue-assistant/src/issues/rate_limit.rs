//! GitHub rate limit detection.
//!
//! GitHub reports an exhausted primary rate limit as `403 Forbidden` with an
//! "API rate limit exceeded" message, and secondary limits as either `403`
//! or `429 Too Many Requests`.

/// Hint attached to rate-limit failures.
pub const TOKEN_HINT: &str =
    "GitHub API rate limit exceeded; set GITHUB_TOKEN to a personal access token to raise the limit";

/// Returns true if a GitHub error response signals rate limiting.
#[must_use]
pub fn is_rate_limited(status: u16, message: &str) -> bool {
    match status {
        429 => true,
        403 => {
            let message = message.to_ascii_lowercase();
            message.contains("rate limit") || message.contains("abuse detection")
        }
        _ => false,
    }
}
