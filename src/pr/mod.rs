pub mod client;
pub mod diff;
pub mod types;

pub use client::GitHubClient;
pub use types::PullRequestRef;

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Marker the host segment of a PR URL must contain.
const HOST_MARKER: &str = "github.com";

static TICKET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]+-[0-9]+").expect("ticket pattern is valid"));

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),
}

/// Parse a GitHub PR URL into its component parts.
///
/// Expected format: https://github.com/{owner}/{repo}/pull/{number}, optionally
/// followed by more path segments (`/files`), a query or a fragment.
/// Splitting on `/` puts the host at index 2, owner at 3, repo at 4,
/// `pull` at 5 and the number at 6.
pub fn parse_pr_url(url: &str) -> Result<PullRequestRef, PrError> {
    let invalid = || PrError::InvalidUrl(url.to_string());

    let trimmed = url.trim();
    let without_suffix = trimmed
        .split(['?', '#'])
        .next()
        .unwrap_or(trimmed);

    let segments: Vec<&str> = without_suffix.split('/').collect();
    if segments.len() < 7 || !segments[2].contains(HOST_MARKER) || segments[5] != "pull" {
        return Err(invalid());
    }

    let (owner, repo, number) = (segments[3], segments[4], segments[6]);
    if owner.is_empty()
        || repo.is_empty()
        || number.is_empty()
        || !number.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    Ok(PullRequestRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number: number.to_string(),
    })
}

/// Return the first Jira-style key (`ABC-123`) in a branch name.
pub fn extract_ticket_id(branch: &str) -> Option<String> {
    TICKET_PATTERN
        .find(branch)
        .map(|found| found.as_str().to_string())
}
