use std::fmt;

/// Represents the parsed components of a GitHub PR URL.
/// Built only by `parse_pr_url()` in pr/mod.rs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    /// Kept as text: it is only ever interpolated back into API paths.
    pub number: String,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Inputs for the completion prompt, fetched fresh on every run.
#[derive(Debug, Clone)]
pub struct PullRequestContent {
    /// Current PR body, used as the description template. May be empty.
    pub template: String,
    /// Raw unified diff as returned by GitHub.
    pub diff: String,
}
