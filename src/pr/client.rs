use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::types::{PullRequestContent, PullRequestRef};
use super::PrError;
use crate::http;

const DIFF_MEDIA_TYPE: &str = "application/vnd.github.diff";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

#[derive(Deserialize)]
struct HeadRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct BranchResponse {
    head: HeadRef,
}

#[derive(Deserialize)]
struct DescriptionResponse {
    #[serde(default)]
    body: Option<String>,
}

/// Thin client for the GitHub pull request endpoints.
pub struct GitHubClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self, PrError> {
        Ok(Self {
            http: http::build_client()?,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn pull_url(&self, pr: &PullRequestRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.base_url, pr.owner, pr.repo, pr.number
        )
    }

    fn request(&self, method: reqwest::Method, pr: &PullRequestRef) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.pull_url(pr))
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn fetch_pull<T: DeserializeOwned>(&self, pr: &PullRequestRef) -> Result<T, PrError> {
        let response = self
            .request(reqwest::Method::GET, pr)
            .header("Accept", JSON_MEDIA_TYPE)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = http::failure(response).await;
            return Err(PrError::Upstream { status, message });
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetch the raw unified diff. An empty diff is treated as an upstream failure.
    #[instrument(skip(self, pr), fields(pr = %pr))]
    pub async fn fetch_diff(&self, pr: &PullRequestRef) -> Result<String, PrError> {
        debug!("fetching PR diff from GitHub API");
        let response = self
            .request(reqwest::Method::GET, pr)
            .header("Accept", DIFF_MEDIA_TYPE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let (status, message) = http::failure(response).await;
            return Err(PrError::Upstream { status, message });
        }

        let diff = response.text().await?;
        if diff.trim().is_empty() {
            return Err(PrError::Upstream {
                status: status.as_u16(),
                message: "diff is empty".to_string(),
            });
        }

        debug!(diff_bytes = diff.len(), "received PR diff");
        Ok(diff)
    }

    /// Fetch the current PR body, or an empty string when it has none.
    #[instrument(skip(self, pr), fields(pr = %pr))]
    pub async fn fetch_description(&self, pr: &PullRequestRef) -> Result<String, PrError> {
        debug!("fetching PR description from GitHub API");
        let pull: DescriptionResponse = self.fetch_pull(pr).await?;
        let body = pull.body.unwrap_or_default();
        debug!(body_bytes = body.len(), "received PR description");
        Ok(body)
    }

    /// Fetch the diff, then the current description.
    pub async fn fetch_content(&self, pr: &PullRequestRef) -> Result<PullRequestContent, PrError> {
        let diff = self.fetch_diff(pr).await?;
        let template = self.fetch_description(pr).await?;
        Ok(PullRequestContent { template, diff })
    }

    /// Replace the PR body.
    #[instrument(skip(self, pr, body), fields(pr = %pr, body_bytes = body.len()))]
    pub async fn update_description(&self, pr: &PullRequestRef, body: &str) -> Result<(), PrError> {
        debug!("updating PR description");
        let response = self
            .request(reqwest::Method::PATCH, pr)
            .header("Accept", JSON_MEDIA_TYPE)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = http::failure(response).await;
            return Err(PrError::Upstream { status, message });
        }

        Ok(())
    }

    /// Name of the branch the PR's head points to.
    #[instrument(skip(self, pr), fields(pr = %pr))]
    pub async fn fetch_head_branch(&self, pr: &PullRequestRef) -> Result<String, PrError> {
        let pull: BranchResponse = self.fetch_pull(pr).await?;
        let branch = pull.head.name;
        debug!(branch = %branch, "resolved head branch");
        Ok(branch)
    }
}
