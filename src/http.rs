use std::time::Duration;

/// Connect and request timeout applied to every outbound call.
pub const TIMEOUT: Duration = Duration::from_secs(60);

pub const USER_AGENT: &str = "pr-describer";

/// Build the HTTP client shared by the GitHub, completion and Jira clients.
pub fn build_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(TIMEOUT)
        .timeout(TIMEOUT)
        .build()
}

/// Drain a failed response into `(status, body)` for an upstream error.
pub async fn failure(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    (status, body)
}
