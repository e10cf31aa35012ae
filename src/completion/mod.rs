pub mod types;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::http;
use types::{ChatMessage, ChatRequest, ChatResponse};

/// Sampling temperature for every description request.
pub const TEMPERATURE: f32 = 0.7;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that writes concise pull request descriptions. \
If a template is provided, follow its structure and fill in each section. \
Do not invent sections the template does not have. \
Format the result as GitHub-flavored markdown.";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Completion API returned no content")]
    EmptyCompletion,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct CompletionClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl CompletionClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, CompletionError> {
        Ok(Self {
            http: http::build_client()?,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Ask the model for a PR description built from `template` and `diff`.
    ///
    /// Both are embedded verbatim; the diff is never truncated or chunked.
    #[instrument(skip(self, template, diff), fields(template_bytes = template.len(), diff_bytes = diff.len()))]
    pub async fn generate_description(
        &self,
        template: &str,
        diff: &str,
        model: &str,
    ) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_user_prompt(template, diff)),
            ],
        };

        debug!("requesting completion");
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = http::failure(response).await;
            return Err(CompletionError::Upstream { status, message });
        }

        let parsed = response.json::<ChatResponse>().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(CompletionError::EmptyCompletion)?;

        debug!(description_bytes = content.len(), "received completion");
        Ok(content)
    }
}

/// User message: the existing template (possibly empty) followed by the full diff.
pub fn build_user_prompt(template: &str, diff: &str) -> String {
    format!(
        "Write a pull request description for the following change.\n\n\
         PR template:\n{template}\n\n\
         Diff:\n{diff}"
    )
}
