pub mod adf;
pub mod sync;
pub mod types;

pub use adf::Document;
pub use sync::{sync_ticket, Step, SyncOutcome};
pub use types::{SubtaskRecord, TicketRecord, Transition};

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::TrackerConfig;
use crate::http;
use types::{IssueResponse, TransitionsResponse};

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Jira request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Jira API returned {status}: {message}")]
    Upstream { status: u16, message: String },
}

/// Result of asking for a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// No transition leads to the requested status; carries the targets that do exist.
    Unavailable(Vec<String>),
}

/// Jira Cloud REST v3 client, authenticated with email + API token.
pub struct TicketClient {
    http: reqwest::Client,
    config: TrackerConfig,
}

impl TicketClient {
    pub fn new(config: TrackerConfig) -> Result<Self, TicketError> {
        Ok(Self {
            http: http::build_client()?,
            config,
        })
    }

    fn issue_url(&self, key: &str) -> String {
        format!("{}/rest/api/3/issue/{}", self.config.base_url, key)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.config.email, Some(&self.config.token))
            .header("Accept", "application/json")
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, TicketError> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let (status, message) = http::failure(response).await;
            return Err(TicketError::Upstream { status, message });
        }
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn get_ticket(&self, key: &str) -> Result<TicketRecord, TicketError> {
        let request = self
            .request(reqwest::Method::GET, self.issue_url(key))
            .query(&[("fields", "status,issuetype,parent,subtasks")]);
        let issue = self.send(request).await?.json::<IssueResponse>().await?;
        let record = TicketRecord::from(issue);
        debug!(status = %record.status, issue_type = %record.issue_type, parent = ?record.parent_key, subtasks = record.subtasks.len(), "fetched ticket");
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn list_transitions(&self, key: &str) -> Result<Vec<Transition>, TicketError> {
        let url = format!("{}/transitions", self.issue_url(key));
        let response = self.send(self.request(reqwest::Method::GET, url)).await?;
        let transitions = response.json::<TransitionsResponse>().await?;
        Ok(transitions.transitions.into_iter().map(Transition::from).collect())
    }

    /// Move `key` to the status named `target` (case-insensitive). A missing
    /// transition is reported, not treated as a failure.
    #[instrument(skip(self))]
    pub async fn transition_to(&self, key: &str, target: &str) -> Result<TransitionOutcome, TicketError> {
        let transitions = self.list_transitions(key).await?;
        let Some(transition) = transitions
            .iter()
            .find(|t| t.target.eq_ignore_ascii_case(target))
        else {
            let available: Vec<String> = transitions.iter().map(|t| t.target.clone()).collect();
            warn!(available = ?available, "no transition to {target} for {key}");
            return Ok(TransitionOutcome::Unavailable(available));
        };

        let url = format!("{}/transitions", self.issue_url(key));
        let request = self
            .request(reqwest::Method::POST, url)
            .json(&json!({ "transition": { "id": transition.id } }));
        self.send(request).await?;

        info!(transition = %transition.id, "moved {key} to {target}");
        Ok(TransitionOutcome::Applied)
    }

    /// Current content of the solution field; empty when unset or unreadable.
    #[instrument(skip(self))]
    pub async fn get_solution(&self, key: &str) -> Result<Document, TicketError> {
        let field = &self.config.solution_field;
        let request = self
            .request(reqwest::Method::GET, self.issue_url(key))
            .query(&[("fields", field.as_str())]);
        let issue = self.send(request).await?.json::<Value>().await?;
        Ok(Document::from_field(issue.get("fields").and_then(|f| f.get(field))))
    }

    /// Append a "See <pr_url>'s description" paragraph to the solution field.
    #[instrument(skip(self))]
    pub async fn append_solution_note(&self, key: &str, pr_url: &str) -> Result<(), TicketError> {
        let document = self.get_solution(key).await?.with_solution_note(pr_url);
        debug!(nodes = document.content.len(), "writing solution field");

        let body = json!({ "fields": { self.config.solution_field.as_str(): document } });
        let request = self.request(reqwest::Method::PUT, self.issue_url(key)).json(&body);
        self.send(request).await?;

        info!("updated solution field on {key}");
        Ok(())
    }
}
