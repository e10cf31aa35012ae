use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::completion::{CompletionClient, CompletionError};
use crate::config::{Config, TrackerConfig};
use crate::pr::diff::{self, DiffStats};
use crate::pr::{self, GitHubClient, PrError, PullRequestRef};
use crate::prompt::Confirmer;
use crate::ticket::{self, SyncOutcome, TicketClient, TicketError};

/// Failures that abort the run. Ticket-side failures never show up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error(transparent)]
    GitHub(#[from] PrError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

#[derive(Debug, Error)]
enum TicketStepError {
    #[error("could not read head branch: {0}")]
    Branch(#[from] PrError),

    #[error(transparent)]
    Ticket(#[from] TicketError),
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub model: String,
    /// Generate only: no write-back, no ticket update.
    pub dry_run: bool,
}

/// What a run produced. `warnings` collects every ticket-side problem.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: DiffStats,
    pub description: String,
    pub written: bool,
    pub ticket: Option<SyncOutcome>,
    pub warnings: Vec<String>,
}

pub struct Pipeline<'a> {
    github: GitHubClient,
    completion: CompletionClient,
    tracker: Option<TrackerConfig>,
    confirmer: &'a dyn Confirmer,
}

impl<'a> Pipeline<'a> {
    /// Build the clients. Both core credentials must be present; nothing
    /// touches the network before this succeeds.
    pub fn from_config(config: &Config, confirmer: &'a dyn Confirmer) -> Result<Self, PipelineError> {
        let token = config
            .github_token()
            .ok_or(PipelineError::MissingCredential("GITHUB_TOKEN"))?;
        let api_key = config
            .completion_key()
            .ok_or(PipelineError::MissingCredential("OPENAI_API_KEY"))?;

        Ok(Self {
            github: GitHubClient::new(token, config.github_api_url())?,
            completion: CompletionClient::new(api_key, config.completion_api_url())?,
            tracker: config.tracker(),
            confirmer,
        })
    }

    /// Fetch, generate, write back, then try the ticket update.
    #[instrument(skip(self, pr, pr_url, options), fields(pr = %pr, model = %options.model))]
    pub async fn run(
        &self,
        pr: &PullRequestRef,
        pr_url: &str,
        options: &RunOptions,
    ) -> Result<RunSummary, PipelineError> {
        info!("fetching pull request content");
        let content = self.github.fetch_content(pr).await?;
        let stats = diff::summarize(&content.diff);
        info!(files = stats.files, additions = stats.additions, deletions = stats.deletions, "fetched diff");

        info!("generating description");
        let description = self
            .completion
            .generate_description(&content.template, &content.diff, &options.model)
            .await?;

        let mut summary = RunSummary {
            stats,
            description,
            written: false,
            ticket: None,
            warnings: Vec::new(),
        };

        if options.dry_run {
            info!("dry run, leaving PR and ticket untouched");
            return Ok(summary);
        }

        self.github.update_description(pr, &summary.description).await?;
        summary.written = true;
        info!("PR description updated");

        let Some(tracker) = &self.tracker else {
            warn!("Jira credentials not configured, skipping ticket update");
            summary
                .warnings
                .push("Jira credentials not configured (JIRA_EMAIL, JIRA_API_TOKEN, JIRA_BASE_URL); ticket not updated".to_string());
            return Ok(summary);
        };

        match self.update_ticket(tracker, pr, pr_url).await {
            Ok(outcome) => {
                if let Some(outcome) = &outcome {
                    summary.warnings.extend(outcome.failures());
                }
                summary.ticket = outcome;
            }
            Err(err) => {
                warn!(error = %err, "ticket update failed");
                summary.warnings.push(format!("Ticket update failed: {err}"));
            }
        }

        Ok(summary)
    }

    async fn update_ticket(
        &self,
        tracker: &TrackerConfig,
        pr: &PullRequestRef,
        pr_url: &str,
    ) -> Result<Option<SyncOutcome>, TicketStepError> {
        let branch = self.github.fetch_head_branch(pr).await?;
        let Some(key) = pr::extract_ticket_id(&branch) else {
            info!(branch = %branch, "no ticket key in branch name");
            return Ok(None);
        };

        info!(ticket = %key, "syncing linked ticket");
        let client = TicketClient::new(tracker.clone())?;
        let outcome = ticket::sync_ticket(&client, &key, pr_url, self.confirmer).await?;
        Ok(Some(outcome))
    }
}
