//! Status sync for the ticket linked to a PR.
//!
//! A sub-task hands the update to its parent once every sibling is complete;
//! anything else (including a Story that has a parent) is updated itself.

use tracing::{info, instrument, warn};

use super::{SubtaskRecord, TicketClient, TicketError, TicketRecord, TransitionOutcome};
use crate::prompt::Confirmer;

/// Status a ticket is moved to once its PR description is written.
pub const VERIFY_STATUS: &str = "Verify";

/// Statuses that count a sub-task as finished (compared case-insensitively).
const COMPLETE_STATUSES: [&str; 5] = ["done", "verify", "closed", "resolved", "completed"];

/// Which ticket receives the update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketPath {
    Subtask { parent: String },
    Regular,
}

/// Result of one gated write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Done,
    Skipped,
    /// The workflow has no transition to the requested status.
    Unavailable(Vec<String>),
    /// The write was attempted and the tracker rejected it.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The ticket is a sub-task and some siblings are still open.
    SubtasksIncomplete { parent: String, pending: Vec<String> },
    Updated {
        key: String,
        transition: Step,
        solution: Step,
    },
}

impl SyncOutcome {
    /// One message per sub-step that was attempted and failed.
    pub fn failures(&self) -> Vec<String> {
        let SyncOutcome::Updated {
            key,
            transition,
            solution,
        } = self
        else {
            return Vec::new();
        };

        let mut failures = Vec::new();
        if let Step::Failed(reason) = transition {
            failures.push(format!("Moving {key} to {VERIFY_STATUS} failed: {reason}"));
        }
        if let Step::Failed(reason) = solution {
            failures.push(format!("Updating the solution field of {key} failed: {reason}"));
        }
        failures
    }
}

pub fn classify(record: &TicketRecord) -> TicketPath {
    match &record.parent_key {
        Some(parent) if !record.issue_type.eq_ignore_ascii_case("story") => TicketPath::Subtask {
            parent: parent.clone(),
        },
        _ => TicketPath::Regular,
    }
}

pub fn is_complete(status: &str) -> bool {
    COMPLETE_STATUSES
        .iter()
        .any(|done| status.eq_ignore_ascii_case(done))
}

pub fn are_all_subtasks_complete(subtasks: &[SubtaskRecord]) -> bool {
    subtasks.iter().all(|sub| is_complete(&sub.status))
}

/// Move the ticket (or its parent) to Verify and link the PR from its
/// solution field. Every write is gated by `confirmer`.
///
/// Only the ticket lookups end the sync early; a failed write is recorded as
/// `Step::Failed` and the next step is still offered.
#[instrument(skip(client, confirmer))]
pub async fn sync_ticket(
    client: &TicketClient,
    key: &str,
    pr_url: &str,
    confirmer: &dyn Confirmer,
) -> Result<SyncOutcome, TicketError> {
    let record = client.get_ticket(key).await?;

    let (target, question) = match classify(&record) {
        TicketPath::Subtask { parent } => {
            let parent_record = client.get_ticket(&parent).await?;
            if !are_all_subtasks_complete(&parent_record.subtasks) {
                let pending: Vec<String> = parent_record
                    .subtasks
                    .iter()
                    .filter(|sub| !is_complete(&sub.status))
                    .map(|sub| sub.key.clone())
                    .collect();
                info!(parent = %parent, pending = ?pending, "parent still has open sub-tasks");
                return Ok(SyncOutcome::SubtasksIncomplete { parent, pending });
            }
            let question = format!("All sub-tasks of {parent} are complete. Move {parent} to {VERIFY_STATUS}?");
            (parent, question)
        }
        TicketPath::Regular => {
            let question = format!("Move {} to {VERIFY_STATUS}?", record.key);
            (record.key, question)
        }
    };

    let transition = if confirmer.confirm(&question) {
        match client.transition_to(&target, VERIFY_STATUS).await {
            Ok(TransitionOutcome::Applied) => Step::Done,
            Ok(TransitionOutcome::Unavailable(available)) => Step::Unavailable(available),
            Err(err) => {
                warn!(ticket = %target, error = %err, "transition failed");
                Step::Failed(err.to_string())
            }
        }
    } else {
        Step::Skipped
    };

    let solution = if confirmer.confirm(&format!("Link this PR in the solution field of {target}?")) {
        match client.append_solution_note(&target, pr_url).await {
            Ok(()) => Step::Done,
            Err(err) => {
                warn!(ticket = %target, error = %err, "solution update failed");
                Step::Failed(err.to_string())
            }
        }
    } else {
        Step::Skipped
    };

    Ok(SyncOutcome::Updated {
        key: target,
        transition,
        solution,
    })
}
