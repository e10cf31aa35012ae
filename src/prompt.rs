use inquire::{Confirm, Text};
use tracing::debug;

/// Yes/no gate in front of every ticket-side write.
pub trait Confirmer: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

/// Blocking console prompt. Defaults to "no"; interrupts and prompt errors
/// count as "no".
pub struct InquireConfirmer;

impl Confirmer for InquireConfirmer {
    fn confirm(&self, question: &str) -> bool {
        match Confirm::new(question).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(err) => {
                debug!(error = %err, "confirmation prompt failed, treating as no");
                false
            }
        }
    }
}

/// Answers yes to everything (`--yes`).
pub struct AutoConfirm;

impl Confirmer for AutoConfirm {
    fn confirm(&self, question: &str) -> bool {
        debug!(question, "auto-confirmed");
        true
    }
}

/// Ask for a PR URL when none was given on the command line.
pub fn prompt_for_url() -> Result<String, inquire::InquireError> {
    Text::new("Pull request URL:")
        .with_help_message("e.g. https://github.com/org/repo/pull/42")
        .prompt()
}
