use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::pipeline::RunSummary;
use crate::pr::PullRequestRef;
use crate::ticket::{Step, SyncOutcome};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write description file: {0}")]
    FileWrite(#[from] std::io::Error),
}

pub fn success(message: &str) {
    println!("{} {}", "✔".green().bold(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "!".yellow().bold(), message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✘".red().bold(), message.red());
}

/// Print the run summary to the terminal and, when `output_path` is given,
/// also write the generated description there as markdown.
#[instrument(skip(summary, pr), fields(pr = %pr))]
pub fn output(summary: &RunSummary, pr: &PullRequestRef, output_path: Option<&Path>) -> Result<(), ReportError> {
    print_terminal_report(summary, pr);

    if let Some(path) = output_path {
        debug!(path = %path.display(), "writing description to file");
        write_markdown(summary, path)?;
        success(&format!("Description saved to {}", path.display()));
    }

    Ok(())
}

fn print_terminal_report(summary: &RunSummary, pr: &PullRequestRef) {
    let stats = summary.stats;
    println!();
    println!(
        "PR {} | Files changed: {} | +{} -{}",
        pr.to_string().bold(),
        stats.files,
        stats.additions,
        stats.deletions
    );
    println!("═══ Generated description ═══");
    println!("{}", summary.description);
    println!("═════════════════════════════");
    println!();

    if summary.written {
        success(&format!("Updated description of {pr}"));
    } else {
        warning("Dry run: description not written back");
    }

    if let Some(line) = summary.ticket.as_ref().map(describe_ticket) {
        success(&line);
    }

    for message in &summary.warnings {
        warning(message);
    }
}

fn describe_step(step: &Step) -> String {
    match step {
        Step::Done => "done".to_string(),
        Step::Skipped => "skipped".to_string(),
        Step::Unavailable(available) if available.is_empty() => "no transitions available".to_string(),
        Step::Unavailable(available) => format!("not available (can move to: {})", available.join(", ")),
        Step::Failed(_) => "failed".to_string(),
    }
}

fn describe_ticket(outcome: &SyncOutcome) -> String {
    match outcome {
        SyncOutcome::SubtasksIncomplete { parent, pending } => format!(
            "{parent} left as is: sub-tasks still open ({})",
            pending.join(", ")
        ),
        SyncOutcome::Updated {
            key,
            transition,
            solution,
        } => format!(
            "{key}: move to Verify {}, solution note {}",
            describe_step(transition),
            describe_step(solution)
        ),
    }
}

fn write_markdown(summary: &RunSummary, path: &Path) -> Result<(), ReportError> {
    let mut md = summary.description.clone();
    if !md.ends_with('\n') {
        md.push('\n');
    }
    std::fs::write(path, md)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::diff::DiffStats;

    fn sample_pr() -> PullRequestRef {
        PullRequestRef {
            owner: "acme".to_string(),
            repo: "widget".to_string(),
            number: "42".to_string(),
        }
    }

    fn sample_summary() -> RunSummary {
        RunSummary {
            stats: DiffStats {
                files: 2,
                additions: 10,
                deletions: 3,
            },
            description: "## Summary\nAdds foo.".to_string(),
            written: true,
            ticket: Some(SyncOutcome::Updated {
                key: "AF-1".to_string(),
                transition: Step::Unavailable(vec!["Done".to_string()]),
                solution: Step::Skipped,
            }),
            warnings: vec!["something odd".to_string()],
        }
    }

    #[test]
    fn test_describe_ticket_updated() {
        let line = describe_ticket(sample_summary().ticket.as_ref().unwrap());
        assert_eq!(
            line,
            "AF-1: move to Verify not available (can move to: Done), solution note skipped"
        );
    }

    #[test]
    fn test_describe_ticket_failed_step() {
        let line = describe_ticket(&SyncOutcome::Updated {
            key: "AF-1".to_string(),
            transition: Step::Failed("Jira API returned 400: nope".to_string()),
            solution: Step::Done,
        });
        assert_eq!(line, "AF-1: move to Verify failed, solution note done");
    }

    #[test]
    fn test_describe_ticket_pending() {
        let line = describe_ticket(&SyncOutcome::SubtasksIncomplete {
            parent: "AF-1".to_string(),
            pending: vec!["AF-3".to_string(), "AF-4".to_string()],
        });
        assert!(line.contains("AF-1"));
        assert!(line.contains("AF-3, AF-4"));
    }

    #[test]
    fn test_output_to_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        output(&sample_summary(), &sample_pr(), Some(file.path())).unwrap();
        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "## Summary\nAdds foo.\n");
    }

    #[test]
    fn test_output_to_terminal() {
        let mut summary = sample_summary();
        summary.written = false;
        summary.ticket = None;
        // Should not panic
        output(&summary, &sample_pr(), None).unwrap();
    }
}
