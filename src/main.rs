mod completion;
mod config;
mod http;
mod pipeline;
mod pr;
mod prompt;
mod report;
mod ticket;

use clap::{Arg, Command, CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use crate::pipeline::{Pipeline, RunOptions};
use crate::prompt::{AutoConfirm, Confirmer, InquireConfirmer};

/// PR Describer — drafts a GitHub Pull Request description from its diff with
/// a language model, writes it back, and moves the linked Jira ticket along.
#[derive(Parser, Debug)]
#[command(name = "pr-describer", version, about)]
struct Cli {
    /// GitHub Pull Request URL (e.g., https://github.com/org/repo/pull/42)
    ///
    /// Prompted for interactively when neither this nor --url is given.
    pr_url: Option<String>,

    /// Pull Request URL, same as the positional argument
    #[arg(short, long)]
    url: Option<String>,

    /// Completion model [default: gpt-4o, or completion.model from the config file]
    #[arg(short, long)]
    model: Option<String>,

    /// Generate and print the description without touching the PR or the ticket
    #[arg(long)]
    dry_run: bool,

    /// Answer yes to every ticket update prompt
    #[arg(short, long)]
    yes: bool,

    /// Also write the generated description to this markdown file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file path
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

impl Cli {
    /// The positional URL wins over `--url`.
    fn requested_url(&self) -> Option<&str> {
        self.pr_url.as_deref().or(self.url.as_deref())
    }
}

/// How a recognised option token consumes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    Switch,
    /// `--model=o3` or `-mo3`
    Inline,
    /// `--model o3`
    Separate,
}

fn option_arity(command: &Command, token: &str) -> Option<Arity> {
    let takes_value = |arg: &Arg| arg.get_action().takes_values();

    if let Some(long) = token.strip_prefix("--") {
        let (name, inline) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        let arg = command.get_arguments().find(|arg| arg.get_long() == Some(name))?;
        return match (takes_value(arg), inline) {
            (true, true) => Some(Arity::Inline),
            (true, false) => Some(Arity::Separate),
            (false, false) => Some(Arity::Switch),
            (false, true) => None,
        };
    }

    let mut shorts = token.strip_prefix('-')?.chars();
    let first = shorts.next()?;
    let arg = command.get_arguments().find(|arg| arg.get_short() == Some(first))?;
    let rest = shorts.as_str();
    if takes_value(arg) {
        return Some(if rest.is_empty() { Arity::Separate } else { Arity::Inline });
    }
    // A cluster like `-yq` is only kept when every letter is a known switch.
    rest.chars()
        .all(|short| {
            command
                .get_arguments()
                .any(|arg| arg.get_short() == Some(short) && !takes_value(arg))
        })
        .then_some(Arity::Switch)
}

/// Keep the options clap knows (with their values) and the first bare token;
/// drop unknown flags and any later bare tokens so they never displace the URL.
fn known_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut command = Cli::command();
    command.build();

    let mut args = args.into_iter();
    let mut kept: Vec<String> = args.next().into_iter().collect();
    let mut has_url = false;

    while let Some(token) = args.next() {
        if token == "--" {
            if let Some(url) = args.next().filter(|_| !has_url) {
                kept.push("--".to_string());
                kept.push(url);
            }
            break;
        }

        if token.len() > 1 && token.starts_with('-') {
            match option_arity(&command, &token) {
                Some(Arity::Separate) => {
                    kept.push(token);
                    kept.extend(args.next());
                }
                Some(_) => kept.push(token),
                None => debug!(flag = %token, "ignoring unknown flag"),
            }
        } else if !has_url {
            has_url = true;
            kept.push(token);
        } else {
            debug!(argument = %token, "ignoring extra argument");
        }
    }

    kept
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_from(known_args(std::env::args()));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report::error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let raw_url = match cli.requested_url() {
        Some(url) => url.to_string(),
        None => prompt::prompt_for_url()?,
    };
    let pr_url = raw_url.trim().to_string();

    let _main_span = info_span!("pr_describe", pr_url = %pr_url).entered();

    info!("parsing PR URL");
    let pull_request = pr::parse_pr_url(&pr_url)?;
    debug!(owner = %pull_request.owner, repo = %pull_request.repo, pr = %pull_request.number, "parsed PR URL");

    info!("loading configuration");
    let config = config::Config::load(&cli.config)?;

    let confirmer: Box<dyn Confirmer> = if cli.yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(InquireConfirmer)
    };

    let pipeline = Pipeline::from_config(&config, confirmer.as_ref())?;
    let options = RunOptions {
        model: config.model(cli.model.as_deref()).to_string(),
        dry_run: cli.dry_run,
    };

    let summary = pipeline.run(&pull_request, &pr_url, &options).await?;
    report::output(&summary, &pull_request, cli.output.as_deref())?;
    info!(written = summary.written, warnings = summary.warnings.len(), "done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://github.com/acme/widget/pull/42";

    fn parse(args: &[&str]) -> Cli {
        let argv = std::iter::once("pr-describer")
            .chain(args.iter().copied())
            .map(str::to_string);
        Cli::try_parse_from(known_args(argv)).unwrap()
    }

    #[test]
    fn test_positional_url() {
        let cli = parse(&[URL]);
        assert_eq!(cli.requested_url(), Some(URL));
        assert!(!cli.dry_run);
        assert!(!cli.yes);
        assert_eq!(cli.config, PathBuf::from(config::DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_url_flag_short_and_long() {
        assert_eq!(parse(&["-u", URL]).requested_url(), Some(URL));
        assert_eq!(parse(&["--url", URL]).requested_url(), Some(URL));
        assert_eq!(parse(&[&format!("--url={URL}")]).requested_url(), Some(URL));
    }

    #[test]
    fn test_positional_url_wins_over_flag() {
        let cli = parse(&["--url", "https://github.com/other/repo/pull/1", URL]);
        assert_eq!(cli.requested_url(), Some(URL));
    }

    #[test]
    fn test_no_url_means_prompt() {
        assert_eq!(parse(&["--dry-run"]).requested_url(), None);
    }

    #[test]
    fn test_model_flags() {
        assert_eq!(parse(&["-m", "o3", URL]).model.as_deref(), Some("o3"));
        assert_eq!(parse(&["--model", "o3", URL]).model.as_deref(), Some("o3"));
        assert_eq!(parse(&["-mo3", URL]).model.as_deref(), Some("o3"));
    }

    #[test]
    fn test_model_precedence_through_cli() {
        let mut config = config::Config::default();
        assert_eq!(config.model(parse(&[URL]).model.as_deref()), config::DEFAULT_MODEL);

        config.completion.model = Some("gpt-4.1".to_string());
        assert_eq!(config.model(parse(&[URL]).model.as_deref()), "gpt-4.1");
        assert_eq!(config.model(parse(&["-m", "o3", URL]).model.as_deref()), "o3");
    }

    #[test]
    fn test_unknown_flag_before_url_is_ignored() {
        let cli = parse(&["--verbose", URL, "-m", "o3"]);
        assert_eq!(cli.requested_url(), Some(URL));
        assert_eq!(cli.model.as_deref(), Some("o3"));
    }

    #[test]
    fn test_unknown_flags_anywhere_are_ignored() {
        let cli = parse(&["-x", "--color=never", URL, "--frobnicate", "--yes", "-q", "--dry-run"]);
        assert_eq!(cli.requested_url(), Some(URL));
        assert!(cli.yes);
        assert!(cli.dry_run);
    }

    #[test]
    fn test_only_first_bare_token_is_the_url() {
        let cli = parse(&[URL, "https://github.com/other/repo/pull/1", "extra"]);
        assert_eq!(cli.requested_url(), Some(URL));
    }

    #[test]
    fn test_switch_cluster_with_unknown_letter_is_dropped() {
        assert!(!parse(&["-yz", URL]).yes);
        assert!(parse(&["-y", URL]).yes);
    }

    #[test]
    fn test_known_args_keeps_option_values() {
        let argv = ["pr-describer", "--nope", "-o", "out.md", URL]
            .into_iter()
            .map(str::to_string);
        assert_eq!(known_args(argv), vec!["pr-describer", "-o", "out.md", URL]);
    }
}
