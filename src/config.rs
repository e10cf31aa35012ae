use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file looked up in the current directory.
pub const DEFAULT_CONFIG_PATH: &str = ".pr-describer.toml";

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_COMPLETION_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_SOLUTION_FIELD: &str = "customfield_10050";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-describer.toml and the environment.
///
/// Every field is optional: environment variables fill whatever the file
/// leaves unset, and a missing file is the same as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub tracker: TrackerSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. Falls back to GITHUB_TOKEN.
    pub token: Option<String>,
    /// API root, e.g. for GitHub Enterprise.
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionConfig {
    /// Falls back to OPENAI_API_KEY.
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub model: Option<String>,
}

/// Raw `[tracker]` table. Only usable once email, token and base URL are all
/// present; see [`Config::tracker`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackerSection {
    pub email: Option<String>,
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub solution_field: Option<String>,
}

/// Complete Jira credentials, handed to the ticket client at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub email: String,
    pub token: String,
    pub base_url: String,
    pub solution_field: String,
}

impl Config {
    /// Load configuration from `path`, then fill unset fields from the
    /// process environment. A missing file yields the environment-only config.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let mut config = if path.exists() {
            Self::load_from(path)?
        } else {
            Config::default()
        };

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load from a specific path without consulting the environment.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Fill every unset field from `lookup`. File values take precedence.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, name: &str| {
            if slot.is_none() {
                *slot = lookup(name).filter(|value| !value.trim().is_empty());
            }
        };

        fill(&mut self.github.token, "GITHUB_TOKEN");
        fill(&mut self.completion.api_key, "OPENAI_API_KEY");
        fill(&mut self.tracker.email, "JIRA_EMAIL");
        fill(&mut self.tracker.token, "JIRA_API_TOKEN");
        fill(&mut self.tracker.base_url, "JIRA_BASE_URL");
        fill(&mut self.tracker.solution_field, "JIRA_SOLUTION_FIELD");
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github.token.as_deref()
    }

    pub fn github_api_url(&self) -> &str {
        self.github.api_url.as_deref().unwrap_or(DEFAULT_GITHUB_API_URL)
    }

    pub fn completion_key(&self) -> Option<&str> {
        self.completion.api_key.as_deref()
    }

    pub fn completion_api_url(&self) -> &str {
        self.completion
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_COMPLETION_API_URL)
    }

    /// Model to use: the CLI choice, then the config file, then the default.
    pub fn model<'a>(&'a self, cli_choice: Option<&'a str>) -> &'a str {
        cli_choice
            .or(self.completion.model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Jira credentials, or None when any of email, token or base URL is missing.
    pub fn tracker(&self) -> Option<TrackerConfig> {
        let section = &self.tracker;
        Some(TrackerConfig {
            email: section.email.clone()?,
            token: section.token.clone()?,
            base_url: section.base_url.as_deref()?.trim_end_matches('/').to_string(),
            solution_field: section
                .solution_field
                .clone()
                .unwrap_or_else(|| DEFAULT_SOLUTION_FIELD.to_string()),
        })
    }
}
