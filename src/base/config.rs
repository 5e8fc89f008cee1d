//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use config::{ConfigBuilder, builder::DefaultState};
use serde::{Deserialize, Deserializer};

use super::types::Res;

/// Default GitHub REST API base URL.
fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

/// Default number of hours without activity before a pull request is stale.
fn default_stale_hours() -> u64 {
    24
}

/// Default cron expression for the broadcast trigger (every hour at minute 10).
fn default_schedule() -> String {
    "10 * * * *".to_string()
}

/// Default lifetime of a cached stale report, in seconds.
fn default_cache_ttl_secs() -> u64 {
    60
}

/// Configuration for the stale-pr-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Slack app token (`STALE_BOT_SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`STALE_BOT_SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// GitHub token used to list pull requests (`STALE_BOT_GITHUB_TOKEN`).
    /// When missing, stale pull request reporting is disabled.
    #[serde(default)]
    pub github_token: Option<String>,
    /// GitHub REST API base URL (`STALE_BOT_GITHUB_API_URL`).
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
    /// Hours without activity before a pull request counts as stale (`STALE_BOT_STALE_HOURS`).
    #[serde(default = "default_stale_hours")]
    pub stale_hours: u64,
    /// Repositories to watch, as `owner/name` (`STALE_BOT_REPOS`, comma-separated).
    #[serde(default, deserialize_with = "deserialize_repo_list")]
    pub repos: Vec<String>,
    /// Cron expression for scheduled broadcasts (`STALE_BOT_SCHEDULE`).
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// Channel that receives scheduled broadcasts (`STALE_BOT_BROADCAST_CHANNEL`).
    /// When missing, no broadcasts are scheduled.
    #[serde(default)]
    pub broadcast_channel: Option<String>,
    /// Lifetime of a cached stale report, in seconds (`STALE_BOT_CACHE_TTL_SECS`).
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Omit repositories without stale pull requests from reports (`STALE_BOT_SKIP_EMPTY_REPOS`).
    #[serde(default)]
    pub skip_empty_repos: bool,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            slack_app_token: String::new(),
            slack_bot_token: String::new(),
            github_token: None,
            github_api_url: default_github_api_url(),
            stale_hours: default_stale_hours(),
            repos: Vec::new(),
            schedule: default_schedule(),
            broadcast_channel: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            skip_empty_repos: false,
        }
    }
}

impl ConfigInner {
    /// The GitHub token, if one is set and non-empty.
    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// The broadcast channel, if one is set and non-empty.
    pub fn broadcast_channel(&self) -> Option<&str> {
        self.broadcast_channel.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("STALE_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        Self::from_builder(cfg)
    }

    /// Builds and validates the configuration from a prepared builder.
    pub fn from_builder(cfg: ConfigBuilder<DefaultState>) -> Res<Self> {
        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        if result.stale_hours < 1 {
            return Err(anyhow::anyhow!("Stale hours must be at least 1."));
        }

        if let Some(repo) = result.repos.iter().find(|r| !is_repo_identifier(r)) {
            return Err(anyhow::anyhow!("Repository `{}` is not of the form `owner/name`.", repo));
        }

        Ok(result)
    }
}

/// Whether `repo` looks like `owner/name`.
fn is_repo_identifier(repo: &str) -> bool {
    matches!(repo.split_once('/'), Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/'))
}

/// Splits a comma-separated repository list, dropping blank entries.
pub fn parse_repo_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|r| !r.is_empty()).map(str::to_string).collect()
}

/// Accepts either a comma-separated string (environment) or a list (TOML).
fn deserialize_repo_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RepoList {
        Csv(String),
        List(Vec<String>),
    }

    Ok(match RepoList::deserialize(deserializer)? {
        RepoList::Csv(raw) => parse_repo_list(&raw),
        RepoList::List(list) => list.iter().flat_map(|r| parse_repo_list(r)).collect(),
    })
}

// Tests.
