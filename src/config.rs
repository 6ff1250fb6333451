// src/config.rs
// =============================================================================
// Page configuration.
//
// Everything the load functions need (who to query, how many cards, which API,
// where the templates live in the host page) is collected in one PageConfig
// and passed to them explicitly. Nothing is read from globals.
//
// Sources, lowest priority first:
// 1. Built-in defaults (Default impls below)
// 2. An optional JSON file (--config portfolio.json)
// 3. Command-line flags (applied in main.rs)
//
// Every struct uses #[serde(default)] so a config file only needs the fields
// it wants to change.
// =============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use url::Url;

/// GitHub caps `per_page` / `first` at 100
pub const MAX_PAGE_SIZE: u32 = 100;

/// Upper bound for the animation cycle and step, one minute
pub const MAX_ANIMATION_MS: u64 = 60_000;

/// Which GitHub API the page data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApiSource {
    /// REST v3: no token needed, repos are picked by name
    #[default]
    Rest,
    /// GraphQL v4: needs a token, uses the profile's pinned items
    Graphql,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// GitHub user whose repos and gists are shown
    pub username: String,
    /// Bearer token, required for GraphQL
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub source: ApiSource,
    /// Repositories to feature when using the REST API
    pub repo_names: Vec<String>,
    /// Number of pinned repositories to request from GraphQL
    pub pinned_limit: u32,
    /// Number of gists to show
    pub gist_limit: u32,
    pub api: ApiConfig,
    pub animation: AnimationConfig,
    pub dom: DomContract,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            token: None,
            source: ApiSource::Rest,
            repo_names: Vec::new(),
            pinned_limit: 6,
            gist_limit: 6,
            api: ApiConfig::default(),
            animation: AnimationConfig::default(),
            dom: DomContract::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub rest_base: String,
    pub graphql_endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rest_base: "https://api.github.com/".to_string(),
            graphql_endpoint: "https://api.github.com/graphql".to_string(),
            user_agent: concat!("showcase/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    /// REST base URL, always ending in '/' so endpoint paths join under it
    pub fn rest_base_url(&self) -> Result<Url, ConfigError> {
        let mut base = self.rest_base.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base).map_err(|source| ConfigError::InvalidUrl {
            field: "api.rest_base",
            source,
        })
    }

    pub fn graphql_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.graphql_endpoint).map_err(|source| ConfigError::InvalidUrl {
            field: "api.graphql_endpoint",
            source,
        })
    }
}

/// Staggered loading animation.
///
/// Card `i` gets the delay `-(cycle - (i * step) % cycle)`, so with the
/// defaults the cards start 2s, 1.8s, 1.6s ... into the animation and the
/// pattern repeats every ten cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub cycle_ms: u64,
    pub step_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            cycle_ms: 2000,
            step_ms: 200,
        }
    }
}

/// Element ids the host page must provide
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomContract {
    pub repo_template: String,
    pub gist_template: String,
    pub repo_container: String,
    pub gist_container: String,
    pub repo_alert: String,
    pub gist_alert: String,
}

impl Default for DomContract {
    fn default() -> Self {
        Self {
            repo_template: "repo-card-template".to_string(),
            gist_template: "gist-card-template".to_string(),
            repo_container: "my-pinned-repos".to_string(),
            gist_container: "my-gists".to_string(),
            repo_alert: "pinned-repos-errors".to_string(),
            gist_alert: "gists-errors".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no GitHub username configured (use --username or the config file)")]
    MissingUsername,

    #[error("{field} must be between 1 and 100, got {value}")]
    LimitOutOfRange { field: &'static str, value: u32 },

    #[error("the GraphQL API needs a token (use --token or GITHUB_TOKEN)")]
    MissingToken,

    #[error("animation cycle_ms and step_ms must be between 1 and 60000")]
    InvalidAnimation,

    #[error("{field} is not a valid URL")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },
}

impl PageConfig {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::MissingUsername);
        }

        check_limit("gist_limit", self.gist_limit)?;
        check_limit("pinned_limit", self.pinned_limit)?;

        if self.source == ApiSource::Graphql && self.token.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingToken);
        }

        let in_range = |ms: u64| (1..=MAX_ANIMATION_MS).contains(&ms);
        if !in_range(self.animation.cycle_ms) || !in_range(self.animation.step_ms) {
            return Err(ConfigError::InvalidAnimation);
        }

        self.api.rest_base_url()?;
        self.api.graphql_url()?;

        Ok(())
    }
}

fn check_limit(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_PAGE_SIZE {
        return Err(ConfigError::LimitOutOfRange { field, value });
    }
    Ok(())
}
