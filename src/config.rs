use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::coverage::DEFAULT_RUN_NAME;

pub const DEFAULT_BADGE_BASE_URL: &str =
    "https://raw.githubusercontent.com/kzkn/simplecov-resultset-diff-action/main/assets";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Run identifier to read from each result set
    #[serde(default = "default_run_name")]
    pub run_name: String,
    /// Prefix stripped from filenames in reports
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub badges: BadgesConfig,
    #[serde(default)]
    pub github: GithubConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BadgesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_badge_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubConfig {
    #[serde(default)]
    pub token: Option<String>,
    /// Defaults to `GITHUB_API_URL`, then https://api.github.com
    #[serde(default)]
    pub api_url: Option<String>,
}

fn default_run_name() -> String {
    DEFAULT_RUN_NAME.to_string()
}

fn default_badge_base_url() -> String {
    DEFAULT_BADGE_BASE_URL.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_name: default_run_name(),
            workspace: None,
            badges: BadgesConfig::default(),
            github: GithubConfig::default(),
        }
    }
}

impl Default for BadgesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_badge_base_url(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(content).with_context(|| "Failed to parse covdiff.toml")?;

        config.expand_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    fn expand_env(&mut self) -> Result<()> {
        if let Some(ref workspace) = self.workspace {
            self.workspace = Some(expand(workspace)?);
        }
        if let Some(ref token) = self.github.token {
            self.github.token = Some(expand(token)?);
        }
        if let Some(ref api_url) = self.github.api_url {
            self.github.api_url = Some(expand(api_url)?);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.run_name.trim().is_empty() {
            anyhow::bail!("run_name must not be empty");
        }

        if self.badges.enabled && self.badges.base_url.trim().is_empty() {
            anyhow::bail!("badges.base_url must be set when badges are enabled");
        }

        Ok(())
    }

    /// Workspace prefix, trailing slash removed
    pub fn workspace_prefix(&self) -> Option<&str> {
        self.workspace
            .as_deref()
            .map(|w| w.trim_end_matches('/'))
            .filter(|w| !w.is_empty())
    }
}

/// Expand `~`, `$VAR` and `${VAR}` in a config value
pub fn expand(value: &str) -> Result<String> {
    shellexpand::full(value)
        .map(|v| v.into_owned())
        .with_context(|| format!("Failed to expand '{}'", value))
}
