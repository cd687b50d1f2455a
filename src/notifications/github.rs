//! GitHub pull request comments

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::env;
use std::fs;
use std::path::Path;

use crate::config::GithubConfig;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Where and how to post a comment
#[derive(Debug, Clone)]
pub struct CommentTarget {
    pub api_url: String,
    pub repo: String,
    pub pull_request: u64,
    pub token: String,
}

impl CommentTarget {
    /// Resolve the target from config, explicit overrides and the Actions environment.
    ///
    /// Returns `Ok(None)` when no pull request number can be determined.
    pub fn resolve(
        config: &GithubConfig,
        token: Option<String>,
        pull_request: Option<u64>,
    ) -> Result<Option<Self>> {
        let pull_request = match pull_request {
            Some(n) => Some(n),
            None => env::var("GITHUB_EVENT_PATH")
                .ok()
                .and_then(|path| event_pull_request(Path::new(&path))),
        };

        let Some(pull_request) = pull_request else {
            return Ok(None);
        };

        let token = token
            .or_else(|| config.token.clone())
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or_else(|| anyhow::anyhow!("GitHub token not found"))?;

        let repo = env::var("GITHUB_REPOSITORY")
            .ok()
            .ok_or_else(|| anyhow::anyhow!("GITHUB_REPOSITORY not set"))?;

        let api_url = config
            .api_url
            .clone()
            .or_else(|| env::var("GITHUB_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Some(Self {
            api_url,
            repo,
            pull_request,
            token,
        }))
    }

    pub fn comments_url(&self) -> String {
        format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_url.trim_end_matches('/'),
            self.repo,
            self.pull_request
        )
    }
}

/// Pull request number from a GitHub Actions event payload
pub fn pull_request_from_event(path: &Path) -> Result<Option<u64>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload: {}", path.display()))?;
    let event: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse event payload: {}", path.display()))?;

    Ok(pull_request_number(&event))
}

/// Like [`pull_request_from_event`], but an unreadable payload only warns
fn event_pull_request(path: &Path) -> Option<u64> {
    match pull_request_from_event(path) {
        Ok(number) => number,
        Err(e) => {
            tracing::warn!("{:#}", e);
            None
        }
    }
}

fn pull_request_number(event: &Value) -> Option<u64> {
    event
        .pointer("/pull_request/number")
        .or_else(|| event.pointer("/issue/number"))
        .and_then(Value::as_u64)
}

/// Post `body` as a comment on the pull request
pub async fn post_comment(target: &CommentTarget, body: &str) -> Result<()> {
    let payload = json!({ "body": body });

    let client = reqwest::Client::new();
    let response = client
        .post(target.comments_url())
        .header("Authorization", format!("token {}", target.token))
        .header("User-Agent", "covdiff")
        .header("Accept", "application/vnd.github.v3+json")
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        anyhow::bail!("GitHub comment failed: {} - {}", status, text);
    }

    tracing::info!(
        repo = %target.repo,
        pull_request = target.pull_request,
        "posted coverage comment"
    );

    Ok(())
}
