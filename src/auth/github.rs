//! GitHub token discovery

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use crate::platform::{GitHubService, PlatformService};
use std::env;
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Resolved GitHub credentials
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// API token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// GitHub Enterprise host, `None` for github.com
    pub host: Option<String>,
}

/// Find a GitHub token.
///
/// Tries `gh auth token` first, then `GITHUB_TOKEN` and `GH_TOKEN`.
/// `GH_HOST` selects a GitHub Enterprise host.
pub async fn get_github_auth() -> Result<GitHubAuthConfig> {
    let host = host_from_env();

    if let Some(token) = token_from_gh_cli(host.as_deref()).await {
        debug!("using token from gh CLI");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
            host,
        });
    }

    if let Some(token) = token_from_env() {
        debug!("using token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host,
        });
    }

    Err(Error::Auth(
        "No GitHub authentication found. Run `gh auth login` or set GITHUB_TOKEN".to_string(),
    ))
}

/// Verify credentials by fetching the authenticated user; returns the login
pub async fn test_github_auth(config: &GitHubAuthConfig) -> Result<String> {
    let service = GitHubService::new(&config.token, config.host.as_deref())?;
    let user = service
        .get_authenticated_user()
        .await
        .map_err(|e| Error::Auth(format!("GitHub rejected the token: {e}")))?;
    Ok(user.login)
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn host_from_env() -> Option<String> {
    host_from(env_var)
}

fn token_from_env() -> Option<String> {
    token_from(env_var)
}

fn host_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    lookup("GH_HOST")
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty() && h != "github.com")
}

fn token_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    TOKEN_VARS.iter().find_map(|var| {
        lookup(var)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

async fn token_from_gh_cli(host: Option<&str>) -> Option<String> {
    let mut cmd = Command::new("gh");
    cmd.args(["auth", "token"]);
    if let Some(host) = host {
        cmd.args(["--hostname", host]);
    }

    let output = cmd.output().await.ok()?;
    if !output.status.success() {
        debug!(status = ?output.status, "gh auth token failed");
        return None;
    }

    let token = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!token.is_empty()).then_some(token)
}
