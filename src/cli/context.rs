//! Shared command context for CLI commands
//!
//! Extracts the setup every remote command needs: configuration,
//! credentials and the GitHub service.

use pr_keeper::auth::get_github_auth;
use pr_keeper::config::{load_config, Config};
use pr_keeper::error::Result;
use pr_keeper::platform::GitHubService;
use std::path::Path;
use tracing::debug;

/// Shared context for CLI commands that talk to GitHub
pub struct CommandContext {
    /// Loaded configuration (defaults when no file exists)
    pub config: Config,
    /// GitHub API service
    pub platform: GitHubService,
}

impl CommandContext {
    /// Load config, resolve credentials and build the service
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(config_path)?;
        let auth = get_github_auth().await?;
        debug!(source = %auth.source, host = ?auth.host, "resolved GitHub credentials");

        let platform = GitHubService::new(&auth.token, auth.host.as_deref())?;
        Ok(Self { config, platform })
    }
}
