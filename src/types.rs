//! Core types for pr-keeper

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::num::NonZeroUsize;

/// The authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Login name
    pub login: String,
}

/// A repository visible to the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    /// Repository name (without owner)
    pub name: String,
    /// Owner login (user or organization)
    pub owner: String,
}

/// A pull request snapshot, fetched once per orchestration pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number, unique per repository
    pub number: u64,
    /// Commit SHA at the head of the PR
    pub head_sha: String,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// PR title
    pub title: String,
    /// Login of the PR author
    pub author_login: String,
    /// Label names
    pub labels: BTreeSet<String>,
    /// Web URL for the PR
    pub url: String,
}

/// State of a commit status or of a combined status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    /// All checks passed
    Success,
    /// At least one check failed
    Failure,
    /// Checks still running
    Pending,
    /// A check errored
    Error,
}

impl std::fmt::Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Pending => write!(f, "pending"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One named status context on a commit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitStatus {
    /// Status context, e.g. `continuous-integration/travis-ci`
    pub context: String,
    /// State reported for this context
    pub state: StatusState,
}

/// Aggregate CI result for a commit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombinedStatus {
    /// Commit the status belongs to
    #[serde(default)]
    pub sha: String,
    /// Overall state
    pub state: StatusState,
    /// Individual contexts, in server order
    #[serde(default)]
    pub statuses: Vec<CommitStatus>,
}

/// A pull request with its combined status attached
#[derive(Debug, Clone)]
pub struct PullRequestWithStatus {
    /// The pull request
    pub pull_request: PullRequest,
    /// Combined status of the head commit
    pub combined_status: CombinedStatus,
}

/// A comment on a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrComment {
    /// Comment ID
    pub id: u64,
    /// Login of the comment author
    pub author_login: String,
    /// Comment body text
    pub body: String,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// Pull request state filter for listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrStateFilter {
    /// Open PRs only
    #[default]
    Open,
    /// Closed (including merged) PRs only
    Closed,
    /// Every PR
    All,
}

impl std::fmt::Display for PrStateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Body returned by the merge endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergePayload {
    /// Whether the merge happened
    pub merged: bool,
    /// SHA of the merge commit
    pub sha: Option<String>,
    /// Message from the merge endpoint
    pub message: Option<String>,
}

/// Review verdict submitted on a pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEvent {
    /// Approve the changes
    Approve,
    /// Request changes
    RequestChanges,
    /// Comment without a verdict
    Comment,
}

impl ReviewEvent {
    /// Value expected by the reviews endpoint
    pub const fn as_api_str(self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::RequestChanges => "REQUEST_CHANGES",
            Self::Comment => "COMMENT",
        }
    }
}

impl std::fmt::Display for ReviewEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::RequestChanges => write!(f, "request changes"),
            Self::Comment => write!(f, "comment"),
        }
    }
}

// =============================================================================
// Orchestration types
// =============================================================================

/// Set of repositories one orchestration pass operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Repositories owned by the authenticated user
    User,
    /// Repositories owned by the named organization
    Organization(String),
}

/// Outcome of one merge attempt
#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// PR number
    pub number: u64,
    /// Head SHA the merge was requested for
    pub sha: String,
    /// Web URL for the PR
    pub url: String,
    /// Whether the merge succeeded
    pub success: bool,
    /// Merge endpoint response (present iff `success`)
    pub payload: Option<MergePayload>,
    /// Failure message (present iff `!success`)
    pub error: Option<String>,
}

/// Outcome of superseding a stale dependency PR
#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// The stale PR
    pub original_number: u64,
    /// The replacement PR, if it was created
    pub replacement_number: Option<u64>,
    /// The PR that ended up closed, if any
    pub closed_number: Option<u64>,
    /// First failure encountered, if any
    pub error: Option<String>,
}

impl UpdateResult {
    /// Whether the original PR was replaced and closed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.closed_number == Some(self.original_number)
    }
}

/// Aggregate returned by one orchestration pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Owner the pass ran for
    pub owner: String,
    /// Number of repositories considered
    pub available_repos: usize,
    /// Number of open PRs considered across all repositories
    pub opened_pulls: usize,
    /// Merge attempts in completion order
    pub merged_pulls: Vec<MergeResult>,
    /// Supersede attempts in completion order
    pub updated_pulls: Vec<UpdateResult>,
}

impl BatchSummary {
    /// Count successful merges
    #[must_use]
    pub fn merge_count(&self) -> usize {
        self.merged_pulls.iter().filter(|r| r.success).count()
    }

    /// Count failed merges
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.merged_pulls.len() - self.merge_count()
    }
}

/// Concurrency bounds for the two fan-out levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyOptions {
    /// Max simultaneous repository-level tasks
    pub repo_concurrency: NonZeroUsize,
    /// Max simultaneous PR-level tasks per repository
    pub pull_concurrency: NonZeroUsize,
}

impl ConcurrencyOptions {
    /// Build from raw values, rejecting zero
    pub fn new(repo_concurrency: usize, pull_concurrency: usize) -> Result<Self> {
        let repo_concurrency = NonZeroUsize::new(repo_concurrency)
            .ok_or_else(|| Error::Config("repo concurrency must be at least 1".to_string()))?;
        let pull_concurrency = NonZeroUsize::new(pull_concurrency)
            .ok_or_else(|| Error::Config("pull concurrency must be at least 1".to_string()))?;
        Ok(Self {
            repo_concurrency,
            pull_concurrency,
        })
    }

    /// Upper bound on PR-level tasks in flight across all repositories
    #[must_use]
    pub const fn max_in_flight(&self) -> usize {
        self.repo_concurrency.get() * self.pull_concurrency.get()
    }
}

impl Default for ConcurrencyOptions {
    fn default() -> Self {
        Self {
            repo_concurrency: NonZeroUsize::MIN.saturating_add(3),
            pull_concurrency: NonZeroUsize::MIN.saturating_add(3),
        }
    }
}

/// Split an `owner/repo` argument
pub fn parse_repo_slug(slug: &str) -> Result<(String, String)> {
    match slug.split_once('/') {
        Some((owner, repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(Error::InvalidRepo(slug.to_string())),
    }
}
