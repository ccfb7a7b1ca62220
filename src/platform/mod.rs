//! Platform service for GitHub
//!
//! The remote API surface the orchestrator depends on. `GitHubService` is
//! the production implementation; tests substitute a mock.

mod github;

pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    CombinedStatus, MergePayload, PrComment, PrStateFilter, PullRequest, PullRequestWithStatus,
    Repository, ReviewEvent, User,
};
use async_trait::async_trait;
use tracing::debug;

/// Platform service trait for repository and pull request operations
///
/// Listing methods drain every page before returning. Mutating methods
/// map non-2xx responses to [`Error::Remote`], carrying GitHub's error
/// message when the body has one.
///
/// [`Error::Remote`]: crate::error::Error::Remote
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Get the authenticated user
    async fn get_authenticated_user(&self) -> Result<User>;

    /// List logins of organizations the authenticated user belongs to
    async fn list_user_organizations(&self) -> Result<Vec<String>>;

    /// List repositories visible to the authenticated user
    async fn list_repositories_for_user(&self) -> Result<Vec<Repository>>;

    /// List repositories of an organization
    async fn list_repositories_for_organization(&self, org: &str) -> Result<Vec<Repository>>;

    /// List pull requests in a state, oldest first
    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        state: PrStateFilter,
    ) -> Result<Vec<PullRequest>>;

    /// Get the combined commit status for a ref (usually a head SHA)
    async fn get_combined_status(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<CombinedStatus>;

    /// Merge a PR, failing if its head is no longer `sha`
    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        sha: &str,
    ) -> Result<MergePayload>;

    /// Open a new PR
    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
    ) -> Result<PullRequest>;

    /// Close a PR without merging
    async fn close_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<()>;

    /// Add labels to a PR
    async fn add_labels(&self, owner: &str, repo: &str, number: u64, labels: &[String])
    -> Result<()>;

    /// List comments on a PR, oldest first
    async fn list_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<PrComment>>;

    /// Submit a review on a PR
    async fn create_review(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        event: ReviewEvent,
        body: Option<&str>,
    ) -> Result<()>;

    /// Request reviews from users
    async fn request_reviewers(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        reviewers: &[String],
    ) -> Result<()>;

    /// List pull requests with the combined status of each head attached.
    ///
    /// Statuses are fetched one PR at a time, in listing order. Any failure
    /// fails the whole listing.
    async fn list_pull_requests_with_status(
        &self,
        owner: &str,
        repo: &str,
        state: PrStateFilter,
    ) -> Result<Vec<PullRequestWithStatus>> {
        let pulls = self.list_pull_requests(owner, repo, state).await?;
        let mut result = Vec::with_capacity(pulls.len());

        for pull_request in pulls {
            let combined_status = self
                .get_combined_status(owner, repo, &pull_request.head_sha)
                .await?;
            result.push(PullRequestWithStatus {
                pull_request,
                combined_status,
            });
        }

        debug!(owner, repo, count = result.len(), "attached combined statuses");
        Ok(result)
    }
}
