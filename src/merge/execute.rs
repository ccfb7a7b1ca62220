//! Pull request actions - effectful operations
//!
//! Every side-effecting call goes through [`PullRequestActions`], which
//! forwards to the platform and reports the call and its outcome to the
//! event sink.

use crate::error::Result;
use crate::events::{EventSink, PullRequestEvent};
use crate::merge::policy::UpdateTarget;
use crate::platform::PlatformService;
use crate::types::{MergePayload, PullRequest, ReviewEvent, UpdateResult};
use tracing::{debug, info, warn};

fn outcome<T: Clone>(result: &Result<T>) -> std::result::Result<T, String> {
    result.as_ref().map(Clone::clone).map_err(ToString::to_string)
}

/// Side-effecting pull request calls, each reported as an event
#[derive(Clone, Copy)]
pub struct PullRequestActions<'a> {
    platform: &'a dyn PlatformService,
    sink: &'a dyn EventSink,
}

impl<'a> PullRequestActions<'a> {
    /// Wrap a platform and an event sink
    pub fn new(platform: &'a dyn PlatformService, sink: &'a dyn EventSink) -> Self {
        Self { platform, sink }
    }

    /// Platform the actions call into
    pub fn platform(&self) -> &'a dyn PlatformService {
        self.platform
    }

    /// Merge a PR at `sha` (emits `pulls:merge`)
    pub async fn merge(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        sha: &str,
    ) -> Result<MergePayload> {
        let result = self.platform.merge_pull_request(owner, repo, number, sha).await;
        self.sink.emit(PullRequestEvent::Merge {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            sha: sha.to_string(),
            result: outcome(&result),
        });
        result
    }

    /// Open a PR (emits `pulls:create`)
    pub async fn create(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
    ) -> Result<PullRequest> {
        let result = self
            .platform
            .create_pull_request(owner, repo, title, head, base)
            .await;
        self.sink.emit(PullRequestEvent::Create {
            owner: owner.to_string(),
            repo: repo.to_string(),
            title: title.to_string(),
            head: head.to_string(),
            base: base.to_string(),
            result: outcome(&result),
        });
        result
    }

    /// Close a PR (emits `pulls:close`)
    pub async fn close(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        let result = self.platform.close_pull_request(owner, repo, number).await;
        self.sink.emit(PullRequestEvent::Close {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            result: outcome(&result),
        });
        result
    }

    /// Submit a review (emits `pulls:review`)
    pub async fn review(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        event: ReviewEvent,
        body: Option<&str>,
    ) -> Result<()> {
        let result = self
            .platform
            .create_review(owner, repo, number, event, body)
            .await;
        self.sink.emit(PullRequestEvent::Review {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            event,
            body: body.map(ToString::to_string),
            result: outcome(&result),
        });
        result
    }

    /// Request reviewers (emits `pulls:review:request`)
    pub async fn request_review(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        reviewers: &[String],
    ) -> Result<()> {
        let result = self
            .platform
            .request_reviewers(owner, repo, number, reviewers)
            .await;
        self.sink.emit(PullRequestEvent::ReviewRequest {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            reviewers: reviewers.to_vec(),
            result: outcome(&result),
        });
        result
    }

    /// Add labels to a PR (no event)
    pub async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        self.platform.add_labels(owner, repo, number, labels).await
    }

    /// Replace a stale bot PR with one targeting `target`.
    ///
    /// Opens the replacement against the original's base, labels it with
    /// `marker_label` and closes the original. If labeling or closing the
    /// original fails, the replacement is closed instead. Never returns an
    /// error; failures are recorded in the result.
    pub async fn supersede(
        &self,
        owner: &str,
        repo: &str,
        original: &PullRequest,
        target: &UpdateTarget,
        marker_label: &str,
    ) -> UpdateResult {
        let mut result = UpdateResult {
            owner: owner.to_string(),
            repo: repo.to_string(),
            original_number: original.number,
            replacement_number: None,
            closed_number: None,
            error: None,
        };

        let title = target.title();
        let replacement = match self
            .create(owner, repo, &title, &target.branch, &original.base_ref)
            .await
        {
            Ok(pr) => pr,
            Err(e) => {
                warn!(owner, repo, pr_number = original.number, error = %e, "failed to open replacement PR");
                result.error = Some(e.to_string());
                return result;
            }
        };
        result.replacement_number = Some(replacement.number);
        debug!(owner, repo, pr_number = replacement.number, %title, "opened replacement PR");

        let labels = [marker_label.to_string()];
        let finished = match self.add_labels(owner, repo, replacement.number, &labels).await {
            Ok(()) => self.close(owner, repo, original.number).await,
            Err(e) => Err(e),
        };

        match finished {
            Ok(()) => {
                result.closed_number = Some(original.number);
                info!(
                    owner,
                    repo,
                    pr_number = original.number,
                    replacement = replacement.number,
                    "superseded stale dependency PR"
                );
            }
            Err(e) => {
                warn!(owner, repo, pr_number = original.number, error = %e, "closing replacement PR after failed update");
                result.error = Some(e.to_string());
                if self.close(owner, repo, replacement.number).await.is_ok() {
                    result.closed_number = Some(replacement.number);
                }
            }
        }

        result
    }
}
