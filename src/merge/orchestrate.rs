//! Bulk merge orchestration
//!
//! Walks every repository in scope, classifies each open pull request and
//! acts on the verdict. Two nested bounded fan-outs: repositories, then the
//! pull requests of each repository.
//!
//! Only resolving the repository set can fail the pass. Anything that goes
//! wrong for one repository or one PR is logged and the rest carry on.

use crate::batch::run_bounded;
use crate::error::Result;
use crate::events::EventSink;
use crate::merge::execute::PullRequestActions;
use crate::merge::policy::{classify, resolve_update_target, PolicyConfig, Verdict};
use crate::platform::PlatformService;
use crate::types::{
    BatchSummary, ConcurrencyOptions, MergeResult, PrStateFilter, PullRequest, Repository, Scope,
    UpdateResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Everything one orchestration pass needs
pub struct OrchestratorContext<'a> {
    /// Remote API
    pub platform: &'a dyn PlatformService,
    /// Receiver of pull request events
    pub sink: &'a dyn EventSink,
    /// Fan-out bounds
    pub concurrency: ConcurrencyOptions,
    /// Dependency-bot policy
    pub policy: PolicyConfig,
}

/// Results shared by all tasks of a pass
#[derive(Default)]
struct Accumulator {
    opened_pulls: AtomicUsize,
    merged: Mutex<Vec<MergeResult>>,
    updated: Mutex<Vec<UpdateResult>>,
}

impl Accumulator {
    fn record_merge(&self, result: MergeResult) {
        self.merged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    fn record_update(&self, result: UpdateResult) {
        self.updated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    fn into_summary(self, owner: String, available_repos: usize) -> BatchSummary {
        BatchSummary {
            owner,
            available_repos,
            opened_pulls: self.opened_pulls.into_inner(),
            merged_pulls: self
                .merged
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            updated_pulls: self
                .updated
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// Merge or supersede every eligible dependency-bot PR in scope.
///
/// Returns an error only when the repository set cannot be resolved.
pub async fn merge_eligible_pull_requests(
    ctx: &OrchestratorContext<'_>,
    scope: &Scope,
) -> Result<BatchSummary> {
    let (owner, repos) = resolve_repositories(ctx.platform, scope).await?;
    info!(
        owner = %owner,
        repos = repos.len(),
        repo_concurrency = ctx.concurrency.repo_concurrency.get(),
        pull_concurrency = ctx.concurrency.pull_concurrency.get(),
        "starting bulk merge"
    );

    let accumulator = Accumulator::default();
    let actions = PullRequestActions::new(ctx.platform, ctx.sink);

    let tasks = repos.iter().map(|repo| {
        let accumulator = &accumulator;
        let owner = owner.as_str();
        move || process_repository(ctx, actions, accumulator, owner, &repo.name)
    });
    run_bounded(tasks, ctx.concurrency.repo_concurrency).await;

    let summary = accumulator.into_summary(owner, repos.len());
    info!(
        owner = %summary.owner,
        opened = summary.opened_pulls,
        merged = summary.merge_count(),
        failed = summary.failure_count(),
        updated = summary.updated_pulls.len(),
        "bulk merge finished"
    );
    Ok(summary)
}

/// Resolve the owner login and the repositories it owns
async fn resolve_repositories(
    platform: &dyn PlatformService,
    scope: &Scope,
) -> Result<(String, Vec<Repository>)> {
    let user = platform.get_authenticated_user().await?;
    debug!(login = %user.login, ?scope, "resolving repositories");

    let (owner, repos) = match scope {
        Scope::User => {
            let repos = platform.list_repositories_for_user().await?;
            (user.login, repos)
        }
        Scope::Organization(org) => {
            let repos = platform.list_repositories_for_organization(org).await?;
            (org.clone(), repos)
        }
    };

    let owned: Vec<Repository> = repos.into_iter().filter(|r| r.owner == owner).collect();
    debug!(owner = %owner, count = owned.len(), "repositories in scope");
    Ok((owner, owned))
}

async fn process_repository(
    ctx: &OrchestratorContext<'_>,
    actions: PullRequestActions<'_>,
    accumulator: &Accumulator,
    owner: &str,
    repo: &str,
) {
    let pulls = match ctx
        .platform
        .list_pull_requests(owner, repo, PrStateFilter::Open)
        .await
    {
        Ok(pulls) => pulls,
        Err(e) => {
            warn!(owner, repo, error = %e, "skipping repository, failed to list pull requests");
            return;
        }
    };
    accumulator
        .opened_pulls
        .fetch_add(pulls.len(), Ordering::Relaxed);
    debug!(owner, repo, count = pulls.len(), "open pull requests");

    let tasks = pulls.iter().map(|pr| {
        move || process_pull_request(ctx, actions, accumulator, owner, repo, pr)
    });
    run_bounded(tasks, ctx.concurrency.pull_concurrency).await;
}

async fn process_pull_request(
    ctx: &OrchestratorContext<'_>,
    actions: PullRequestActions<'_>,
    accumulator: &Accumulator,
    owner: &str,
    repo: &str,
    pr: &PullRequest,
) {
    let status = match ctx
        .platform
        .get_combined_status(owner, repo, &pr.head_sha)
        .await
    {
        Ok(status) => status,
        Err(e) => {
            warn!(owner, repo, pr_number = pr.number, error = %e, "skipping PR, failed to fetch status");
            return;
        }
    };

    match classify(pr, &status, owner, &ctx.policy) {
        Verdict::AutoMerge => {
            let result = merge_one(actions, owner, repo, pr).await;
            accumulator.record_merge(result);
        }
        Verdict::NeedsUpdate => {
            if let Some(result) = update_one(ctx, actions, owner, repo, pr).await {
                accumulator.record_update(result);
            }
        }
        Verdict::Ignore(reason) => {
            debug!(owner, repo, pr_number = pr.number, %reason, "ignoring PR");
        }
    }
}

async fn merge_one(
    actions: PullRequestActions<'_>,
    owner: &str,
    repo: &str,
    pr: &PullRequest,
) -> MergeResult {
    let mut result = MergeResult {
        owner: owner.to_string(),
        repo: repo.to_string(),
        number: pr.number,
        sha: pr.head_sha.clone(),
        url: pr.url.clone(),
        success: false,
        payload: None,
        error: None,
    };

    match actions.merge(owner, repo, pr.number, &pr.head_sha).await {
        Ok(payload) if payload.merged => {
            info!(owner, repo, pr_number = pr.number, sha = %pr.head_sha, "merged PR");
            result.success = true;
            result.payload = Some(payload);
        }
        Ok(payload) => {
            let message = payload
                .message
                .unwrap_or_else(|| "merge was not performed".to_string());
            warn!(owner, repo, pr_number = pr.number, error = %message, "merge refused");
            result.error = Some(message);
        }
        Err(e) => {
            warn!(owner, repo, pr_number = pr.number, error = %e, "merge failed");
            result.error = Some(e.to_string());
        }
    }

    result
}

async fn update_one(
    ctx: &OrchestratorContext<'_>,
    actions: PullRequestActions<'_>,
    owner: &str,
    repo: &str,
    pr: &PullRequest,
) -> Option<UpdateResult> {
    let comments = match ctx.platform.list_comments(owner, repo, pr.number).await {
        Ok(comments) => comments,
        Err(e) => {
            warn!(owner, repo, pr_number = pr.number, error = %e, "skipping PR, failed to list comments");
            return None;
        }
    };

    let target = match resolve_update_target(&comments, owner, &ctx.policy) {
        Ok(target) => target,
        Err(e) => {
            debug!(owner, repo, pr_number = pr.number, reason = %e, "ignoring PR, no update target");
            return None;
        }
    };

    Some(
        actions
            .supersede(owner, repo, pr, &target, &ctx.policy.marker_label)
            .await,
    )
}
