//! Bulk close and review actions on explicit PR numbers

use crate::batch::run_bounded;
use crate::merge::execute::PullRequestActions;
use crate::types::ReviewEvent;
use serde::Serialize;
use std::num::NonZeroUsize;

/// Outcome of one action in a bulk run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    /// PR number
    pub number: u64,
    /// Failure message, if the action failed
    pub error: Option<String>,
}

impl ActionOutcome {
    fn from_result(number: u64, result: crate::error::Result<()>) -> Self {
        Self {
            number,
            error: result.err().map(|e| e.to_string()),
        }
    }

    /// Whether the action succeeded
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Close each PR, at most `limit` at a time
pub async fn close_pull_requests(
    actions: PullRequestActions<'_>,
    owner: &str,
    repo: &str,
    numbers: &[u64],
    limit: NonZeroUsize,
) -> Vec<ActionOutcome> {
    let tasks = numbers.iter().map(|&number| {
        move || async move {
            ActionOutcome::from_result(number, actions.close(owner, repo, number).await)
        }
    });
    run_bounded(tasks, limit).await
}

/// Submit the same review on each PR, at most `limit` at a time
pub async fn review_pull_requests(
    actions: PullRequestActions<'_>,
    owner: &str,
    repo: &str,
    numbers: &[u64],
    event: ReviewEvent,
    body: Option<&str>,
    limit: NonZeroUsize,
) -> Vec<ActionOutcome> {
    let tasks = numbers.iter().map(|&number| {
        move || async move {
            let result = actions.review(owner, repo, number, event, body).await;
            ActionOutcome::from_result(number, result)
        }
    });
    run_bounded(tasks, limit).await
}

/// Request the same reviewers on each PR, at most `limit` at a time
pub async fn request_reviews(
    actions: PullRequestActions<'_>,
    owner: &str,
    repo: &str,
    numbers: &[u64],
    reviewers: &[String],
    limit: NonZeroUsize,
) -> Vec<ActionOutcome> {
    let tasks = numbers.iter().map(|&number| {
        move || async move {
            let result = actions.request_review(owner, repo, number, reviewers).await;
            ActionOutcome::from_result(number, result)
        }
    });
    run_bounded(tasks, limit).await
}
