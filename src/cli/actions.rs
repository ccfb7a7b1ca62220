//! Bulk action commands: close, review, request-review

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross};
use anstream::println;
use pr_keeper::error::{Error, Result};
use pr_keeper::events::TracingSink;
use pr_keeper::merge::{
    ActionOutcome, PullRequestActions, close_pull_requests, request_reviews, review_pull_requests,
};
use pr_keeper::types::{ReviewEvent, parse_repo_slug};

/// Close each PR in `slug`
pub async fn run_close(ctx: &CommandContext, slug: &str, numbers: &[u64]) -> Result<()> {
    let (owner, repo) = parse_repo_slug(slug)?;
    let limit = ctx.config.concurrency_options(None, None)?.pull_concurrency;
    let actions = PullRequestActions::new(&ctx.platform, &TracingSink);

    let outcomes = close_pull_requests(actions, &owner, &repo, numbers, limit).await;
    report("Closed", &owner, &repo, &outcomes)
}

/// Submit the same review on each PR in `slug`
pub async fn run_review(
    ctx: &CommandContext,
    slug: &str,
    numbers: &[u64],
    event: ReviewEvent,
    body: Option<&str>,
) -> Result<()> {
    let (owner, repo) = parse_repo_slug(slug)?;
    let limit = ctx.config.concurrency_options(None, None)?.pull_concurrency;
    let actions = PullRequestActions::new(&ctx.platform, &TracingSink);

    let outcomes =
        review_pull_requests(actions, &owner, &repo, numbers, event, body, limit).await;
    report("Reviewed", &owner, &repo, &outcomes)
}

/// Request reviewers on each PR in `slug`
pub async fn run_request_review(
    ctx: &CommandContext,
    slug: &str,
    numbers: &[u64],
    reviewers: &[String],
) -> Result<()> {
    let (owner, repo) = parse_repo_slug(slug)?;
    let limit = ctx.config.concurrency_options(None, None)?.pull_concurrency;
    let actions = PullRequestActions::new(&ctx.platform, &TracingSink);

    let outcomes = request_reviews(actions, &owner, &repo, numbers, reviewers, limit).await;
    report("Requested review on", &owner, &repo, &outcomes)
}

/// Print per-PR outcomes; fails when any action failed
fn report(verb: &str, owner: &str, repo: &str, outcomes: &[ActionOutcome]) -> Result<()> {
    for outcome in outcomes {
        let name = format!("{owner}/{repo}#{}", outcome.number);
        match &outcome.error {
            None => println!("{} {verb} {}", check(), name.accent()),
            Some(error) => println!("{} {}: {}", cross(), name.accent(), error.warn()),
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        return Err(Error::Remote(format!(
            "{failed} of {} action(s) failed",
            outcomes.len()
        )));
    }
    Ok(())
}
