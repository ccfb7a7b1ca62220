//! Merge engine for dependency-bot PRs
//!
//! Same split as the rest of the crate:
//! 1. Policy - classify each PR (pure, testable)
//! 2. Execute - perform the merge/supersede calls and report events (effectful)
//! 3. Orchestrate - fan out over repositories and PRs (bounded)

mod bulk;
mod execute;
mod orchestrate;
pub mod policy;

pub use bulk::{close_pull_requests, request_reviews, review_pull_requests, ActionOutcome};
pub use execute::PullRequestActions;
pub use orchestrate::{merge_eligible_pull_requests, OrchestratorContext};
pub use policy::{
    classify, find_update_reference, parse_update_target, IgnoreReason, ParseError, PolicyConfig,
    UpdateTarget, Verdict,
};
