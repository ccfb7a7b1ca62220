//! Decision policy for dependency-update bot pull requests
//!
//! Pure functions only: everything the decision needs is passed in, so the
//! same inputs always yield the same verdict.

use crate::types::{CombinedStatus, PrComment, PullRequest, StatusState};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

/// Branch reference shape: optional `<prefix>/`, then `<dependency>-<version>`
/// where the version starts with a digit. The dependency may carry an npm
/// `@scope/`.
static BRANCH_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[^@/\s][^/\s]*/)?(?P<dependency>(?:@[^/\s]+/)?[^/\s]+?)-(?P<version>v?\d[0-9A-Za-z.+\-]*)$",
    )
    .expect("valid branch reference regex")
});

/// Settings for the dependency-bot policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Login of the dependency-update bot
    pub bot_login: String,
    /// Label the bot puts on its PRs
    pub marker_label: String,
    /// Status context that must report success before any automation
    pub verify_context: String,
    /// Whether owner-updated PRs also need the verification status
    pub owner_updated_requires_verification: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            bot_login: "greenkeeper[bot]".to_string(),
            marker_label: "greenkeeper".to_string(),
            verify_context: "dependency-bot/verify".to_string(),
            owner_updated_requires_verification: true,
        }
    }
}

/// Why a PR is left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Neither authored by the bot nor an owner-updated bot PR
    NotEligible,
    /// The verification status is missing or not successful
    Unverified,
    /// Owner-updated PR whose status is not success
    NotMergeable,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEligible => write!(f, "not a dependency bot PR"),
            Self::Unverified => write!(f, "verification status missing"),
            Self::NotMergeable => write!(f, "status is not success"),
        }
    }
}

/// Classification of one pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Merge it
    AutoMerge,
    /// Supersede it with a PR for the newer version
    NeedsUpdate,
    /// Leave it alone
    Ignore(IgnoreReason),
}

/// How a PR qualified for automation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Eligibility {
    BotAuthored,
    OwnerUpdated,
}

fn eligibility(pr: &PullRequest, owner: &str, policy: &PolicyConfig) -> Option<Eligibility> {
    if pr.author_login == policy.bot_login {
        Some(Eligibility::BotAuthored)
    } else if pr.author_login == owner && pr.labels.contains(&policy.marker_label) {
        Some(Eligibility::OwnerUpdated)
    } else {
        None
    }
}

/// Whether the combined status carries a successful verification context.
///
/// An empty status list counts as unverified.
pub fn is_verified(status: &CombinedStatus, policy: &PolicyConfig) -> bool {
    status
        .statuses
        .iter()
        .any(|s| s.context == policy.verify_context && s.state == StatusState::Success)
}

/// Classify a pull request given its combined status.
///
/// `owner` is the repository owner; a PR authored by the owner that still
/// carries the marker label counts as an owner-updated bot PR.
pub fn classify(
    pr: &PullRequest,
    status: &CombinedStatus,
    owner: &str,
    policy: &PolicyConfig,
) -> Verdict {
    let Some(eligibility) = eligibility(pr, owner, policy) else {
        return Verdict::Ignore(IgnoreReason::NotEligible);
    };

    let needs_verification = match eligibility {
        Eligibility::BotAuthored => true,
        Eligibility::OwnerUpdated => policy.owner_updated_requires_verification,
    };
    if needs_verification && !is_verified(status, policy) {
        return Verdict::Ignore(IgnoreReason::Unverified);
    }

    match (status.state, eligibility) {
        (StatusState::Success, _) => Verdict::AutoMerge,
        (_, Eligibility::BotAuthored) => Verdict::NeedsUpdate,
        (_, Eligibility::OwnerUpdated) => Verdict::Ignore(IgnoreReason::NotMergeable),
    }
}

// =============================================================================
// Update target parsing
// =============================================================================

/// A bot comment or branch reference that could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The bot has not commented on the PR
    #[error("no comment from {0}")]
    NoBotComment(String),
    /// The latest bot comment has no `...<owner>:<ref>)` reference
    #[error("no branch reference for owner '{0}' in bot comment")]
    NoReference(String),
    /// The reference is not valid percent-encoding
    #[error("branch reference '{0}' is not valid URL encoding")]
    Encoding(String),
    /// The branch reference is not `<dependency>-<version>`
    #[error("branch reference '{0}' does not name a dependency and version")]
    BranchShape(String),
}

/// The newer dependency version a stale bot PR should be replaced with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTarget {
    /// Decoded head branch of the replacement PR
    pub branch: String,
    /// Dependency name
    pub dependency: String,
    /// Target version
    pub version: String,
}

impl UpdateTarget {
    /// Title used for the replacement PR
    pub fn title(&self) -> String {
        format!("Update {} to {}", self.dependency, self.version)
    }
}

/// Parse a branch reference like `greenkeeper/lodash-4.17.21`
pub fn parse_update_target(reference: &str) -> Result<UpdateTarget, ParseError> {
    let caps = BRANCH_REF_RE
        .captures(reference)
        .ok_or_else(|| ParseError::BranchShape(reference.to_string()))?;

    Ok(UpdateTarget {
        branch: reference.to_string(),
        dependency: caps["dependency"].to_string(),
        version: caps["version"].to_string(),
    })
}

/// Find the branch reference in the bot's latest comment.
///
/// Looks for the last `...<owner>:<encoded-ref>)` in that comment (the tail
/// of a compare link, `/<owner>:` is accepted too) and URL-decodes the
/// reference.
pub fn find_update_reference(
    comments: &[PrComment],
    owner: &str,
    policy: &PolicyConfig,
) -> Result<String, ParseError> {
    let latest = comments
        .iter()
        .filter(|c| c.author_login == policy.bot_login)
        .max_by_key(|c| c.created_at)
        .ok_or_else(|| ParseError::NoBotComment(policy.bot_login.clone()))?;

    let pattern = format!(r"(?:\.\.\.|/){}:([^)\s]+)\)", regex::escape(owner));
    let re = Regex::new(&pattern).map_err(|_| ParseError::NoReference(owner.to_string()))?;

    let encoded = re
        .captures_iter(&latest.body)
        .last()
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| ParseError::NoReference(owner.to_string()))?
        .as_str();

    urlencoding::decode(encoded)
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| ParseError::Encoding(encoded.to_string()))
}

/// Find and parse the update target from the PR's comments
pub fn resolve_update_target(
    comments: &[PrComment],
    owner: &str,
    policy: &PolicyConfig,
) -> Result<UpdateTarget, ParseError> {
    let reference = find_update_reference(comments, owner, policy)?;
    parse_update_target(&reference)
}
