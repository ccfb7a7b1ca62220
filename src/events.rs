//! Observability events for side-effecting pull request calls
//!
//! Every mutating call made through [`PullRequestActions`] produces a
//! [`PullRequestEvent`] carrying the call's arguments and its outcome. Events
//! are delivered to an injected [`EventSink`]; delivery is synchronous and
//! fire-and-forget, the caller never waits on a consumer.
//!
//! [`PullRequestActions`]: crate::merge::PullRequestActions

use crate::types::{MergePayload, PullRequest, ReviewEvent};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Outcome carried by an event: the call's result, or its error message
pub type Outcome<T> = std::result::Result<T, String>;

/// A side-effecting pull request call and its outcome
#[derive(Debug, Clone)]
pub enum PullRequestEvent {
    /// `pulls:create`
    Create {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// Title of the new PR
        title: String,
        /// Head branch
        head: String,
        /// Base branch
        base: String,
        /// Created PR or error
        result: Outcome<PullRequest>,
    },
    /// `pulls:close`
    Close {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// PR number
        number: u64,
        /// Unit or error
        result: Outcome<()>,
    },
    /// `pulls:merge`
    Merge {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// PR number
        number: u64,
        /// Head SHA the merge was requested for
        sha: String,
        /// Merge payload or error
        result: Outcome<MergePayload>,
    },
    /// `pulls:review`
    Review {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// PR number
        number: u64,
        /// Review verdict
        event: ReviewEvent,
        /// Review body
        body: Option<String>,
        /// Unit or error
        result: Outcome<()>,
    },
    /// `pulls:review:request`
    ReviewRequest {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// PR number
        number: u64,
        /// Requested reviewer logins
        reviewers: Vec<String>,
        /// Unit or error
        result: Outcome<()>,
    },
}

impl PullRequestEvent {
    /// Event name, e.g. `pulls:merge`
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "pulls:create",
            Self::Close { .. } => "pulls:close",
            Self::Merge { .. } => "pulls:merge",
            Self::Review { .. } => "pulls:review",
            Self::ReviewRequest { .. } => "pulls:review:request",
        }
    }

    /// Repository the event belongs to, as `owner/repo`
    pub fn repository(&self) -> String {
        let (owner, repo) = match self {
            Self::Create { owner, repo, .. }
            | Self::Close { owner, repo, .. }
            | Self::Merge { owner, repo, .. }
            | Self::Review { owner, repo, .. }
            | Self::ReviewRequest { owner, repo, .. } => (owner, repo),
        };
        format!("{owner}/{repo}")
    }

    /// Error message if the call failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Create { result, .. } => result.as_ref().err(),
            Self::Merge { result, .. } => result.as_ref().err(),
            Self::Close { result, .. }
            | Self::Review { result, .. }
            | Self::ReviewRequest { result, .. } => result.as_ref().err(),
        }
        .map(String::as_str)
    }
}

/// Receiver of pull request events
///
/// Implementations must not block; they are called inline from the
/// orchestration tasks.
pub trait EventSink: Send + Sync {
    /// Deliver one event
    fn emit(&self, event: PullRequestEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PullRequestEvent) {}
}

/// Logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PullRequestEvent) {
        let name = event.name();
        let repository = event.repository();
        match event.error() {
            Some(error) => warn!(event = name, %repository, error, "pull request call failed"),
            None => info!(event = name, %repository, details = ?event, "pull request call"),
        }
    }
}

/// Forwards every event into an unbounded channel
///
/// Sending never waits. Events emitted after the receiver is dropped are
/// discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<PullRequestEvent>,
}

impl ChannelSink {
    /// Wrap a channel sender
    pub const fn new(sender: UnboundedSender<PullRequestEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: PullRequestEvent) {
        let _ = self.sender.send(event);
    }
}
