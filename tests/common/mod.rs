//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::*;

use chrono::{TimeZone, Utc};
use pr_keeper::events::{EventSink, PullRequestEvent};
use pr_keeper::types::{CombinedStatus, CommitStatus, PrComment, PullRequest, StatusState};
use std::collections::BTreeSet;
use std::sync::Mutex;

pub const BOT: &str = "greenkeeper[bot]";
pub const VERIFY_CONTEXT: &str = "dependency-bot/verify";

/// Open PR with the given author and labels
pub fn make_pr(number: u64, sha: &str, author: &str, labels: &[&str]) -> PullRequest {
    PullRequest {
        number,
        head_sha: sha.to_string(),
        head_ref: format!("greenkeeper/dep-{number}.0.0"),
        base_ref: "master".to_string(),
        title: format!("Update dep to {number}.0.0"),
        author_login: author.to_string(),
        labels: labels
            .iter()
            .map(ToString::to_string)
            .collect::<BTreeSet<_>>(),
        url: format!("https://github.com/acme/widgets/pull/{number}"),
    }
}

/// PR authored by the dependency bot
pub fn bot_pr(number: u64, sha: &str) -> PullRequest {
    make_pr(number, sha, BOT, &["greenkeeper"])
}

/// Combined status with a CI context, plus a successful verification
/// context when `verified`
pub fn make_status(sha: &str, state: StatusState, verified: bool) -> CombinedStatus {
    let mut statuses = vec![CommitStatus {
        context: "ci/travis".to_string(),
        state,
    }];
    if verified {
        statuses.push(CommitStatus {
            context: VERIFY_CONTEXT.to_string(),
            state: StatusState::Success,
        });
    }
    CombinedStatus {
        sha: sha.to_string(),
        state,
        statuses,
    }
}

/// Comment posted at 12:`minute` on a fixed day
pub fn make_comment(id: u64, author: &str, body: &str, minute: u32) -> PrComment {
    PrComment {
        id,
        author_login: author.to_string(),
        body: body.to_string(),
        created_at: Utc.with_ymd_and_hms(2017, 6, 1, 12, minute, 0).unwrap(),
    }
}

/// Event sink that keeps every event for inspection
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PullRequestEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<PullRequestEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(PullRequestEvent::name)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: PullRequestEvent) {
        self.events.lock().unwrap().push(event);
    }
}
