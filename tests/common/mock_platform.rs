//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use pr_keeper::error::{Error, Result};
use pr_keeper::platform::PlatformService;
use pr_keeper::types::{
    CombinedStatus, MergePayload, PrComment, PrStateFilter, PullRequest, Repository, ReviewEvent,
    User,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Call record for `merge_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub sha: String,
}

/// Call record for `create_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub owner: String,
    pub repo: String,
    pub title: String,
    pub head: String,
    pub base: String,
}

/// Call record for `add_labels`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLabelsCall {
    pub number: u64,
    pub labels: Vec<String>,
}

/// Call record for `create_review`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCall {
    pub number: u64,
    pub event: ReviewEvent,
    pub body: Option<String>,
}

/// Call record for `request_reviewers`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestReviewersCall {
    pub number: u64,
    pub reviewers: Vec<String>,
}

/// Simple mock platform service for testing
///
/// Hand-written rather than generated so canned responses and call records
/// stay readable in assertions.
///
/// Features:
/// - Canned repositories, pull requests, statuses and comments
/// - Auto-incrementing numbers for created PRs
/// - Call tracking for verification
/// - Error injection per repository, SHA or PR number
/// - In-flight tracking of status fetches, for concurrency bounds
pub struct MockPlatformService {
    login: String,
    next_pr_number: AtomicU64,
    // Canned responses
    orgs: Mutex<Vec<String>>,
    user_repos: Mutex<Vec<Repository>>,
    org_repos: Mutex<HashMap<String, Vec<Repository>>>,
    pulls: Mutex<HashMap<String, Vec<PullRequest>>>,
    statuses: Mutex<HashMap<String, CombinedStatus>>,
    comments: Mutex<HashMap<u64, Vec<PrComment>>>,
    merge_responses: Mutex<HashMap<u64, MergePayload>>,
    status_yields: AtomicUsize,
    // Call tracking
    list_pulls_calls: Mutex<Vec<String>>,
    status_calls: Mutex<Vec<String>>,
    list_comments_calls: Mutex<Vec<u64>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    close_calls: Mutex<Vec<u64>>,
    add_labels_calls: Mutex<Vec<AddLabelsCall>>,
    review_calls: Mutex<Vec<ReviewCall>>,
    request_reviewers_calls: Mutex<Vec<RequestReviewersCall>>,
    // In-flight status fetches
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    // Error injection
    error_on_user: Mutex<Option<String>>,
    error_on_list_repos: Mutex<Option<String>>,
    error_on_list_pulls: Mutex<HashMap<String, String>>,
    error_on_status: Mutex<HashMap<String, String>>,
    error_on_list_comments: Mutex<HashMap<u64, String>>,
    error_on_merge: Mutex<HashMap<u64, String>>,
    error_on_create_pr: Mutex<Option<String>>,
    error_on_add_labels: Mutex<Option<String>>,
    error_on_close: Mutex<HashMap<u64, String>>,
    error_on_review: Mutex<HashMap<u64, String>>,
}

fn slug(owner: &str, repo: &str) -> String {
    format!("{owner}/{repo}")
}

impl MockPlatformService {
    /// Create a mock authenticated as `login`
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            next_pr_number: AtomicU64::new(100),
            orgs: Mutex::new(Vec::new()),
            user_repos: Mutex::new(Vec::new()),
            org_repos: Mutex::new(HashMap::new()),
            pulls: Mutex::new(HashMap::new()),
            statuses: Mutex::new(HashMap::new()),
            comments: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            status_yields: AtomicUsize::new(0),
            list_pulls_calls: Mutex::new(Vec::new()),
            status_calls: Mutex::new(Vec::new()),
            list_comments_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            close_calls: Mutex::new(Vec::new()),
            add_labels_calls: Mutex::new(Vec::new()),
            review_calls: Mutex::new(Vec::new()),
            request_reviewers_calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            error_on_user: Mutex::new(None),
            error_on_list_repos: Mutex::new(None),
            error_on_list_pulls: Mutex::new(HashMap::new()),
            error_on_status: Mutex::new(HashMap::new()),
            error_on_list_comments: Mutex::new(HashMap::new()),
            error_on_merge: Mutex::new(HashMap::new()),
            error_on_create_pr: Mutex::new(None),
            error_on_add_labels: Mutex::new(None),
            error_on_close: Mutex::new(HashMap::new()),
            error_on_review: Mutex::new(HashMap::new()),
        }
    }

    // === Canned responses ===

    /// Set the organizations returned by `list_user_organizations`
    pub fn set_orgs(&self, orgs: &[&str]) {
        *self.orgs.lock().unwrap() = orgs.iter().map(ToString::to_string).collect();
    }

    /// Add a repository to the user's listing
    pub fn add_user_repo(&self, owner: &str, name: &str) {
        self.user_repos.lock().unwrap().push(Repository {
            name: name.to_string(),
            owner: owner.to_string(),
        });
    }

    /// Add a repository to an organization's listing
    pub fn add_org_repo(&self, org: &str, owner: &str, name: &str) {
        self.org_repos
            .lock()
            .unwrap()
            .entry(org.to_string())
            .or_default()
            .push(Repository {
                name: name.to_string(),
                owner: owner.to_string(),
            });
    }

    /// Add an open pull request to `owner/repo`
    pub fn add_pull(&self, owner: &str, repo: &str, pr: PullRequest) {
        self.pulls
            .lock()
            .unwrap()
            .entry(slug(owner, repo))
            .or_default()
            .push(pr);
    }

    /// Set the combined status for a head SHA
    pub fn set_status(&self, sha: &str, status: CombinedStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(sha.to_string(), status);
    }

    /// Set the comments on a PR
    pub fn set_comments(&self, number: u64, comments: Vec<PrComment>) {
        self.comments.lock().unwrap().insert(number, comments);
    }

    /// Set the payload returned when merging a PR
    pub fn set_merge_response(&self, number: u64, payload: MergePayload) {
        self.merge_responses.lock().unwrap().insert(number, payload);
    }

    /// Make every status fetch yield `yields` times before answering
    pub fn set_status_yields(&self, yields: usize) {
        self.status_yields.store(yields, Ordering::SeqCst);
    }

    // === Error injection methods ===

    /// Make `get_authenticated_user` return an error
    pub fn fail_user(&self, msg: &str) {
        *self.error_on_user.lock().unwrap() = Some(msg.to_string());
    }

    /// Make repository listings return an error
    pub fn fail_list_repos(&self, msg: &str) {
        *self.error_on_list_repos.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_pull_requests` fail for `owner/repo`
    pub fn fail_list_pulls(&self, owner: &str, repo: &str, msg: &str) {
        self.error_on_list_pulls
            .lock()
            .unwrap()
            .insert(slug(owner, repo), msg.to_string());
    }

    /// Make `get_combined_status` fail for a SHA
    pub fn fail_status(&self, sha: &str, msg: &str) {
        self.error_on_status
            .lock()
            .unwrap()
            .insert(sha.to_string(), msg.to_string());
    }

    /// Make `list_comments` fail for a PR
    pub fn fail_list_comments(&self, number: u64, msg: &str) {
        self.error_on_list_comments
            .lock()
            .unwrap()
            .insert(number, msg.to_string());
    }

    /// Make `merge_pull_request` fail for a PR
    pub fn fail_merge(&self, number: u64, msg: &str) {
        self.error_on_merge
            .lock()
            .unwrap()
            .insert(number, msg.to_string());
    }

    /// Make `create_pull_request` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `add_labels` return an error
    pub fn fail_add_labels(&self, msg: &str) {
        *self.error_on_add_labels.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `close_pull_request` fail for a PR
    pub fn fail_close(&self, number: u64, msg: &str) {
        self.error_on_close
            .lock()
            .unwrap()
            .insert(number, msg.to_string());
    }

    /// Make `create_review` fail for a PR
    pub fn fail_review(&self, number: u64, msg: &str) {
        self.error_on_review
            .lock()
            .unwrap()
            .insert(number, msg.to_string());
    }

    // === Call tracking ===

    pub fn get_list_pulls_calls(&self) -> Vec<String> {
        self.list_pulls_calls.lock().unwrap().clone()
    }

    pub fn get_status_calls(&self) -> Vec<String> {
        self.status_calls.lock().unwrap().clone()
    }

    pub fn get_list_comments_calls(&self) -> Vec<u64> {
        self.list_comments_calls.lock().unwrap().clone()
    }

    pub fn get_merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    pub fn get_close_calls(&self) -> Vec<u64> {
        self.close_calls.lock().unwrap().clone()
    }

    pub fn get_add_labels_calls(&self) -> Vec<AddLabelsCall> {
        self.add_labels_calls.lock().unwrap().clone()
    }

    pub fn get_review_calls(&self) -> Vec<ReviewCall> {
        self.review_calls.lock().unwrap().clone()
    }

    pub fn get_request_reviewers_calls(&self) -> Vec<RequestReviewersCall> {
        self.request_reviewers_calls.lock().unwrap().clone()
    }

    /// Most status fetches observed in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Number of calls that change remote state
    pub fn mutating_call_count(&self) -> usize {
        self.merge_calls.lock().unwrap().len()
            + self.create_pr_calls.lock().unwrap().len()
            + self.close_calls.lock().unwrap().len()
            + self.add_labels_calls.lock().unwrap().len()
            + self.review_calls.lock().unwrap().len()
            + self.request_reviewers_calls.lock().unwrap().len()
    }

    pub fn assert_merge_called(&self, number: u64, sha: &str) {
        let calls = self.get_merge_calls();
        assert!(
            calls.iter().any(|c| c.number == number && c.sha == sha),
            "Expected merge of #{number} at {sha}, got: {calls:?}"
        );
    }

    pub fn assert_merge_not_called(&self, number: u64) {
        let calls = self.get_merge_calls();
        assert!(
            !calls.iter().any(|c| c.number == number),
            "Expected no merge of #{number}, got: {calls:?}"
        );
    }

    pub fn assert_create_pr_called(&self, title: &str, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls
                .iter()
                .any(|c| c.title == title && c.head == head && c.base == base),
            "Expected create_pull_request('{title}', {head} -> {base}), got: {calls:?}"
        );
    }

    pub fn assert_closed(&self, number: u64) {
        let calls = self.get_close_calls();
        assert!(
            calls.contains(&number),
            "Expected #{number} to be closed, got: {calls:?}"
        );
    }

    pub fn assert_no_mutating_calls(&self) {
        assert_eq!(
            self.mutating_call_count(),
            0,
            "Expected no mutating calls, got merges {:?}, creates {:?}, closes {:?}",
            self.get_merge_calls(),
            self.get_create_pr_calls(),
            self.get_close_calls()
        );
    }

    fn repos_result(&self, repos: Vec<Repository>) -> Result<Vec<Repository>> {
        if let Some(msg) = self.error_on_list_repos.lock().unwrap().as_ref() {
            return Err(Error::Transport(msg.clone()));
        }
        Ok(repos)
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_authenticated_user(&self) -> Result<User> {
        if let Some(msg) = self.error_on_user.lock().unwrap().as_ref() {
            return Err(Error::Remote(msg.clone()));
        }
        Ok(User {
            login: self.login.clone(),
        })
    }

    async fn list_user_organizations(&self) -> Result<Vec<String>> {
        Ok(self.orgs.lock().unwrap().clone())
    }

    async fn list_repositories_for_user(&self) -> Result<Vec<Repository>> {
        let repos = self.user_repos.lock().unwrap().clone();
        self.repos_result(repos)
    }

    async fn list_repositories_for_organization(&self, org: &str) -> Result<Vec<Repository>> {
        let repos = self
            .org_repos
            .lock()
            .unwrap()
            .get(org)
            .cloned()
            .unwrap_or_default();
        self.repos_result(repos)
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        _state: PrStateFilter,
    ) -> Result<Vec<PullRequest>> {
        let key = slug(owner, repo);
        self.list_pulls_calls.lock().unwrap().push(key.clone());

        if let Some(msg) = self.error_on_list_pulls.lock().unwrap().get(&key) {
            return Err(Error::Transport(msg.clone()));
        }
        Ok(self
            .pulls
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_combined_status(
        &self,
        _owner: &str,
        _repo: &str,
        reference: &str,
    ) -> Result<CombinedStatus> {
        self.status_calls
            .lock()
            .unwrap()
            .push(reference.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        for _ in 0..self.status_yields.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(msg) = self.error_on_status.lock().unwrap().get(reference) {
            return Err(Error::Remote(msg.clone()));
        }
        self.statuses
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::Remote(format!("No commit found for SHA: {reference}")))
    }

    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        sha: &str,
    ) -> Result<MergePayload> {
        self.merge_calls.lock().unwrap().push(MergeCall {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
            sha: sha.to_string(),
        });

        if let Some(msg) = self.error_on_merge.lock().unwrap().get(&number) {
            return Err(Error::Remote(msg.clone()));
        }
        Ok(self
            .merge_responses
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .unwrap_or_else(|| MergePayload {
                merged: true,
                sha: Some(format!("merge-{sha}")),
                message: Some("Pull Request successfully merged".to_string()),
            }))
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            owner: owner.to_string(),
            repo: repo.to_string(),
            title: title.to_string(),
            head: head.to_string(),
            base: base.to_string(),
        });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::Remote(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            head_sha: format!("sha-{number}"),
            head_ref: head.to_string(),
            base_ref: base.to_string(),
            title: title.to_string(),
            author_login: self.login.clone(),
            labels: BTreeSet::new(),
            url: format!("https://github.com/{owner}/{repo}/pull/{number}"),
        })
    }

    async fn close_pull_request(&self, _owner: &str, _repo: &str, number: u64) -> Result<()> {
        self.close_calls.lock().unwrap().push(number);

        if let Some(msg) = self.error_on_close.lock().unwrap().get(&number) {
            return Err(Error::Remote(msg.clone()));
        }
        Ok(())
    }

    async fn add_labels(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        self.add_labels_calls.lock().unwrap().push(AddLabelsCall {
            number,
            labels: labels.to_vec(),
        });

        if let Some(msg) = self.error_on_add_labels.lock().unwrap().as_ref() {
            return Err(Error::Remote(msg.clone()));
        }
        Ok(())
    }

    async fn list_comments(&self, _owner: &str, _repo: &str, number: u64) -> Result<Vec<PrComment>> {
        self.list_comments_calls.lock().unwrap().push(number);

        if let Some(msg) = self.error_on_list_comments.lock().unwrap().get(&number) {
            return Err(Error::Transport(msg.clone()));
        }
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_review(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        event: ReviewEvent,
        body: Option<&str>,
    ) -> Result<()> {
        self.review_calls.lock().unwrap().push(ReviewCall {
            number,
            event,
            body: body.map(ToString::to_string),
        });

        if let Some(msg) = self.error_on_review.lock().unwrap().get(&number) {
            return Err(Error::Remote(msg.clone()));
        }
        Ok(())
    }

    async fn request_reviewers(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
        reviewers: &[String],
    ) -> Result<()> {
        self.request_reviewers_calls
            .lock()
            .unwrap()
            .push(RequestReviewersCall {
                number,
                reviewers: reviewers.to_vec(),
            });
        Ok(())
    }
}
