//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::pagination::{self, Page};
use crate::platform::PlatformService;
use crate::types::{
    CombinedStatus, MergePayload, PrComment, PrStateFilter, PullRequest, Repository, ReviewEvent,
    User,
};
use async_trait::async_trait;
use octocrab::{Octocrab, params};
use reqwest::Client;
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Page size requested from every listing endpoint
const PER_PAGE: u8 = 100;

/// Default REST endpoint
const DEFAULT_API_BASE: &str = "https://api.github.com";

// Raw response types for endpoints not modelled by octocrab

#[derive(Deserialize)]
struct OrgMembership {
    organization: OrgRef,
}

#[derive(Deserialize)]
struct OrgRef {
    login: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    /// Token for raw HTTP requests (combined status)
    token: String,
    /// HTTP client for raw requests (combined status)
    http_client: Client,
    /// REST base URL without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a service for github.com, or for a GitHub Enterprise host
    pub fn new(token: &str, host: Option<&str>) -> Result<Self> {
        let api_base = host.map_or_else(
            || DEFAULT_API_BASE.to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        Self::with_api_base(token, &api_base)
    }

    /// Create a service against an explicit REST base URL
    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::Config(format!("Invalid API base '{api_base}': {e}")))?
            .build()
            .map_err(|e| Error::Config(format!("Failed to create GitHub client: {e}")))?;

        let http_client = Client::builder()
            .user_agent("pr-keeper")
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    /// Fetch one page of a combined status through the raw client
    async fn status_page(&self, url: Url) -> Result<Page<CombinedStatus, Url>> {
        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::Remote(format!("Failed to fetch combined status: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Remote(error_message(response).await));
        }

        let next = next_link(response.headers());
        let status: CombinedStatus = response
            .json()
            .await
            .map_err(|e| Error::Remote(format!("Failed to parse combined status: {e}")))?;

        Ok(Page {
            items: vec![status],
            next,
        })
    }
}

/// Fetch the page behind a `next` link
async fn next_page<T: DeserializeOwned>(client: &Octocrab, url: Url) -> Result<octocrab::Page<T>> {
    client
        .get_page::<T>(&Some(url))
        .await?
        .ok_or_else(|| Error::Transport("next page returned no content".to_string()))
}

/// Target of the `rel="next"` entry in a `Link` header
fn next_link(headers: &HeaderMap) -> Option<Url> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == r#"rel="next""#) {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        Url::parse(target).ok()
    })
}

fn into_page<T>(page: octocrab::Page<T>) -> Page<T, Url> {
    Page {
        items: page.items,
        next: page.next,
    }
}

/// Pull the `message` field out of a GitHub error body, if there is one
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ApiErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        head_sha: pr.head.sha.clone(),
        head_ref: pr.head.ref_field.clone(),
        base_ref: pr.base.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        author_login: pr
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_default(),
        labels: pr.labels.iter().flatten().map(|l| l.name.clone()).collect(),
        url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}

fn repo_from_octocrab(repo: &octocrab::models::Repository) -> Repository {
    Repository {
        name: repo.name.clone(),
        owner: repo
            .owner
            .as_ref()
            .map(|o| o.login.clone())
            .unwrap_or_default(),
    }
}

const fn state_param(state: PrStateFilter) -> params::State {
    match state {
        PrStateFilter::Open => params::State::Open,
        PrStateFilter::Closed => params::State::Closed,
        PrStateFilter::All => params::State::All,
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_authenticated_user(&self) -> Result<User> {
        debug!("getting authenticated user");
        let author = self.client.current().user().await?;
        Ok(User {
            login: author.login,
        })
    }

    async fn list_user_organizations(&self) -> Result<Vec<String>> {
        debug!("listing organization memberships");
        let memberships: Vec<OrgMembership> = self
            .client
            .get("/user/memberships/orgs", Some(&[("per_page", PER_PAGE)]))
            .await
            .map_err(|e| Error::from(e).into_transport())?;

        let orgs: Vec<String> = memberships
            .into_iter()
            .map(|m| m.organization.login)
            .collect();
        debug!(count = orgs.len(), "listed organizations");
        Ok(orgs)
    }

    async fn list_repositories_for_user(&self) -> Result<Vec<Repository>> {
        debug!("listing repositories for user");
        let client = &self.client;
        let current = client.current();
        let current = &current;

        let repos = pagination::drain(move |cursor: Option<Url>| async move {
            let page = match cursor {
                None => {
                    current
                        .list_repos_for_authenticated_user()
                        .per_page(PER_PAGE)
                        .send()
                        .await?
                }
                Some(url) => next_page(client, url).await?,
            };
            Ok::<_, Error>(into_page(page))
        })
        .await?;

        let result: Vec<Repository> = repos.iter().map(repo_from_octocrab).collect();
        debug!(count = result.len(), "listed repositories for user");
        Ok(result)
    }

    async fn list_repositories_for_organization(&self, org: &str) -> Result<Vec<Repository>> {
        debug!(org, "listing repositories for organization");
        let client = &self.client;
        let orgs = client.orgs(org);
        let orgs = &orgs;

        let repos = pagination::drain(move |cursor: Option<Url>| async move {
            let page = match cursor {
                None => orgs.list_repos().per_page(PER_PAGE).send().await?,
                Some(url) => next_page(client, url).await?,
            };
            Ok::<_, Error>(into_page(page))
        })
        .await?;

        let result: Vec<Repository> = repos.iter().map(repo_from_octocrab).collect();
        debug!(org, count = result.len(), "listed repositories for organization");
        Ok(result)
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        state: PrStateFilter,
    ) -> Result<Vec<PullRequest>> {
        debug!(owner, repo, %state, "listing pull requests");
        let client = &self.client;
        let pulls = client.pulls(owner, repo);
        let pulls = &pulls;

        let items = pagination::drain(move |cursor: Option<Url>| async move {
            let page = match cursor {
                None => {
                    pulls
                        .list()
                        .state(state_param(state))
                        .sort(params::pulls::Sort::Created)
                        .direction(params::Direction::Ascending)
                        .per_page(PER_PAGE)
                        .send()
                        .await?
                }
                Some(url) => next_page(client, url).await?,
            };
            Ok::<_, Error>(into_page(page))
        })
        .await?;

        let result: Vec<PullRequest> = items.iter().map(pr_from_octocrab).collect();
        debug!(owner, repo, count = result.len(), "listed pull requests");
        Ok(result)
    }

    async fn get_combined_status(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<CombinedStatus> {
        debug!(owner, repo, reference, "getting combined status");
        let first = Url::parse(&format!(
            "{}/repos/{owner}/{repo}/commits/{reference}/status?per_page={PER_PAGE}",
            self.api_base
        ))
        .map_err(|e| Error::Internal(format!("Invalid status URL: {e}")))?;

        let pages = pagination::drain(|cursor: Option<Url>| {
            self.status_page(cursor.unwrap_or_else(|| first.clone()))
        })
        .await?;

        // Every page repeats state and sha; only the statuses differ
        let mut pages = pages.into_iter();
        let mut status = pages
            .next()
            .ok_or_else(|| Error::Transport("combined status returned no pages".to_string()))?;
        for page in pages {
            status.statuses.extend(page.statuses);
        }

        debug!(
            owner,
            repo,
            state = %status.state,
            count = status.statuses.len(),
            "got combined status"
        );
        Ok(status)
    }

    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        sha: &str,
    ) -> Result<MergePayload> {
        debug!(owner, repo, pr_number = number, sha, "merging PR");
        let merge = self
            .client
            .pulls(owner, repo)
            .merge(number)
            .sha(sha)
            .send()
            .await?;

        let payload = MergePayload {
            merged: merge.merged,
            sha: merge.sha,
            message: merge.message,
        };
        debug!(owner, repo, pr_number = number, merged = payload.merged, "merge complete");
        Ok(payload)
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
    ) -> Result<PullRequest> {
        debug!(owner, repo, head, base, "creating PR");
        let pr = self
            .client
            .pulls(owner, repo)
            .create(title, head, base)
            .send()
            .await?;

        let result = pr_from_octocrab(&pr);
        debug!(owner, repo, pr_number = result.number, "created PR");
        Ok(result)
    }

    async fn close_pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        debug!(owner, repo, pr_number = number, "closing PR");
        self.client
            .pulls(owner, repo)
            .update(number)
            .state(params::pulls::State::Closed)
            .send()
            .await?;
        debug!(owner, repo, pr_number = number, "closed PR");
        Ok(())
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        debug!(owner, repo, pr_number = number, ?labels, "adding labels");
        self.client
            .issues(owner, repo)
            .add_labels(number, labels)
            .await?;
        Ok(())
    }

    async fn list_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<PrComment>> {
        debug!(owner, repo, pr_number = number, "listing PR comments");
        let client = &self.client;
        let issues = client.issues(owner, repo);
        let issues = &issues;

        let comments = pagination::drain(move |cursor: Option<Url>| async move {
            let page = match cursor {
                None => {
                    issues
                        .list_comments(number)
                        .per_page(PER_PAGE)
                        .send()
                        .await?
                }
                Some(url) => next_page(client, url).await?,
            };
            Ok::<_, Error>(into_page(page))
        })
        .await?;

        let result: Vec<PrComment> = comments
            .into_iter()
            .map(|c| PrComment {
                id: c.id.0,
                author_login: c.user.login,
                body: c.body.unwrap_or_default(),
                created_at: c.created_at,
            })
            .collect();
        debug!(owner, repo, pr_number = number, count = result.len(), "listed PR comments");
        Ok(result)
    }

    async fn create_review(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        event: ReviewEvent,
        body: Option<&str>,
    ) -> Result<()> {
        debug!(owner, repo, pr_number = number, %event, "creating review");
        let mut payload = serde_json::json!({ "event": event.as_api_str() });
        if let Some(text) = body {
            payload["body"] = serde_json::Value::from(text);
        }

        let _: serde_json::Value = self
            .client
            .post(
                format!("/repos/{owner}/{repo}/pulls/{number}/reviews"),
                Some(&payload),
            )
            .await?;
        debug!(owner, repo, pr_number = number, "created review");
        Ok(())
    }

    async fn request_reviewers(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        reviewers: &[String],
    ) -> Result<()> {
        debug!(owner, repo, pr_number = number, ?reviewers, "requesting reviewers");
        let payload = serde_json::json!({ "reviewers": reviewers });

        let _: serde_json::Value = self
            .client
            .post(
                format!("/repos/{owner}/{repo}/pulls/{number}/requested_reviewers"),
                Some(&payload),
            )
            .await?;
        debug!(owner, repo, pr_number = number, "requested reviewers");
        Ok(())
    }
}
