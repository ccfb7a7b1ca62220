//! Read-only commands: auth, whoami, orgs, repos, pulls

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use pr_keeper::auth::{get_github_auth, test_github_auth};
use pr_keeper::error::Result;
use pr_keeper::platform::PlatformService;
use pr_keeper::types::{PrStateFilter, StatusState, parse_repo_slug};

/// Check that credentials are available and accepted
pub async fn run_auth() -> Result<()> {
    let auth = get_github_auth().await?;
    let login = test_github_auth(&auth).await?;

    println!(
        "{} Authenticated as {} (token from {})",
        check(),
        login.accent(),
        auth.source
    );
    if let Some(host) = &auth.host {
        println!("  Host: {}", host.muted());
    }
    Ok(())
}

/// Print the authenticated user's login
pub async fn run_whoami(ctx: &CommandContext) -> Result<()> {
    let user = ctx.platform.get_authenticated_user().await?;
    println!("{}", user.login);
    Ok(())
}

/// List the user's organizations
pub async fn run_orgs(ctx: &CommandContext) -> Result<()> {
    let orgs = ctx.platform.list_user_organizations().await?;
    if orgs.is_empty() {
        println!("{}", "No organization memberships.".muted());
    }
    for org in orgs {
        println!("{org}");
    }
    Ok(())
}

/// List repositories owned by the user or by `org`
pub async fn run_repos(ctx: &CommandContext, org: Option<&str>) -> Result<()> {
    let (owner, repos) = match org {
        Some(org) => (
            org.to_string(),
            ctx.platform.list_repositories_for_organization(org).await?,
        ),
        None => {
            let user = ctx.platform.get_authenticated_user().await?;
            (user.login, ctx.platform.list_repositories_for_user().await?)
        }
    };

    let mut count = 0;
    for repo in repos.iter().filter(|r| r.owner == owner) {
        println!("{}/{}", repo.owner.muted(), repo.name);
        count += 1;
    }
    if count == 0 {
        println!("{}", format!("No repositories owned by {owner}.").muted());
    }
    Ok(())
}

/// List PRs in `slug` with the combined status of each head
pub async fn run_pulls(ctx: &CommandContext, slug: &str, state: PrStateFilter) -> Result<()> {
    let (owner, repo) = parse_repo_slug(slug)?;
    let pulls = ctx
        .platform
        .list_pull_requests_with_status(&owner, &repo, state)
        .await?;

    if pulls.is_empty() {
        println!("{}", format!("No {state} pull requests.").muted());
        return Ok(());
    }

    for entry in &pulls {
        let pr = &entry.pull_request;
        let state = entry.combined_status.state;
        let badge = match state {
            StatusState::Success => state.to_string().success(),
            StatusState::Pending => state.to_string().warn(),
            StatusState::Failure | StatusState::Error => state.to_string().error(),
        };
        println!(
            "{} {} {} {}",
            format!("#{}", pr.number).accent(),
            pr.title,
            format!("({})", pr.author_login).muted(),
            badge
        );
    }
    Ok(())
}
