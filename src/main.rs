//! keeper - bulk pull request automation for GitHub

mod cli;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use cli::{CommandContext, MergeOptions};
use pr_keeper::types::{PrStateFilter, ReviewEvent};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "keeper",
    version,
    about = "Bulk pull request automation for GitHub"
)]
struct Cli {
    /// Path to config file (default: <config dir>/pr-keeper/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check GitHub authentication
    Auth,
    /// Print the authenticated user
    Whoami,
    /// List your organizations
    Orgs,
    /// List repositories you (or an organization) own
    Repos {
        /// Organization to list instead of your own repositories
        #[arg(long)]
        org: Option<String>,
    },
    /// List pull requests with their combined status
    Pulls {
        /// Repository as OWNER/REPO
        repo: String,
        /// Pull request state
        #[arg(long, value_enum, default_value_t = StateArg::Open)]
        state: StateArg,
    },
    /// Merge green dependency-bot PRs and supersede stale ones
    Merge {
        /// Organization to scan instead of your own repositories
        #[arg(long)]
        org: Option<String>,
        /// Repositories processed at once
        #[arg(long)]
        repo_concurrency: Option<usize>,
        /// Pull requests processed at once per repository
        #[arg(long)]
        pull_concurrency: Option<usize>,
        /// Merge owner-updated PRs without the verification status
        #[arg(long)]
        skip_owner_verification: bool,
    },
    /// Close pull requests
    Close {
        /// Repository as OWNER/REPO
        repo: String,
        /// Pull request numbers
        #[arg(required = true)]
        numbers: Vec<u64>,
    },
    /// Review pull requests
    Review {
        /// Repository as OWNER/REPO
        repo: String,
        /// Pull request numbers
        #[arg(required = true)]
        numbers: Vec<u64>,
        #[command(flatten)]
        verdict: ReviewVerdict,
        /// Review body
        #[arg(long)]
        body: Option<String>,
    },
    /// Request reviewers on pull requests
    RequestReview {
        /// Repository as OWNER/REPO
        repo: String,
        /// Pull request numbers
        #[arg(required = true)]
        numbers: Vec<u64>,
        /// Reviewer login (repeatable)
        #[arg(long = "reviewer", required = true)]
        reviewers: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StateArg {
    /// Open pull requests
    Open,
    /// Closed or merged pull requests
    Closed,
    /// Every pull request
    All,
}

impl From<StateArg> for PrStateFilter {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Open => Self::Open,
            StateArg::Closed => Self::Closed,
            StateArg::All => Self::All,
        }
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ReviewVerdict {
    /// Approve the pull requests
    #[arg(long)]
    approve: bool,
    /// Request changes
    #[arg(long)]
    request_changes: bool,
    /// Leave a comment-only review
    #[arg(long)]
    comment: bool,
}

impl ReviewVerdict {
    const fn event(&self) -> ReviewEvent {
        if self.approve {
            ReviewEvent::Approve
        } else if self.request_changes {
            ReviewEvent::RequestChanges
        } else {
            ReviewEvent::Comment
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_new("pr_keeper=debug")?
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("pr_keeper=info"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Auth => cli::run_auth().await?,
        Commands::Whoami => {
            let ctx = CommandContext::new(config_path).await?;
            cli::run_whoami(&ctx).await?;
        }
        Commands::Orgs => {
            let ctx = CommandContext::new(config_path).await?;
            cli::run_orgs(&ctx).await?;
        }
        Commands::Repos { org } => {
            let ctx = CommandContext::new(config_path).await?;
            cli::run_repos(&ctx, org.as_deref()).await?;
        }
        Commands::Pulls { repo, state } => {
            let ctx = CommandContext::new(config_path).await?;
            cli::run_pulls(&ctx, &repo, state.into()).await?;
        }
        Commands::Merge {
            org,
            repo_concurrency,
            pull_concurrency,
            skip_owner_verification,
        } => {
            let ctx = CommandContext::new(config_path).await?;
            let options = MergeOptions {
                org,
                repo_concurrency,
                pull_concurrency,
                skip_owner_verification,
            };
            cli::run_merge(&ctx, options).await?;
        }
        Commands::Close { repo, numbers } => {
            let ctx = CommandContext::new(config_path).await?;
            cli::run_close(&ctx, &repo, &numbers).await?;
        }
        Commands::Review {
            repo,
            numbers,
            verdict,
            body,
        } => {
            let ctx = CommandContext::new(config_path).await?;
            cli::run_review(&ctx, &repo, &numbers, verdict.event(), body.as_deref()).await?;
        }
        Commands::RequestReview {
            repo,
            numbers,
            reviewers,
        } => {
            let ctx = CommandContext::new(config_path).await?;
            cli::run_request_review(&ctx, &repo, &numbers, &reviewers).await?;
        }
    }

    Ok(())
}
