//! Merge command - merge or supersede dependency-bot PRs across repositories

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, cross, spinner_style};
use anstream::println;
use indicatif::ProgressBar;
use pr_keeper::error::Result;
use pr_keeper::events::TracingSink;
use pr_keeper::merge::{OrchestratorContext, merge_eligible_pull_requests};
use pr_keeper::types::{BatchSummary, Scope};
use std::time::Duration;

/// Options for the merge command
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Organization to scan instead of the user's own repositories
    pub org: Option<String>,
    /// Override for repository fan-out
    pub repo_concurrency: Option<usize>,
    /// Override for per-repository PR fan-out
    pub pull_concurrency: Option<usize>,
    /// Merge owner-updated PRs without the verification status
    pub skip_owner_verification: bool,
}

/// Run the merge command
pub async fn run_merge(ctx: &CommandContext, options: MergeOptions) -> Result<()> {
    let concurrency = ctx
        .config
        .concurrency_options(options.repo_concurrency, options.pull_concurrency)?;

    let mut policy = ctx.config.policy.clone();
    if options.skip_owner_verification {
        policy.owner_updated_requires_verification = false;
    }

    let scope = options.org.map_or(Scope::User, Scope::Organization);
    let orchestrator = OrchestratorContext {
        platform: &ctx.platform,
        sink: &TracingSink,
        concurrency,
        policy,
    };

    let target = match &scope {
        Scope::User => "your repositories".to_string(),
        Scope::Organization(org) => org.clone(),
    };
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Scanning {}...", target.emphasis()));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = merge_eligible_pull_requests(&orchestrator, &scope).await;
    spinner.finish_and_clear();

    print_summary(&result?);
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    println!(
        "{} {} repositories, {} open PR(s)",
        "Scanned".emphasis(),
        summary.available_repos,
        summary.opened_pulls
    );

    if summary.merged_pulls.is_empty() && summary.updated_pulls.is_empty() {
        println!("{}", "No dependency PRs ready to merge or update.".muted());
        return;
    }

    if !summary.merged_pulls.is_empty() {
        println!();
        println!("{}:", "Merged".emphasis());
        for merge in &summary.merged_pulls {
            let name = format!("{}/{}#{}", merge.owner, merge.repo, merge.number);
            if merge.success {
                println!("  {} {} {}", check(), name.accent(), merge.url.muted());
            } else {
                let error = merge.error.as_deref().unwrap_or("unknown error");
                println!("  {} {}: {}", cross(), name.accent(), error.warn());
            }
        }
    }

    if !summary.updated_pulls.is_empty() {
        println!();
        println!("{}:", "Superseded".emphasis());
        for update in &summary.updated_pulls {
            let name = format!("{}/{}#{}", update.owner, update.repo, update.original_number);
            match (update.is_success(), update.replacement_number) {
                (true, Some(replacement)) => {
                    println!("  {} {} → #{replacement}", check(), name.accent());
                }
                _ => {
                    let error = update.error.as_deref().unwrap_or("unknown error");
                    println!("  {} {}: {}", cross(), name.accent(), error.warn());
                }
            }
        }
    }

    println!();
    let superseded = summary
        .updated_pulls
        .iter()
        .filter(|u| u.is_success())
        .count();
    let failures = summary.failure_count() + summary.updated_pulls.len() - superseded;
    let line = format!(
        "{} merged, {superseded} superseded, {failures} failed",
        summary.merge_count()
    );
    if failures == 0 {
        println!("{}", line.success());
    } else {
        println!("{}", line.warn());
    }
}
