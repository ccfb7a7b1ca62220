//! CLI command implementations

mod actions;
mod context;
mod list;
mod merge;
mod style;

pub use actions::{run_close, run_request_review, run_review};
pub use context::CommandContext;
pub use list::{run_auth, run_orgs, run_pulls, run_repos, run_whoami};
pub use merge::{MergeOptions, run_merge};
