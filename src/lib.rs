//! pr-keeper: bulk pull request automation for GitHub
//!
//! Scans the repositories of a user or organization and acts on open
//! dependency-update bot pull requests: green ones are merged, stale ones are
//! superseded by a PR for the newer version the bot announced. Also provides
//! bulk close, review and review-request actions.
//!
//! # Layout
//!
//! - [`platform`] - GitHub API surface (`PlatformService`) and its octocrab implementation
//! - [`merge`] - decision policy, evented PR actions, bulk orchestration
//! - [`batch`] - bounded-concurrency task runner
//! - [`pagination`] - cursor-driven page accumulation
//! - [`events`] - PR call events and sinks
//! - [`auth`] / [`config`] - credentials and user configuration

pub mod auth;
pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod merge;
pub mod pagination;
pub mod platform;
pub mod types;

pub use error::{Error, Result};
