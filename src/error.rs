//! Error types for pr-keeper

use crate::merge::ParseError;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by pr-keeper
#[derive(Debug, Error)]
pub enum Error {
    /// A listing or pagination request failed
    #[error("transport error: {0}")]
    Transport(String),

    /// A single remote call failed
    #[error("{0}")]
    Remote(String),

    /// A bot comment or branch reference could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No usable credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// Invalid configuration file or option
    #[error("configuration error: {0}")]
    Config(String),

    /// Repository argument is not `owner/repo`
    #[error("invalid repository '{0}', expected owner/repo")]
    InvalidRepo(String),

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Re-classify an error raised while draining a listing.
    ///
    /// Listing failures are always transport errors, whatever the
    /// underlying call reported.
    #[must_use]
    pub fn into_transport(self) -> Self {
        match self {
            Self::Transport(_) => self,
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            // Prefer the message from GitHub's structured error body
            octocrab::Error::GitHub { source, .. } => Self::Remote(source.message),
            other => Self::Remote(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.to_string())
    }
}
