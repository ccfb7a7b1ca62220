//! User configuration in `<config_dir>/pr-keeper/config.toml`.

use crate::error::{Error, Result};
use crate::merge::PolicyConfig;
use crate::types::ConcurrencyOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config directory.
const CONFIG_DIR: &str = "pr-keeper";

/// Filename for the configuration.
const CONFIG_FILE: &str = "config.toml";

/// Fan-out bounds as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencySection {
    /// Repositories processed at once
    pub repos: usize,
    /// Pull requests processed at once per repository
    pub pulls: usize,
}

impl Default for ConcurrencySection {
    fn default() -> Self {
        let defaults = ConcurrencyOptions::default();
        Self {
            repos: defaults.repo_concurrency.get(),
            pulls: defaults.pull_concurrency.get(),
        }
    }
}

/// Contents of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dependency-bot policy
    pub policy: PolicyConfig,
    /// Fan-out bounds
    pub concurrency: ConcurrencySection,
}

impl Config {
    /// Resolve concurrency bounds, letting explicit values override the file.
    ///
    /// Zero from either source is a configuration error.
    pub fn concurrency_options(
        &self,
        repos: Option<usize>,
        pulls: Option<usize>,
    ) -> Result<ConcurrencyOptions> {
        ConcurrencyOptions::new(
            repos.unwrap_or(self.concurrency.repos),
            pulls.unwrap_or(self.concurrency.pulls),
        )
    }
}

/// Default location of the config file, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Load the config from `path`, or from the default location.
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path.map(Path::to_path_buf).or_else(default_config_path) else {
        return Ok(Config::default());
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    // Zero bounds are invalid
    config.concurrency_options(None, None)?;

    Ok(config)
}
