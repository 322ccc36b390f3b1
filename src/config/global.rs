//! Global starter configuration.
//!
//! The file lives at `~/.starter/config.toml` (`%LOCALAPPDATA%\starter\config.toml`
//! on Windows). The `STARTER_CONFIG` environment variable or the `--config`
//! flag point at a different file. A missing file is not an error; it loads
//! as the default configuration, which has no template sources.
//!
//! # Format
//!
//! ```toml
//! [packs.rails]
//! repository = "https://raw.githubusercontent.com/example/stencils-rails/{branch}/"
//! branch = "master"
//! github_url = "https://github.com/example/stencils-rails.git"
//!
//! [packs.node]
//! repository = "~/src/stencils-node"
//!
//! [fetch]
//! max_attempts = 3
//! initial_delay_ms = 200
//! max_delay_ms = 2000
//! timeout_secs = 30
//! ```
//!
//! A pack's `repository` is the base location its `templates.json` and
//! `stencils/` folder are fetched from. `{branch}` inside it is replaced by
//! the pack's branch when fetching over HTTP.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants::{
    DEFAULT_BRANCH, DEFAULT_FETCH_ATTEMPTS, DEFAULT_FETCH_INITIAL_DELAY_MS,
    DEFAULT_FETCH_MAX_DELAY_MS, DEFAULT_FETCH_TIMEOUT,
};
use crate::utils::path::{is_remote, resolve_path, with_trailing_slash};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "STARTER_CONFIG";

/// Global configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarterConfig {
    /// Template source per project pack, keyed by pack name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub packs: BTreeMap<String, TemplateSource>,

    /// Remote fetch behaviour.
    #[serde(default)]
    pub fetch: FetchSettings,
}

/// Where the templates for one pack come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSource {
    /// Base location of the template repository.
    pub repository: String,

    /// Branch recorded in the manifest and substituted for `{branch}`.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Repository URL recorded as the base template's `repo`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl TemplateSource {
    /// A source with the default branch and no GitHub URL.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            branch: default_branch(),
            github_url: None,
        }
    }

    /// The repository as a base location ending in `/`.
    ///
    /// Local paths have `~` and environment variables expanded.
    pub fn resolved_repository(&self) -> Result<String> {
        if is_remote(&self.repository) {
            return Ok(with_trailing_slash(&self.repository));
        }

        let local = self.repository.strip_prefix("file://").unwrap_or(&self.repository);
        let path = resolve_path(local)
            .with_context(|| format!("Invalid template repository path: {}", self.repository))?;
        Ok(with_trailing_slash(&path.to_string_lossy()))
    }

    /// The URL recorded in the manifest: `github_url` or the repository itself.
    #[must_use]
    pub fn manifest_repo(&self) -> &str {
        self.github_url.as_deref().unwrap_or(&self.repository)
    }
}

/// Retry and timeout settings for remote fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Attempts per file, including the first.
    pub max_attempts: usize,
    /// First retry delay in milliseconds.
    pub initial_delay_ms: u64,
    /// Upper bound on any retry delay in milliseconds.
    pub max_delay_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_FETCH_ATTEMPTS,
            initial_delay_ms: DEFAULT_FETCH_INITIAL_DELAY_MS,
            max_delay_ms: DEFAULT_FETCH_MAX_DELAY_MS,
            timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
        }
    }
}

impl FetchSettings {
    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Upper bound on any retry delay.
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl StarterConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields the default configuration.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file, which must exist.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read starter config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse starter config from {}", path.display()))
    }

    /// Write as pretty TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize starter config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write starter config to {}", path.display()))
    }

    /// The default config location, honouring `STARTER_CONFIG`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return resolve_path(&path);
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("starter")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".starter")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// The template source configured for `pack`.
    #[must_use]
    pub fn pack(&self, pack: &str) -> Option<&TemplateSource> {
        self.packs.get(pack)
    }

    /// Example configuration written by `starter config init`.
    #[must_use]
    pub fn init_example() -> Self {
        let mut packs = BTreeMap::new();
        packs.insert(
            "rails".to_string(),
            TemplateSource {
                repository: "https://raw.githubusercontent.com/example/stencils-rails/{branch}/"
                    .to_string(),
                branch: default_branch(),
                github_url: Some("https://github.com/example/stencils-rails.git".to_string()),
            },
        );

        Self {
            packs,
            fetch: FetchSettings::default(),
        }
    }
}
