//! Configuration for the snapshot access service.

use crate::error::{LxqError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "lxq.toml";

/// Comprehensive configuration for lxq.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Working-copy location.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Checkout coordination.
    #[serde(default)]
    pub checkout: CheckoutConfig,

    /// Tree listing and file read limits.
    #[serde(default)]
    pub tree: TreeConfig,

    /// Commit inspection limits.
    #[serde(default)]
    pub commit: CommitConfig,

    /// Cross-reference index connection.
    #[serde(default)]
    pub index: IndexConfig,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| LxqError::ConfigError(format!("failed to read config: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| LxqError::ConfigError(format!("failed to parse config: {}", e)))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| LxqError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| LxqError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Overlays environment variables on top of the loaded values.
    ///
    /// `LXQ_REPO_DIR` (or the older `REPO_DIR`), `LXQ_INDEX_URL` and
    /// `LXQ_INDEX_PROJECT` are honoured.
    pub fn apply_env(mut self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok());
        self
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = non_empty("LXQ_REPO_DIR").or_else(|| non_empty("REPO_DIR")) {
            self.repository.path = Some(PathBuf::from(dir));
        }
        if let Some(url) = non_empty("LXQ_INDEX_URL") {
            self.index.url = Some(url);
        }
        if let Some(project) = non_empty("LXQ_INDEX_PROJECT") {
            self.index.project = project;
        }
    }

    /// Returns the configured working-copy path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when no path was configured.
    pub fn repository_path(&self) -> Result<&Path> {
        self.repository.path.as_deref().ok_or_else(|| {
            LxqError::ConfigError(
                "no repository configured: set repository.path, LXQ_REPO_DIR or --repo".to_string(),
            )
        })
    }
}

/// Working-copy location.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Path to the git working copy served by this instance.
    pub path: Option<PathBuf>,
}

/// Checkout coordination configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Give up waiting for the working copy after this many seconds.
    /// Unset means wait indefinitely (default).
    pub wait_timeout_secs: Option<u64>,

    /// Take an exclusive file lock in the git directory for each critical
    /// section, serializing with other lxq processes (default: true).
    pub process_lock: bool,

    /// Refuse to switch revisions when tracked files have local modifications
    /// (default: false; conflicting modifications always fail the checkout).
    pub refuse_dirty: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: None,
            process_lock: true,
            refuse_dirty: false,
        }
    }
}

impl CheckoutConfig {
    /// Returns the gate wait timeout as a Duration.
    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_secs.map(Duration::from_secs)
    }
}

/// Tree listing and file read limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TreeConfig {
    /// Maximum entries one listing may produce (default: 200000).
    pub max_entries: usize,

    /// Maximum size of a single file read in bytes (default: 16 MiB).
    pub max_file_bytes: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_entries: 200_000,
            max_file_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Commit inspection limits.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CommitConfig {
    /// Maximum changed files in one diff. Unset means unlimited (default).
    pub max_diff_entries: Option<usize>,
}

/// Cross-reference index connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    /// Base URL of the Elixir REST API. Unset disables identifier lookups.
    pub url: Option<String>,

    /// Project name within the index (default: "linux").
    pub project: String,

    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: None,
            project: "linux".to_string(),
            timeout_secs: 30,
        }
    }
}

impl IndexConfig {
    /// Returns the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
