//! CLI commands.

pub mod commit;
pub mod ident;
pub mod revisions;
pub mod status;
pub mod tree;

use anyhow::{Context, Result};
use lxq_core::{Config, SnapshotAccessService, CONFIG_FILE};
use std::path::PathBuf;

/// Global options shared by every command.
pub struct Global {
    pub config: Option<PathBuf>,
    pub repo: Option<PathBuf>,
}

impl Global {
    /// Loads the configuration: file, then environment, then flags.
    pub fn config(&self) -> Result<Config> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        let mut config = Config::load(&path)
            .with_context(|| format!("failed to load {}", path.display()))?
            .apply_env();
        if let Some(repo) = &self.repo {
            config.repository.path = Some(repo.clone());
        }
        Ok(config)
    }

    pub fn service(&self) -> Result<SnapshotAccessService> {
        open(&self.config()?)
    }
}

pub fn open(config: &Config) -> Result<SnapshotAccessService> {
    SnapshotAccessService::open(config).context("failed to open snapshot service")
}
