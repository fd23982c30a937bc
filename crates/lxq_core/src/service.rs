//! The public entry point: revision-scoped queries over one working copy.

use crate::commit::CommitInspector;
use crate::config::{CommitConfig, Config};
use crate::coordinator::{CheckoutCoordinator, Snapshot, WorkingCopyState};
use crate::error::Result;
use crate::git::GitBackend;
use crate::http_index::ElixirHttpIndex;
use crate::resolver::RevisionResolver;
use crate::tree::{ListOptions, WalkEntry};
use crate::types::{
    CommitRecord, Family, FileContent, IdentifierLookup, Revision, TreeEntry, TreeEntryKind,
};
use crate::xref::{CrossReferenceIndex, IdentifierQueryGateway, UnconfiguredIndex};
use std::ops::ControlFlow;
use tracing::info;

/// Versioned snapshot access over a single git working copy.
///
/// Every call re-resolves its revision token; tags may move between calls.
/// Calls that read the tree run inside the checkout coordinator's critical
/// section and are therefore serialized with each other.
pub struct SnapshotAccessService {
    resolver: RevisionResolver,
    coordinator: CheckoutCoordinator,
    gateway: IdentifierQueryGateway,
    commit_limits: CommitConfig,
}

impl SnapshotAccessService {
    /// Opens the configured repository and index.
    ///
    /// Without `index.url` identifier lookups fail with `BackendUnavailable`.
    pub fn open(config: &Config) -> Result<Self> {
        let index: Box<dyn CrossReferenceIndex> = match config.index.url {
            Some(_) => Box::new(ElixirHttpIndex::new(&config.index)?),
            None => Box::new(UnconfiguredIndex),
        };
        Self::with_index(config, index)
    }

    /// Opens the configured repository with a caller-supplied index.
    pub fn with_index(config: &Config, index: Box<dyn CrossReferenceIndex>) -> Result<Self> {
        let backend = GitBackend::open(config.repository_path()?)?;
        let resolver = RevisionResolver::new(backend.clone());
        let coordinator =
            CheckoutCoordinator::new(backend, &config.checkout)?.with_tree_limits(&config.tree);
        let gateway = IdentifierQueryGateway::new(index);

        info!(
            workdir = %coordinator.backend().workdir().display(),
            index = gateway.backend(),
            "snapshot service ready"
        );

        Ok(Self {
            resolver,
            coordinator,
            gateway,
            commit_limits: config.commit.clone(),
        })
    }

    pub fn tags(&self) -> Result<Vec<String>> {
        self.resolver.tags()
    }

    pub fn versions(&self) -> Result<Vec<String>> {
        self.resolver.versions()
    }

    pub fn resolve(&self, token: &str) -> Result<Revision> {
        self.resolver.resolve(token)
    }

    /// Lists `path` as of `token`.
    pub fn list_directory(&self, token: &str, path: &str, opts: &ListOptions) -> Result<TreeEntry> {
        self.with_snapshot(token, |snap| snap.tree().list_directory(path, opts))
    }

    /// Feeds the entries under `path` to `visitor` in pre-order until it breaks.
    ///
    /// Returns the number of entries visited.
    pub fn visit_tree<F>(
        &self,
        token: &str,
        path: &str,
        max_depth: Option<usize>,
        mut visitor: F,
    ) -> Result<usize>
    where
        F: FnMut(&WalkEntry) -> ControlFlow<()>,
    {
        self.with_snapshot(token, |snap| {
            let mut visited = 0;
            for entry in snap.tree().walk(path, max_depth)? {
                let entry = entry?;
                visited += 1;
                if visitor(&entry).is_break() {
                    break;
                }
            }
            Ok(visited)
        })
    }

    pub fn read_file(&self, token: &str, path: &str) -> Result<FileContent> {
        self.with_snapshot(token, |snap| snap.tree().read_file(path))
    }

    pub fn stat(&self, token: &str, path: &str) -> Result<TreeEntry> {
        self.with_snapshot(token, |snap| snap.tree().stat(path))
    }

    pub fn exists(&self, token: &str, path: &str, kind: Option<TreeEntryKind>) -> Result<bool> {
        self.with_snapshot(token, |snap| snap.tree().exists(path, kind))
    }

    /// Metadata and first-parent diff of the commit `token` names.
    pub fn commit_info(&self, token: &str) -> Result<CommitRecord> {
        let max_diff_entries = self.commit_limits.max_diff_entries;
        self.with_snapshot(token, |snap| {
            let repo = snap.repository()?;
            CommitInspector::new(&repo).commit_info(snap.revision().hash, max_diff_entries)
        })
    }

    /// Cross-references `identifier` as indexed for `token`.
    ///
    /// `family` must be exactly `"C"` or `"B"`. The token is resolved first
    /// but no checkout happens.
    pub fn lookup(&self, token: &str, identifier: &str, family: &str) -> Result<IdentifierLookup> {
        let family: Family = family.parse()?;
        let revision = self.resolver.resolve(token)?;
        self.gateway.lookup(&revision, identifier, family)
    }

    /// Runs several reads against one materialization of `token`.
    pub fn with_snapshot<T>(
        &self,
        token: &str,
        read: impl FnOnce(&Snapshot<'_>) -> Result<T>,
    ) -> Result<T> {
        let revision = self.resolver.resolve(token)?;
        self.coordinator.with_revision(&revision, read)
    }

    /// What the working copy currently holds.
    pub fn working_copy(&self) -> WorkingCopyState {
        self.coordinator.state()
    }
}
