//! Serialized access to the single shared working copy.

use crate::config::{CheckoutConfig, TreeConfig};
use crate::error::{LxqError, Result};
use crate::gate::FifoGate;
use crate::git::GitBackend;
use crate::lock::WorkingCopyLock;
use crate::tree::TreeReader;
use crate::types::Revision;
use crate::CommitHash;
use git2::Repository;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// What the coordinator believes the working copy holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingCopyState {
    /// Commit currently checked out; `None` for an unborn HEAD.
    pub head: Option<CommitHash>,
    /// Incremented on every successful checkout and every detected external change.
    pub generation: u64,
}

/// Owner of the working copy and sole writer of on-disk tree state.
///
/// Every revision-scoped read runs inside [`CheckoutCoordinator::with_revision`],
/// which holds one critical section across "check out if needed" and "run the
/// read". Requests are admitted in arrival order.
///
/// The section is deliberately coarse: while one read runs, every other
/// revision-scoped request waits, even for the revision already checked out.
/// A long recursive listing or large file read therefore delays everyone
/// queued behind it.
///
/// Nothing outside the coordinator can switch the working copy:
///
/// ```compile_fail
/// # use lxq_core::{CheckoutCoordinator, CommitHash};
/// fn switch_directly(coordinator: &CheckoutCoordinator, hash: CommitHash) {
///     let _ = coordinator.backend().checkout("v4.10", hash, false);
/// }
/// ```
///
/// ```compile_fail
/// # use lxq_core::{CommitHash, GitBackend};
/// fn switch_directly(backend: &GitBackend, hash: CommitHash) {
///     let _ = backend.checkout("v4.10", hash, false);
/// }
/// ```
pub struct CheckoutCoordinator {
    backend: GitBackend,
    gate: FifoGate,
    state: Mutex<WorkingCopyState>,
    process_lock: bool,
    refuse_dirty: bool,
    tree_limits: TreeConfig,
}

impl CheckoutCoordinator {
    /// Takes ownership of the working copy, recording its current HEAD.
    pub fn new(backend: GitBackend, config: &CheckoutConfig) -> Result<Self> {
        let head = backend.head()?;
        info!(
            workdir = %backend.workdir().display(),
            head = ?head,
            "working copy attached"
        );

        Ok(Self {
            backend,
            gate: FifoGate::new(config.wait_timeout()),
            state: Mutex::new(WorkingCopyState {
                head,
                generation: 0,
            }),
            process_lock: config.process_lock,
            refuse_dirty: config.refuse_dirty,
            tree_limits: TreeConfig::default(),
        })
    }

    /// Sets the limits applied by every snapshot's [`TreeReader`].
    pub fn with_tree_limits(mut self, limits: &TreeConfig) -> Self {
        self.tree_limits = limits.clone();
        self
    }

    /// Returns the recorded working-copy state without waiting for the gate.
    pub fn state(&self) -> WorkingCopyState {
        *self.state.lock()
    }

    /// Number of requests waiting for the working copy.
    pub fn queued(&self) -> usize {
        self.gate.queued()
    }

    /// The version-control backend behind this working copy.
    pub(crate) fn backend(&self) -> &GitBackend {
        &self.backend
    }

    /// Materializes `revision` and runs `read` against it.
    ///
    /// No other checkout can start until `read` returns. If the working copy
    /// is already at `revision.hash` no checkout is performed.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutFailed`/`CheckoutUnverified` when the switch fails (the
    /// read is not run), `CoordinatorTimeout` when the gate wait is bounded
    /// and expires, or whatever `read` returns.
    pub fn with_revision<T>(
        &self,
        revision: &Revision,
        read: impl FnOnce(&Snapshot<'_>) -> Result<T>,
    ) -> Result<T> {
        let _pass = self.gate.enter()?;
        let _lock = if self.process_lock {
            Some(WorkingCopyLock::acquire(self.backend.git_dir())?)
        } else {
            None
        };

        // The gate makes this the only writer; `state` is locked only to
        // publish, never across git I/O.
        self.reconcile()?;
        let recorded = self.state();
        let generation = if recorded.head == Some(revision.hash) {
            debug!(revision = %revision, generation = recorded.generation, "already checked out");
            recorded.generation
        } else {
            self.switch(recorded.head, revision)?
        };

        let snapshot = Snapshot {
            backend: &self.backend,
            revision,
            generation,
            tree_limits: &self.tree_limits,
        };
        read(&snapshot)
    }

    /// Aligns the recorded state with the real HEAD.
    fn reconcile(&self) -> Result<()> {
        let actual = self.backend.head()?;
        let mut state = self.state.lock();
        if actual != state.head {
            warn!(
                recorded = ?state.head,
                actual = ?actual,
                "working copy changed outside the coordinator"
            );
            state.head = actual;
            state.generation += 1;
        }
        Ok(())
    }

    /// Checks out `revision` and returns the new generation.
    fn switch(&self, from: Option<CommitHash>, revision: &Revision) -> Result<u64> {
        info!(
            revision = %revision,
            from = ?from,
            "checking out"
        );

        let outcome = self
            .backend
            .checkout(&revision.token, revision.hash, self.refuse_dirty)
            .and_then(|()| self.verify(revision));

        match outcome {
            Ok(()) => {
                let mut state = self.state.lock();
                state.head = Some(revision.hash);
                state.generation += 1;
                Ok(state.generation)
            }
            Err(err) => {
                warn!(revision = %revision, error = %err, "checkout failed");
                // Do not assume the failed checkout left HEAD alone.
                if let Err(reconcile_err) = self.reconcile() {
                    warn!(error = %reconcile_err, "could not re-read HEAD after failed checkout");
                }
                Err(err)
            }
        }
    }

    fn verify(&self, revision: &Revision) -> Result<()> {
        let actual = self.backend.head()?;
        if actual == Some(revision.hash) {
            return Ok(());
        }
        Err(LxqError::CheckoutUnverified {
            revision: revision.token.clone(),
            expected: revision.hash.as_hex(),
            actual: actual.map_or_else(|| "unborn".to_string(), |h| h.as_hex()),
        })
    }
}

/// The working copy as of one revision, valid for the duration of a read.
pub struct Snapshot<'a> {
    backend: &'a GitBackend,
    revision: &'a Revision,
    generation: u64,
    tree_limits: &'a TreeConfig,
}

impl<'a> Snapshot<'a> {
    /// The revision materialized on disk.
    pub fn revision(&self) -> &Revision {
        self.revision
    }

    /// Working-copy generation this snapshot was taken at.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Canonical root of the materialized tree.
    pub fn root(&self) -> &Path {
        self.backend.workdir()
    }

    /// Reader over the materialized tree.
    pub fn tree(&self) -> TreeReader<'a> {
        TreeReader::new(self.backend.workdir()).with_limits(self.tree_limits)
    }

    /// Opens a repository handle for history queries.
    pub fn repository(&self) -> Result<Repository> {
        self.backend.repository()
    }
}
