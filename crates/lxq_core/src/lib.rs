//! lxq core library
//!
//! Read access to a tag-and-commit-versioned source tree (a kernel history)
//! through a single shared git working copy:
//! - Revision resolution (tags, commit ids, branches)
//! - Directory listings, file reads and metadata as of any revision
//! - Commit metadata with first-parent diffs
//! - Identifier cross-references from an external index
//!
//! All tree reads go through one [`CheckoutCoordinator`], which serializes
//! revision switches so that concurrent requests for different revisions
//! never observe each other's checkouts.
//!
//! # Quick Start
//!
//! ```no_run
//! use lxq_core::{Config, ListOptions, SnapshotAccessService};
//!
//! let mut config = Config::default();
//! config.repository.path = Some("/srv/linux".into());
//! let service = SnapshotAccessService::open(&config)?;
//!
//! let makefile = service.read_file("v4.10", "/Makefile")?;
//! let kernel = service.list_directory("v4.10", "/kernel", &ListOptions::shallow())?;
//! println!("{} entries", kernel.count());
//!
//! let commit = service.commit_info("v4.10")?;
//! println!("{} {}", commit.hash, commit.summary());
//! # Ok::<(), lxq_core::LxqError>(())
//! ```
//!
//! # Batching reads
//!
//! Each service call takes the coordinator's critical section on its own.
//! Several reads that must see the same checkout can share one:
//!
//! ```no_run
//! # use lxq_core::{Config, SnapshotAccessService};
//! # let service = SnapshotAccessService::open(&Config::default().apply_env())?;
//! let (readme, has_slab) = service.with_snapshot("v4.10", |snap| {
//!     let tree = snap.tree();
//!     Ok((tree.read_file("/README")?, tree.exists("/mm/slab.c", None)?))
//! })?;
//! # Ok::<(), lxq_core::LxqError>(())
//! ```

mod commit;
mod commit_hash;
mod config;
mod coordinator;
mod error;
mod gate;
mod git;
mod http_index;
mod lock;
mod resolver;
mod service;
mod tree;
mod types;
mod xref;

#[cfg(test)]
mod test_support;

pub use commit::CommitInspector;
pub use commit_hash::CommitHash;
pub use config::{
    CheckoutConfig, CommitConfig, Config, IndexConfig, RepositoryConfig, TreeConfig, CONFIG_FILE,
};
pub use coordinator::{CheckoutCoordinator, Snapshot, WorkingCopyState};
pub use error::{ErrorKind, LxqError, Result};
pub use gate::{FifoGate, GatePass};
pub use git::GitBackend;
pub use http_index::ElixirHttpIndex;
pub use lock::{WorkingCopyLock, LOCK_FILE};
pub use resolver::{validate_token, RevisionResolver};
pub use service::SnapshotAccessService;
pub use tree::{ListOptions, TreeReader, TreeWalk, WalkEntry};
pub use types::*;
pub use xref::{
    CrossReferenceIndex, IdentifierQueryGateway, LineSpec, RawLookup, RawOccurrence,
    UnconfiguredIndex,
};
