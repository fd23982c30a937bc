//! Version-control backend.
//!
//! The only module that talks to libgit2 for history queries and checkouts.
//! Every call opens its own `Repository` handle so the backend can be shared
//! across threads without synchronization.

use crate::error::{LxqError, Result};
use crate::CommitHash;
use git2::build::CheckoutBuilder;
use git2::{ErrorClass, ErrorCode, ObjectType, Repository, RepositoryState, StatusOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Handle on a non-bare git repository and its working copy.
#[derive(Debug, Clone)]
pub struct GitBackend {
    workdir: PathBuf,
    git_dir: PathBuf,
}

impl GitBackend {
    /// Opens the repository at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the path is not a git repository or is bare.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|e| {
            LxqError::ConfigError(format!(
                "not a git repository: {} ({})",
                path.display(),
                e.message()
            ))
        })?;

        let workdir = repo.workdir().ok_or_else(|| {
            LxqError::ConfigError(format!(
                "repository at {} is bare; a working copy is required",
                path.display()
            ))
        })?;

        Ok(Self {
            workdir: workdir.canonicalize()?,
            git_dir: repo.path().canonicalize()?,
        })
    }

    /// Canonical root of the working copy.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Canonical `.git` directory.
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Opens a fresh repository handle.
    pub fn repository(&self) -> Result<Repository> {
        Repository::open(&self.workdir).map_err(|e| unavailable(&e))
    }

    /// Lists tag names, sorted by name.
    pub fn tag_names(&self) -> Result<Vec<String>> {
        let repo = self.repository()?;
        let names = repo.tag_names(None)?;
        Ok(names.iter().flatten().map(str::to_string).collect())
    }

    /// Looks up a tag, then a hex commit id, then a branch.
    ///
    /// Returns `Ok(None)` when nothing matches. Never touches the working copy.
    pub fn lookup(&self, token: &str) -> Result<Option<CommitHash>> {
        let repo = self.repository()?;

        if let Some(hash) = peel_reference(&repo, &format!("refs/tags/{token}"), token)? {
            return Ok(Some(hash));
        }

        if is_hex_prefix(token) {
            match repo.revparse_single(token) {
                Ok(obj) => {
                    if let Ok(commit) = obj.peel_to_commit() {
                        return Ok(Some(CommitHash::from_oid(commit.id())));
                    }
                }
                Err(e) if e.code() == ErrorCode::Ambiguous => {
                    return Err(LxqError::InvalidArgument(format!(
                        "abbreviated commit id {token} is ambiguous"
                    )));
                }
                Err(e) if is_missing(&e) => {}
                Err(e) => return Err(e.into()),
            }
        }

        peel_reference(&repo, &format!("refs/heads/{token}"), token)
    }

    /// Returns the commit HEAD points at, or `None` for an unborn HEAD.
    pub fn head(&self) -> Result<Option<CommitHash>> {
        let repo = self.repository()?;
        let result = match repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit()?;
                Ok(Some(CommitHash::from_oid(commit.id())))
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        };
        result
    }

    /// Materializes `hash` in the working copy and detaches HEAD at it.
    ///
    /// Uses a safe checkout: local modifications that conflict with the
    /// target fail the operation instead of being overwritten.
    pub(crate) fn checkout(&self, token: &str, hash: CommitHash, refuse_dirty: bool) -> Result<()> {
        let failed = |reason: String| LxqError::CheckoutFailed {
            revision: token.to_string(),
            reason,
        };

        let repo = self.repository()?;
        if repo.state() != RepositoryState::Clean {
            return Err(failed(format!(
                "repository has an operation in progress ({:?})",
                repo.state()
            )));
        }

        if refuse_dirty && is_dirty(&repo)? {
            return Err(failed("working copy has local modifications".to_string()));
        }

        let commit = repo
            .find_commit(hash.to_oid())
            .map_err(|e| failed(describe(&e)))?;

        let mut opts = CheckoutBuilder::new();
        opts.safe();
        repo.checkout_tree(commit.as_object(), Some(&mut opts))
            .map_err(|e| failed(describe(&e)))?;
        repo.set_head_detached(commit.id())
            .map_err(|e| failed(describe(&e)))?;

        debug!(revision = token, commit = %hash.short(), "working copy switched");
        Ok(())
    }
}

fn peel_reference(repo: &Repository, refname: &str, token: &str) -> Result<Option<CommitHash>> {
    let reference = match repo.find_reference(refname) {
        Ok(r) => r,
        Err(e) if is_missing(&e) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let object = reference.peel(ObjectType::Any)?;
    match object.peel_to_commit() {
        Ok(commit) => Ok(Some(CommitHash::from_oid(commit.id()))),
        Err(_) => Err(LxqError::RevisionNotFound(format!(
            "{token} (points at a {}, not a commit)",
            object.kind().map_or("unknown object", |k| k.str())
        ))),
    }
}

fn is_dirty(repo: &Repository) -> Result<bool> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(false).include_ignored(false);
    Ok(!repo.statuses(Some(&mut opts))?.is_empty())
}

fn is_hex_prefix(token: &str) -> bool {
    (4..=CommitHash::HEX_LEN).contains(&token.len()) && token.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_missing(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::NotFound | ErrorCode::InvalidSpec)
}

fn describe(e: &git2::Error) -> String {
    match (e.code(), e.class()) {
        (ErrorCode::Locked, _) => format!("working copy is locked by another process: {}", e.message()),
        (ErrorCode::Conflict, _) | (_, ErrorClass::Checkout) => {
            format!("local modifications conflict with the target: {}", e.message())
        }
        (ErrorCode::NotFound, _) => format!("commit object missing: {}", e.message()),
        _ => e.message().to_string(),
    }
}

fn unavailable(e: &git2::Error) -> LxqError {
    LxqError::BackendUnavailable {
        backend: "git",
        reason: e.message().to_string(),
    }
}
