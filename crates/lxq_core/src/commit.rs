//! Commit metadata and diffs.

use crate::error::{LxqError, Result};
use crate::types::{ChangeKind, CommitRecord, DiffEntry, Signature};
use crate::CommitHash;
use git2::{Delta, Diff, DiffFindOptions, DiffOptions, ErrorCode, Patch, Repository};
use tracing::debug;

/// Reads commit records out of a repository handle.
///
/// Holds no state of its own; obtain one from a [`Snapshot`](crate::Snapshot)
/// so the query runs in the same critical section as the resolution it serves.
pub struct CommitInspector<'r> {
    repo: &'r Repository,
}

impl<'r> CommitInspector<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }

    /// Returns metadata and the diff against the first parent.
    ///
    /// Root commits are diffed against the empty tree. With
    /// `max_diff_entries` set, a larger diff fails with `LimitExceeded`.
    pub fn commit_info(
        &self,
        hash: CommitHash,
        max_diff_entries: Option<usize>,
    ) -> Result<CommitRecord> {
        let commit = match self.repo.find_commit(hash.to_oid()) {
            Ok(commit) => commit,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(LxqError::RevisionNotFound(hash.as_hex()))
            }
            Err(e) => return Err(e.into()),
        };

        let tree = commit.tree()?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };

        let mut opts = DiffOptions::new();
        opts.include_typechange(true);
        let mut diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
        diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

        let deltas = diff.deltas().len();
        if let Some(limit) = max_diff_entries {
            if deltas > limit {
                return Err(LxqError::LimitExceeded {
                    what: "diff entries",
                    path: hash.as_hex(),
                    limit: limit as u64,
                });
            }
        }

        let entries = diff_entries(&diff)?;
        debug!(commit = %hash.short(), deltas, "commit diff collected");

        let record = CommitRecord {
            hash,
            author: signature(&commit.author()),
            committer: signature(&commit.committer()),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            parents: commit.parent_ids().map(CommitHash::from_oid).collect(),
            diff: entries,
        };
        Ok(record)
    }
}

fn diff_entries(diff: &Diff<'_>) -> Result<Vec<DiffEntry>> {
    let mut entries = Vec::with_capacity(diff.deltas().len());

    for (idx, delta) in diff.deltas().enumerate() {
        let old_path = delta.old_file().path().map(|p| p.to_string_lossy().into_owned());
        let new_path = delta.new_file().path().map(|p| p.to_string_lossy().into_owned());

        let change = match delta.status() {
            Delta::Added | Delta::Copied => ChangeKind::Added,
            Delta::Deleted => ChangeKind::Deleted,
            Delta::Renamed => ChangeKind::Renamed,
            _ => ChangeKind::Modified,
        };

        let path = match change {
            ChangeKind::Deleted => old_path.clone().or_else(|| new_path.clone()),
            _ => new_path.clone().or_else(|| old_path.clone()),
        }
        .unwrap_or_default();

        let patch = match Patch::from_diff(diff, idx)? {
            Some(mut patch) => String::from_utf8_lossy(&patch.to_buf()?).into_owned(),
            None => String::new(),
        };

        entries.push(DiffEntry {
            path,
            old_path: (change == ChangeKind::Renamed).then_some(old_path).flatten(),
            change,
            patch,
        });
    }

    Ok(entries)
}

fn signature(sig: &git2::Signature<'_>) -> Signature {
    let when = sig.when();
    Signature {
        name: String::from_utf8_lossy(sig.name_bytes()).into_owned(),
        email: String::from_utf8_lossy(sig.email_bytes()).into_owned(),
        time: when.seconds(),
        offset_minutes: when.offset_minutes(),
    }
}
