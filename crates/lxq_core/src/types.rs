//! Core data types for lxq.

use crate::error::LxqError;
use crate::CommitHash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A revision token resolved to a commit at a point in time.
///
/// Tags can be force-moved, so a `Revision` is a snapshot of one resolution,
/// not a cached fact about the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// The token as supplied by the caller (tag, branch or hex id).
    pub token: String,
    /// The commit the token named when it was resolved.
    pub hash: CommitHash,
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.token, self.hash.short())
    }
}

/// Kind of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeEntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (reported, never followed by listings).
    Symlink,
}

impl FromStr for TreeEntryKind {
    type Err = LxqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" | "f" => Ok(Self::File),
            "directory" | "dir" | "d" => Ok(Self::Directory),
            "symlink" | "link" | "l" => Ok(Self::Symlink),
            other => Err(LxqError::InvalidArgument(format!(
                "unknown entry kind {other:?}"
            ))),
        }
    }
}

/// Filesystem metadata of a tree entry.
///
/// Timestamps are unix seconds; `None` where the platform does not record them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Size in bytes.
    pub size: u64,
    /// Creation (birth) time.
    pub created: Option<i64>,
    /// Last modification time.
    pub modified: Option<i64>,
    /// Last access time.
    pub accessed: Option<i64>,
    /// Unix permission bits.
    pub mode: Option<u32>,
}

/// A file or directory at a path within a materialized revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Final path component (`/` for the root).
    pub name: String,
    /// Root-relative path starting with `/`.
    pub path: String,
    /// Entry kind.
    pub kind: TreeEntryKind,
    /// Present when the entry was produced by a detailed listing or a stat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntryMetadata>,
    /// Listed children of a directory, in filesystem iteration order.
    /// `None` for files and for directories that were not descended into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeEntry>>,
}

impl TreeEntry {
    /// Returns true for directories.
    pub fn is_dir(&self) -> bool {
        self.kind == TreeEntryKind::Directory
    }

    /// Counts this entry and all listed descendants.
    pub fn count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(TreeEntry::count)
            .sum::<usize>()
    }

    /// Finds a listed descendant by its root-relative path.
    pub fn find(&self, path: &str) -> Option<&TreeEntry> {
        if self.path == path {
            return Some(self);
        }
        self.children
            .iter()
            .flatten()
            .find_map(|child| child.find(path))
    }
}

/// Content of a file read from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "content", rename_all = "snake_case")]
pub enum FileContent {
    /// Valid UTF-8 content.
    Text(String),
    /// Anything else, returned untouched.
    Binary(Vec<u8>),
}

impl FileContent {
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(e) => Self::Binary(e.into_bytes()),
        }
    }

    /// Returns the raw bytes regardless of encoding.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    /// Returns the text, if the content is UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(_) => None,
        }
    }
}

/// Author or committer identity with its timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Unix seconds.
    pub time: i64,
    /// Timezone offset from UTC in minutes.
    pub offset_minutes: i32,
}

/// Kind of change a diff entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// File created.
    Added,
    /// File content or mode changed.
    Modified,
    /// File removed.
    Deleted,
    /// File moved (possibly with edits).
    Renamed,
}

/// One changed file in a commit's diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    /// Path after the change (before it, for deletions).
    pub path: String,
    /// Path before a rename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    /// Kind of change.
    pub change: ChangeKind,
    /// Patch text exactly as generated by the backend.
    pub patch: String,
}

/// Commit metadata plus its diff against the first parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Commit hash.
    pub hash: CommitHash,
    /// Author identity and authored time.
    pub author: Signature,
    /// Committer identity and commit time.
    pub committer: Signature,
    /// Full commit message.
    pub message: String,
    /// Parent hashes, first parent first.
    pub parents: Vec<CommitHash>,
    /// Changes against the first parent, or against the empty tree for a root commit.
    pub diff: Vec<DiffEntry>,
}

impl CommitRecord {
    /// Returns the first line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Returns true if the commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Identifier family understood by the cross-reference index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// General code identifiers.
    C,
    /// Device-tree compatible strings.
    B,
}

impl Family {
    /// Returns the single-letter code sent to the index.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::C => "C",
            Self::B => "B",
        }
    }
}

impl FromStr for Family {
    type Err = LxqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::C),
            "B" => Ok(Self::B),
            other => Err(LxqError::InvalidFamily(other.to_string())),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single place an identifier occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierOccurrence {
    /// File path as reported by the index.
    pub path: String,
    /// Line number.
    pub line: u32,
    /// Occurrence kind (`macro`, `member`, `function`...), absent for plain references.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// The three occurrence categories returned for one identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierLookup {
    /// Where the identifier is defined.
    pub definitions: Vec<IdentifierOccurrence>,
    /// Where it is referenced.
    pub references: Vec<IdentifierOccurrence>,
    /// Where documentation mentions it.
    pub documentation: Vec<IdentifierOccurrence>,
}

impl IdentifierLookup {
    /// Total number of occurrences across all categories.
    pub fn len(&self) -> usize {
        self.definitions.len() + self.references.len() + self.documentation.len()
    }

    /// Returns true if no category has occurrences.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
