//! Error types for lxq_core operations.

use std::fmt;
use thiserror::Error;

/// Core error type for snapshot access operations.
///
/// Every variant carries the token, path or identifier that caused it so the
/// caller can report it without extra context.
#[derive(Error, Debug)]
pub enum LxqError {
    /// The revision token names no tag, branch or commit.
    #[error("revision not found: {0}")]
    RevisionNotFound(String),

    /// The path does not exist in the materialized tree.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// The cross-reference index has no data for this version.
    #[error("version {version} is not indexed")]
    NotIndexed {
        /// Version token sent to the index
        version: String,
    },

    /// A caller-supplied argument is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Identifier family is not one of the supported values.
    #[error("invalid identifier family {0:?}: expected \"C\" or \"B\"")]
    InvalidFamily(String),

    /// The path resolves outside the working-copy root.
    #[error("path escapes the tree root: {0}")]
    PathEscapesRoot(String),

    /// Invalid hex string for CommitHash parsing.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// A file operation was applied to a directory.
    #[error("not a file: {0}")]
    NotAFile(String),

    /// A directory operation was applied to a non-directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// The backend refused or failed to check out the revision.
    #[error("checkout of {revision} failed: {reason}")]
    CheckoutFailed {
        /// Requested revision token
        revision: String,
        /// Backend-provided reason
        reason: String,
    },

    /// Checkout reported success but HEAD is not at the requested commit.
    #[error("checkout of {revision} left HEAD at {actual}, expected {expected}")]
    CheckoutUnverified {
        /// Requested revision token
        revision: String,
        /// Requested commit hash
        expected: String,
        /// Observed HEAD after checkout
        actual: String,
    },

    /// Waited too long for the working copy.
    #[error("working copy busy: gave up after {waited_ms}ms in queue")]
    CoordinatorTimeout {
        /// Time spent waiting in milliseconds
        waited_ms: u64,
    },

    /// An external backend could not be reached or answered garbage.
    #[error("{backend} unavailable: {reason}")]
    BackendUnavailable {
        /// Which backend ("cross-reference index", "git")
        backend: &'static str,
        /// Description of the failure
        reason: String,
    },

    /// A listing, file or diff exceeded a configured limit.
    #[error("{what} at {path} exceeds limit of {limit}")]
    LimitExceeded {
        /// What was limited ("tree entries", "file bytes", "diff entries")
        what: &'static str,
        /// Path or revision the limit applied to
        path: String,
        /// The configured limit
        limit: u64,
    },

    /// Unclassified libgit2 error.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Coarse classification of [`LxqError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown revision, path or index entry.
    NotFound,
    /// Malformed family, token, identifier, or a path escaping the root.
    InvalidArgument,
    /// Checkout failed or could not be verified.
    Checkout,
    /// File operation on a directory.
    NotAFile,
    /// Directory operation on a file.
    NotADirectory,
    /// Index or version-control backend unreachable, or coordinator timeout.
    BackendUnavailable,
    /// A configured size limit was hit.
    LimitExceeded,
    /// I/O or configuration problems local to this process.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::Checkout => "checkout",
            Self::NotAFile => "not_a_file",
            Self::NotADirectory => "not_a_directory",
            Self::BackendUnavailable => "backend_unavailable",
            Self::LimitExceeded => "limit_exceeded",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

impl LxqError {
    /// Returns the error kind callers should branch on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RevisionNotFound(_) | Self::PathNotFound(_) | Self::NotIndexed { .. } => {
                ErrorKind::NotFound
            }
            Self::InvalidArgument(_)
            | Self::InvalidFamily(_)
            | Self::PathEscapesRoot(_)
            | Self::InvalidHex(_) => ErrorKind::InvalidArgument,
            Self::CheckoutFailed { .. } | Self::CheckoutUnverified { .. } => ErrorKind::Checkout,
            Self::NotAFile(_) => ErrorKind::NotAFile,
            Self::NotADirectory(_) => ErrorKind::NotADirectory,
            Self::CoordinatorTimeout { .. } | Self::BackendUnavailable { .. } | Self::Git(_) => {
                ErrorKind::BackendUnavailable
            }
            Self::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            Self::Io(_) | Self::ConfigError(_) => ErrorKind::Internal,
        }
    }

    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::RevisionNotFound(_) => Some("Run 'lxq tags' to list the available versions."),
            Self::CheckoutFailed { .. } => Some(
                "Check the working copy with 'git status'; remove local modifications or a stale .git/index.lock.",
            ),
            Self::CheckoutUnverified { .. } => {
                Some("Another process may be switching the working copy. Stop it and retry.")
            }
            Self::CoordinatorTimeout { .. } => {
                Some("Raise checkout.wait_timeout_secs or retry when the service is less busy.")
            }
            Self::BackendUnavailable { .. } => {
                Some("Check index.url in the configuration and that the index server is reachable.")
            }
            Self::LimitExceeded { .. } => {
                Some("Narrow the request (sub-directory, --depth) or raise the limit in the configuration.")
            }
            Self::NotIndexed { .. } => Some("The cross-reference index has not processed this version yet."),
            _ => None,
        }
    }
}

/// Convenience Result type for lxq_core operations.
pub type Result<T> = std::result::Result<T, LxqError>;
