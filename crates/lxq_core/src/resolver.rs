//! Revision token resolution.

use crate::error::{LxqError, Result};
use crate::git::GitBackend;
use crate::types::Revision;
use tracing::debug;

const FORBIDDEN: &[char] = &['~', '^', ':', '@', '{', '}', '\\', '?', '*', '['];

/// Turns user-supplied tokens into [`Revision`]s.
///
/// Never touches the working copy, so it runs outside the checkout gate and
/// can be called from any number of threads.
#[derive(Debug, Clone)]
pub struct RevisionResolver {
    backend: GitBackend,
}

impl RevisionResolver {
    pub fn new(backend: GitBackend) -> Self {
        Self { backend }
    }

    /// Resolves a tag name, commit id (full or at least 4 hex digits) or branch.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for malformed tokens and revision expressions,
    /// `RevisionNotFound` when nothing matches.
    pub fn resolve(&self, token: &str) -> Result<Revision> {
        validate_token(token)?;
        let hash = self
            .backend
            .lookup(token)?
            .ok_or_else(|| LxqError::RevisionNotFound(token.to_string()))?;

        debug!(token, commit = %hash.short(), "revision resolved");
        Ok(Revision {
            token: token.to_string(),
            hash,
        })
    }

    /// All tag names, sorted by name.
    pub fn tags(&self) -> Result<Vec<String>> {
        self.backend.tag_names()
    }

    /// Version names a caller may pass to [`resolve`](Self::resolve).
    ///
    /// Every tag is a version; branches and commit ids are accepted as
    /// tokens but are not enumerated.
    pub fn versions(&self) -> Result<Vec<String>> {
        self.tags()
    }
}

/// Rejects tokens that are not plain names or hex ids.
///
/// Expressions such as `HEAD~1` or `@{upstream}` depend on the mutable
/// working copy, so they are refused rather than passed to git.
pub fn validate_token(token: &str) -> Result<()> {
    let reason = if token.is_empty() {
        Some("empty revision")
    } else if token.starts_with('-') {
        Some("revision may not start with '-'")
    } else if token.chars().any(char::is_whitespace) {
        Some("revision may not contain whitespace")
    } else if token.contains("..") {
        Some("revision ranges are not supported")
    } else if token.contains(FORBIDDEN) {
        Some("revision expressions are not supported")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(LxqError::InvalidArgument(format!("{reason}: {token:?}"))),
        None => Ok(()),
    }
}
