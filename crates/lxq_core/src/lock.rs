//! Cross-process working-copy lock.

use crate::error::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the lock file inside the git directory.
pub const LOCK_FILE: &str = "lxq.lock";

/// RAII guard for the working-copy lock.
///
/// Holds an exclusive advisory lock on `<git-dir>/lxq.lock` so that separate
/// lxq processes serving the same working copy never switch it concurrently.
/// The lock is released when the guard is dropped; the file itself stays, as
/// removing it would race with the next locker.
pub struct WorkingCopyLock {
    file: File,
    path: PathBuf,
}

impl WorkingCopyLock {
    /// Blocks until the lock in `git_dir` is acquired.
    pub fn acquire(git_dir: &Path) -> Result<Self> {
        let path = git_dir.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            debug!(path = %path.display(), "working copy locked by another process, waiting");
            file.lock_exclusive()?;
        }

        // Record the holder for operators inspecting a stuck lock.
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;
        file.flush()?;

        Ok(Self { file, path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkingCopyLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
