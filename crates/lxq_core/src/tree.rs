//! Read-only access to a materialized tree.
//!
//! A [`TreeReader`] never checks anything out: it is handed the working-copy
//! root by a [`Snapshot`](crate::Snapshot) whose revision is already on disk.
//!
//! Paths are root-relative. A leading `/` is accepted, `.` and empty segments
//! are ignored and `..` is resolved lexically; anything that would leave the
//! root, lexically or through a symlink, is rejected with `PathEscapesRoot`.
//! The repository's own `.git` directory is not part of the tree.

use crate::config::TreeConfig;
use crate::error::{LxqError, Result};
use crate::types::{EntryMetadata, FileContent, TreeEntry, TreeEntryKind};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

const GIT_DIR: &str = ".git";

/// Options for [`TreeReader::list_directory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Include size, timestamps and mode for every entry.
    pub detailed: bool,
    /// Deepest level to descend to when recursive (the listed directory is 0).
    pub max_depth: Option<usize>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            detailed: true,
            max_depth: None,
        }
    }
}

impl ListOptions {
    /// Immediate children only.
    pub fn shallow() -> Self {
        Self::default()
    }

    /// The whole subtree, optionally bounded in depth.
    pub fn recursive(max_depth: Option<usize>) -> Self {
        Self {
            recursive: true,
            detailed: true,
            max_depth,
        }
    }
}

/// One entry produced by a [`TreeWalk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Depth below the walk's starting directory (which is 0).
    pub depth: usize,
    /// The entry, without children.
    pub entry: TreeEntry,
}

/// Reader over the working copy rooted at a canonical path.
pub struct TreeReader<'a> {
    root: &'a Path,
    limits: TreeConfig,
}

/// A path that has passed normalization and the containment check.
struct Resolved {
    abs: PathBuf,
    rel: String,
    meta: Metadata,
}

impl<'a> TreeReader<'a> {
    /// Creates a reader; `root` must already be canonical.
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            limits: TreeConfig::default(),
        }
    }

    /// Replaces the default size limits.
    pub fn with_limits(mut self, limits: &TreeConfig) -> Self {
        self.limits = limits.clone();
        self
    }

    /// Lists a directory, optionally recursively.
    ///
    /// The result is the directory itself with its listed children. A
    /// recursive listing is as large as the subtree; it fails with
    /// `LimitExceeded` instead of returning a partial tree.
    pub fn list_directory(&self, path: &str, opts: &ListOptions) -> Result<TreeEntry> {
        let max_depth = if opts.recursive { opts.max_depth } else { Some(1) };
        let limit = self.limits.max_entries;

        let mut stack: Vec<(usize, TreeEntry)> = Vec::new();
        let mut count = 0usize;

        for item in self.walk_with(path, max_depth, opts.detailed)? {
            let WalkEntry { depth, mut entry } = item?;

            count += 1;
            if count > limit {
                return Err(LxqError::LimitExceeded {
                    what: "tree entries",
                    path: stack.first().map_or_else(|| path.to_string(), |(_, e)| e.path.clone()),
                    limit: limit as u64,
                });
            }

            if entry.is_dir() && max_depth.map_or(true, |max| depth < max) {
                entry.children = Some(Vec::new());
            }

            while stack.last().is_some_and(|(d, _)| *d >= depth) {
                attach_top(&mut stack);
            }
            stack.push((depth, entry));
        }

        while stack.len() > 1 {
            attach_top(&mut stack);
        }
        stack
            .pop()
            .map(|(_, entry)| entry)
            .ok_or_else(|| LxqError::PathNotFound(path.to_string()))
    }

    /// Walks a directory lazily in pre-order, yielding entries one at a time.
    ///
    /// Stop iterating to bound the cost; `max_depth` bounds it up front.
    pub fn walk(&self, path: &str, max_depth: Option<usize>) -> Result<TreeWalk> {
        self.walk_with(path, max_depth, true)
    }

    /// Reads a whole file.
    pub fn read_file(&self, path: &str) -> Result<FileContent> {
        let resolved = self.resolve(path)?;
        let (target, meta) = self.follow(&resolved)?;

        if meta.is_dir() {
            return Err(LxqError::NotAFile(resolved.rel));
        }
        if meta.len() > self.limits.max_file_bytes {
            return Err(LxqError::LimitExceeded {
                what: "file bytes",
                path: resolved.rel,
                limit: self.limits.max_file_bytes,
            });
        }

        Ok(FileContent::from_bytes(fs::read(target)?))
    }

    /// Returns the entry at `path` with full metadata and no children.
    pub fn stat(&self, path: &str) -> Result<TreeEntry> {
        let resolved = self.resolve(path)?;
        Ok(make_entry(
            entry_name(&resolved.rel),
            resolved.rel,
            &resolved.meta,
            true,
        ))
    }

    /// Returns whether `path` exists, optionally requiring a kind.
    ///
    /// Missing paths are `Ok(false)`; paths escaping the root are still errors.
    pub fn exists(&self, path: &str, kind: Option<TreeEntryKind>) -> Result<bool> {
        match self.resolve(path) {
            Ok(resolved) => {
                let actual = kind_of(resolved.meta.file_type());
                Ok(kind.map_or(true, |k| k == actual))
            }
            Err(LxqError::PathNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn walk_with(&self, path: &str, max_depth: Option<usize>, detailed: bool) -> Result<TreeWalk> {
        let resolved = self.resolve(path)?;
        let (base, meta) = self.follow(&resolved)?;
        if !meta.is_dir() {
            return Err(LxqError::NotADirectory(resolved.rel));
        }

        let skip_git = base == self.root;
        let mut walker = WalkDir::new(&base).follow_links(false);
        if let Some(depth) = max_depth {
            walker = walker.max_depth(depth);
        }
        let inner = walker
            .into_iter()
            .filter_entry(move |e| !(skip_git && e.depth() == 1 && e.file_name() == GIT_DIR));

        Ok(TreeWalk {
            inner: Box::new(inner),
            base,
            base_rel: resolved.rel,
            detailed,
        })
    }

    fn resolve(&self, path: &str) -> Result<Resolved> {
        let parts = normalize(path)?;
        let rel = format!("/{}", parts.join("/"));
        let abs = parts.iter().fold(self.root.to_path_buf(), |p, s| p.join(s));

        let meta = match fs::symlink_metadata(&abs) {
            Ok(meta) => meta,
            Err(e) if is_missing(&e) => return Err(LxqError::PathNotFound(rel)),
            Err(e) => return Err(e.into()),
        };

        // Intermediate components may be symlinks pointing anywhere.
        if let Some(parent) = abs.parent().filter(|_| !parts.is_empty()) {
            self.contain(&parent.canonicalize()?, path, &rel)?;
        }

        Ok(Resolved { abs, rel, meta })
    }

    /// Resolves the final component too, for operations that read through it.
    fn follow(&self, resolved: &Resolved) -> Result<(PathBuf, Metadata)> {
        if !resolved.meta.file_type().is_symlink() {
            return Ok((resolved.abs.clone(), resolved.meta.clone()));
        }
        let target = match resolved.abs.canonicalize() {
            Ok(t) => t,
            Err(e) if is_missing(&e) => return Err(LxqError::PathNotFound(resolved.rel.clone())),
            Err(e) => return Err(e.into()),
        };
        self.contain(&target, &resolved.rel, &resolved.rel)?;
        let meta = fs::metadata(&target)?;
        Ok((target, meta))
    }

    /// Checks that a canonical path lies in the tree proper.
    fn contain(&self, canonical: &Path, path: &str, rel: &str) -> Result<()> {
        if !canonical.starts_with(self.root) {
            return Err(LxqError::PathEscapesRoot(path.to_string()));
        }
        if canonical.starts_with(self.root.join(GIT_DIR)) {
            return Err(LxqError::PathNotFound(rel.to_string()));
        }
        Ok(())
    }
}

/// Lazy pre-order traversal created by [`TreeReader::walk`].
pub struct TreeWalk {
    inner: Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>>>,
    base: PathBuf,
    base_rel: String,
    detailed: bool,
}

impl Iterator for TreeWalk {
    type Item = Result<WalkEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        Some(self.convert(item))
    }
}

impl TreeWalk {
    fn convert(&self, item: walkdir::Result<walkdir::DirEntry>) -> Result<WalkEntry> {
        let dirent = item.map_err(io::Error::from)?;
        let depth = dirent.depth();

        let rel = match dirent.path().strip_prefix(&self.base) {
            Ok(suffix) if depth > 0 => join_rel(&self.base_rel, suffix),
            _ => self.base_rel.clone(),
        };
        let name = if depth == 0 {
            entry_name(&rel)
        } else {
            dirent.file_name().to_string_lossy().into_owned()
        };

        let entry = if self.detailed {
            let meta = dirent.metadata().map_err(io::Error::from)?;
            make_entry(name, rel, &meta, true)
        } else {
            TreeEntry {
                name,
                path: rel,
                kind: kind_of(dirent.file_type()),
                metadata: None,
                children: None,
            }
        };

        Ok(WalkEntry { depth, entry })
    }
}

fn normalize(path: &str) -> Result<Vec<&str>> {
    if path.contains('\0') {
        return Err(LxqError::InvalidArgument(format!(
            "path contains a NUL byte: {path:?}"
        )));
    }

    let mut parts = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(LxqError::PathEscapesRoot(path.to_string()));
                }
            }
            s => parts.push(s),
        }
    }

    if parts.first() == Some(&GIT_DIR) {
        return Err(LxqError::PathNotFound(path.to_string()));
    }
    Ok(parts)
}

/// A missing path, or one that runs through a regular file.
fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn join_rel(base_rel: &str, suffix: &Path) -> String {
    let mut rel = base_rel.trim_end_matches('/').to_string();
    for component in suffix.components() {
        rel.push('/');
        rel.push_str(&component.as_os_str().to_string_lossy());
    }
    rel
}

fn entry_name(rel: &str) -> String {
    match rel.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "/".to_string(),
    }
}

fn attach_top(stack: &mut Vec<(usize, TreeEntry)>) {
    if let Some((_, done)) = stack.pop() {
        if let Some((_, parent)) = stack.last_mut() {
            parent.children.get_or_insert_with(Vec::new).push(done);
        }
    }
}

fn make_entry(name: String, rel: String, meta: &Metadata, detailed: bool) -> TreeEntry {
    TreeEntry {
        name,
        path: rel,
        kind: kind_of(meta.file_type()),
        metadata: detailed.then(|| metadata_of(meta)),
        children: None,
    }
}

fn kind_of(file_type: fs::FileType) -> TreeEntryKind {
    if file_type.is_symlink() {
        TreeEntryKind::Symlink
    } else if file_type.is_dir() {
        TreeEntryKind::Directory
    } else {
        TreeEntryKind::File
    }
}

fn metadata_of(meta: &Metadata) -> EntryMetadata {
    EntryMetadata {
        size: meta.len(),
        created: unix_secs(meta.created()),
        modified: unix_secs(meta.modified()),
        accessed: unix_secs(meta.accessed()),
        mode: mode_of(meta),
    }
}

fn unix_secs(time: io::Result<SystemTime>) -> Option<i64> {
    let time = time.ok()?;
    Some(match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    })
}

#[cfg(unix)]
fn mode_of(meta: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(meta.permissions().mode())
}

#[cfg(not(unix))]
fn mode_of(_meta: &Metadata) -> Option<u32> {
    None
}
