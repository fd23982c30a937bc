//! Tree commands: ls, cat, stat, exists.

use super::Global;
use crate::output::{self, EntryView, Format};
use anyhow::Result;
use lxq_core::{FileContent, ListOptions, TreeEntryKind};
use serde::Serialize;

/// List a directory as of `version`.
pub fn ls(
    global: &Global,
    format: Format,
    version: &str,
    path: &str,
    recursive: bool,
    depth: Option<usize>,
    brief: bool,
) -> Result<()> {
    let opts = ListOptions {
        recursive: recursive || depth.is_some(),
        detailed: !brief,
        max_depth: depth,
    };
    let entry = global.service()?.list_directory(version, path, &opts)?;
    let message = format!("listed {} in {version} ({} entries)", entry.path, entry.count() - 1);
    output::success(format, EntryView::from(&entry), &message, output::tree_text)
}

/// Print a file as of `version`.
pub fn cat(global: &Global, format: Format, version: &str, path: &str) -> Result<()> {
    let content = global.service()?.read_file(version, path)?;
    let message = match &content {
        FileContent::Text(_) => format!("read {path} in {version}"),
        FileContent::Binary(b) => format!("read {path} in {version} ({} bytes, binary)", b.len()),
    };
    output::success(format, content, &message, output::content_text)
}

/// Show metadata of a path as of `version`.
pub fn stat(global: &Global, format: Format, version: &str, path: &str) -> Result<()> {
    let entry = global.service()?.stat(version, path)?;
    let message = format!("{} in {version}", entry.path);
    output::success(format, EntryView::from(&entry), &message, output::stat_text)
}

#[derive(Serialize)]
struct Existence<'a> {
    path: &'a str,
    exists: bool,
}

/// Check whether a path exists as of `version`.
pub fn exists(
    global: &Global,
    format: Format,
    version: &str,
    path: &str,
    kind: Option<TreeEntryKind>,
) -> Result<()> {
    let exists = global.service()?.exists(version, path, kind)?;
    let message = if exists {
        format!("{path} exists in {version}")
    } else {
        format!("{path} does not exist in {version}")
    };
    output::success(format, Existence { path, exists }, &message, |e| e.exists.to_string())
}
