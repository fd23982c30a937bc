//! Commit command - metadata and diff of a revision.

use super::Global;
use crate::output::{self, CommitView, Format};
use anyhow::Result;

/// Show the commit `version` names.
pub fn run(global: &Global, format: Format, version: &str) -> Result<()> {
    let record = global.service()?.commit_info(version)?;
    let message = format!(
        "{} {} ({} files changed)",
        record.hash.short(),
        record.summary(),
        record.diff.len()
    );
    output::success(format, CommitView::from(&record), &message, output::commit_text)
}
