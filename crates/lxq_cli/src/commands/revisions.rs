//! Revision listing and resolution.

use super::Global;
use crate::output::{self, Format};
use anyhow::Result;
use serde::Serialize;

/// List tags.
pub fn tags(global: &Global, format: Format) -> Result<()> {
    let tags = global.service()?.tags()?;
    let message = format!("{} tags", tags.len());
    output::success(format, tags, &message, |t| output::lines_text(t))
}

/// List version names accepted by the other commands.
pub fn versions(global: &Global, format: Format) -> Result<()> {
    let versions = global.service()?.versions()?;
    let message = format!("{} versions", versions.len());
    output::success(format, versions, &message, |v| output::lines_text(v))
}

#[derive(Serialize)]
struct Resolved {
    token: String,
    hash: String,
}

/// Resolve a token to a commit id.
pub fn resolve(global: &Global, format: Format, token: &str) -> Result<()> {
    let revision = global.service()?.resolve(token)?;
    let resolved = Resolved {
        token: revision.token,
        hash: revision.hash.as_hex(),
    };
    let message = format!("{} resolved", resolved.token);
    output::success(format, resolved, &message, |r| r.hash.clone())
}
