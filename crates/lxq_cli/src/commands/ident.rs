//! Identifier cross-reference lookup.

use super::Global;
use crate::output::{self, Format};
use anyhow::Result;

/// Look up where `ident` is defined, referenced and documented.
pub fn run(global: &Global, format: Format, version: &str, ident: &str, family: &str) -> Result<()> {
    let lookup = global.service()?.lookup(version, ident, family)?;
    let message = format!(
        "{ident} in {version}: {} definitions, {} references, {} documented",
        lookup.definitions.len(),
        lookup.references.len(),
        lookup.documentation.len()
    );
    output::success(format, lookup, &message, output::lookup_text)
}
