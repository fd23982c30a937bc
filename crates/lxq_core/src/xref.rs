//! Identifier cross-reference lookups.
//!
//! The index is keyed by version, so lookups never need the working copy.
//! Backends return loosely shaped payloads; [`IdentifierQueryGateway`]
//! normalizes them into an [`IdentifierLookup`].

use crate::error::{LxqError, Result};
use crate::types::{Family, IdentifierLookup, IdentifierOccurrence, Revision};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A symbol cross-reference index.
pub trait CrossReferenceIndex: Send + Sync {
    /// Short backend name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Looks up `ident` as indexed for `version`.
    fn query(&self, version: &str, ident: &str, family: Family) -> Result<RawLookup>;
}

/// Occurrence lists keyed by category name, as the index reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawLookup {
    pub categories: BTreeMap<String, Vec<RawOccurrence>>,
}

/// An occurrence before line normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOccurrence {
    pub path: String,
    pub line: LineSpec,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// The line field in the shapes indexes actually produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineSpec {
    One(u32),
    Many(Vec<u32>),
    /// Comma-separated, e.g. `"12,40,41"`.
    Text(String),
}

#[derive(Debug, Clone, Copy)]
enum Category {
    Definitions,
    References,
    Documentation,
}

impl Category {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "definitions" | "definition" | "define" | "defs" => Some(Self::Definitions),
            "references" | "reference" | "refs" => Some(Self::References),
            "documentations" | "documentation" | "document" | "docs" => Some(Self::Documentation),
            _ => None,
        }
    }
}

/// Index used when none is configured; every query fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredIndex;

impl CrossReferenceIndex for UnconfiguredIndex {
    fn name(&self) -> &'static str {
        "index"
    }

    fn query(&self, _version: &str, _ident: &str, _family: Family) -> Result<RawLookup> {
        Err(LxqError::BackendUnavailable {
            backend: self.name(),
            reason: "no cross-reference index configured".to_string(),
        })
    }
}

/// Validates lookups and normalizes index responses.
pub struct IdentifierQueryGateway {
    index: Box<dyn CrossReferenceIndex>,
}

impl IdentifierQueryGateway {
    pub fn new(index: Box<dyn CrossReferenceIndex>) -> Self {
        Self { index }
    }

    /// Name of the backing index.
    pub fn backend(&self) -> &'static str {
        self.index.name()
    }

    /// Returns definitions, references and documentation of `identifier`.
    pub fn lookup(
        &self,
        revision: &Revision,
        identifier: &str,
        family: Family,
    ) -> Result<IdentifierLookup> {
        validate_identifier(identifier)?;

        let raw = self.index.query(&revision.token, identifier, family)?;
        let lookup = normalize(self.index.name(), raw)?;
        debug!(
            revision = %revision,
            identifier,
            %family,
            definitions = lookup.definitions.len(),
            references = lookup.references.len(),
            documentation = lookup.documentation.len(),
            "identifier looked up"
        );
        Ok(lookup)
    }
}

fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(LxqError::InvalidArgument("empty identifier".to_string()));
    }
    if identifier.contains(|c: char| c.is_whitespace() || c == '/' || c.is_control()) {
        return Err(LxqError::InvalidArgument(format!(
            "invalid identifier {identifier:?}"
        )));
    }
    Ok(())
}

fn normalize(backend: &'static str, raw: RawLookup) -> Result<IdentifierLookup> {
    let mut lookup = IdentifierLookup::default();

    for (name, occurrences) in raw.categories {
        let Some(category) = Category::parse(&name) else {
            warn!(backend, category = %name, "dropping unknown index category");
            continue;
        };
        let target = match category {
            Category::Definitions => &mut lookup.definitions,
            Category::References => &mut lookup.references,
            Category::Documentation => &mut lookup.documentation,
        };

        for occurrence in occurrences {
            for line in lines(backend, &occurrence.line)? {
                target.push(IdentifierOccurrence {
                    path: occurrence.path.clone(),
                    line,
                    kind: occurrence.kind.clone(),
                });
            }
        }
    }

    Ok(lookup)
}

fn lines(backend: &'static str, spec: &LineSpec) -> Result<Vec<u32>> {
    match spec {
        LineSpec::One(line) => Ok(vec![*line]),
        LineSpec::Many(lines) => Ok(lines.clone()),
        LineSpec::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse().map_err(|_| LxqError::BackendUnavailable {
                    backend,
                    reason: format!("malformed line number {s:?}"),
                })
            })
            .collect(),
    }
}
