//! Response rendering: the JSON envelope and the text views.

use chrono::{DateTime, FixedOffset, Utc};
use clap::ValueEnum;
use console::style;
use lxq_core::{
    ChangeKind, CommitRecord, EntryMetadata, FileContent, IdentifierLookup, IdentifierOccurrence,
    LxqError, Signature, TreeEntry, TreeEntryKind,
};
use serde::Serialize;

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `{ "data", "message", "status" }` envelope
    Json,
    /// Human-readable text
    Text,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Success,
    Fail,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    data: Option<T>,
    message: &'a str,
    status: Status,
}

#[derive(Serialize)]
struct FailureData {
    kind: String,
    suggestion: Option<&'static str>,
}

/// Prints a successful result.
///
/// `text` renders the data for `--format text`.
pub fn success<T: Serialize>(
    format: Format,
    data: T,
    message: &str,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match format {
        Format::Json => {
            let envelope = Envelope {
                data: Some(data),
                message,
                status: Status::Success,
            };
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Format::Text => {
            let rendered = text(&data);
            if rendered.ends_with('\n') {
                print!("{rendered}");
            } else {
                println!("{rendered}");
            }
        }
    }
    Ok(())
}

/// Prints a failed command.
pub fn failure(format: Format, err: &anyhow::Error) {
    let message = format!("{err:#}");
    let core = err.downcast_ref::<LxqError>();

    match format {
        Format::Json => {
            let envelope = Envelope {
                data: core.map(|e| FailureData {
                    kind: e.kind().to_string(),
                    suggestion: e.recovery_suggestion(),
                }),
                message: &message,
                status: Status::Fail,
            };
            match serde_json::to_string_pretty(&envelope) {
                Ok(json) => println!("{json}"),
                Err(_) => eprintln!("error: {message}"),
            }
        }
        Format::Text => {
            eprintln!("{} {}", style("error:").red().bold(), message);
            if let Some(hint) = core.and_then(LxqError::recovery_suggestion) {
                eprintln!("  {} {}", style("hint:").cyan(), hint);
            }
        }
    }
}

/// Unix seconds as RFC 3339 in UTC.
pub fn rfc3339(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|t| t.to_rfc3339())
}

fn rfc3339_at(secs: i64, offset_minutes: i32) -> String {
    let utc = DateTime::<Utc>::from_timestamp(secs, 0);
    let offset = FixedOffset::east_opt(offset_minutes * 60);
    match (utc, offset) {
        (Some(utc), Some(offset)) => utc.with_timezone(&offset).to_rfc3339(),
        (Some(utc), None) => utc.to_rfc3339(),
        _ => secs.to_string(),
    }
}

// JSON views: the core types with timestamps rendered as dates.

#[derive(Serialize)]
pub struct EntryView {
    name: String,
    path: String,
    kind: TreeEntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<MetadataView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    children: Option<Vec<EntryView>>,
}

#[derive(Serialize)]
struct MetadataView {
    size: u64,
    created: Option<String>,
    modified: Option<String>,
    accessed: Option<String>,
    mode: Option<String>,
}

impl From<&TreeEntry> for EntryView {
    fn from(entry: &TreeEntry) -> Self {
        Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            kind: entry.kind,
            metadata: entry.metadata.as_ref().map(MetadataView::from),
            children: entry
                .children
                .as_ref()
                .map(|children| children.iter().map(EntryView::from).collect()),
        }
    }
}

impl From<&EntryMetadata> for MetadataView {
    fn from(meta: &EntryMetadata) -> Self {
        Self {
            size: meta.size,
            created: meta.created.and_then(rfc3339),
            modified: meta.modified.and_then(rfc3339),
            accessed: meta.accessed.and_then(rfc3339),
            mode: meta.mode.map(|m| format!("{:o}", m)),
        }
    }
}

#[derive(Serialize)]
pub struct CommitView<'a> {
    hash: String,
    author: SignatureView<'a>,
    committer: SignatureView<'a>,
    message: &'a str,
    parents: Vec<String>,
    diff: &'a [lxq_core::DiffEntry],
}

#[derive(Serialize)]
struct SignatureView<'a> {
    name: &'a str,
    email: &'a str,
    date: String,
}

impl<'a> From<&'a Signature> for SignatureView<'a> {
    fn from(sig: &'a Signature) -> Self {
        Self {
            name: &sig.name,
            email: &sig.email,
            date: rfc3339_at(sig.time, sig.offset_minutes),
        }
    }
}

impl<'a> From<&'a CommitRecord> for CommitView<'a> {
    fn from(record: &'a CommitRecord) -> Self {
        Self {
            hash: record.hash.as_hex(),
            author: SignatureView::from(&record.author),
            committer: SignatureView::from(&record.committer),
            message: &record.message,
            parents: record.parents.iter().map(|p| p.as_hex()).collect(),
            diff: &record.diff,
        }
    }
}

// Text views.

/// Renders a listing as an indented tree.
pub fn tree_text(root: &EntryView) -> String {
    let mut out = format!("{}\n", root.path);
    if let Some(children) = &root.children {
        push_children(&mut out, children, "");
    }
    out
}

fn push_children(out: &mut String, children: &[EntryView], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let branch = if last { "└── " } else { "├── " };
        let name = match child.kind {
            TreeEntryKind::Directory => style(format!("{}/", child.name)).blue().bold().to_string(),
            TreeEntryKind::Symlink => style(&child.name).cyan().to_string(),
            TreeEntryKind::File => child.name.clone(),
        };
        let size = child
            .metadata
            .as_ref()
            .filter(|_| child.kind == TreeEntryKind::File)
            .map(|m| format!("  {}", style(format!("({} B)", m.size)).dim()))
            .unwrap_or_default();

        out.push_str(&format!("{prefix}{branch}{name}{size}\n"));
        if let Some(grandchildren) = &child.children {
            let nested = format!("{prefix}{}", if last { "    " } else { "│   " });
            push_children(out, grandchildren, &nested);
        }
    }
}

pub fn stat_text(entry: &EntryView) -> String {
    let mut out = format!("path:     {}\nkind:     {:?}\n", entry.path, entry.kind);
    if let Some(meta) = &entry.metadata {
        let none = || "-".to_string();
        out.push_str(&format!("size:     {}\n", meta.size));
        out.push_str(&format!("mode:     {}\n", meta.mode.clone().unwrap_or_else(none)));
        out.push_str(&format!("created:  {}\n", meta.created.clone().unwrap_or_else(none)));
        out.push_str(&format!("modified: {}\n", meta.modified.clone().unwrap_or_else(none)));
        out.push_str(&format!("accessed: {}\n", meta.accessed.clone().unwrap_or_else(none)));
    }
    out
}

pub fn content_text(content: &FileContent) -> String {
    match content {
        FileContent::Text(text) => text.clone(),
        FileContent::Binary(bytes) => format!("<binary content, {} bytes>", bytes.len()),
    }
}

pub fn commit_text(view: &CommitView<'_>) -> String {
    let mut out = format!("{} {}\n", style("commit").yellow(), style(&view.hash).yellow());
    if view.parents.len() > 1 {
        out.push_str(&format!("Merge: {}\n", view.parents.join(" ")));
    }
    out.push_str(&format!(
        "Author: {} <{}>\nDate:   {}\n\n",
        view.author.name, view.author.email, view.author.date
    ));
    for line in view.message.lines() {
        out.push_str(&format!("    {line}\n"));
    }
    out.push('\n');

    for entry in view.diff {
        let label = match entry.change {
            ChangeKind::Added => style("added").green(),
            ChangeKind::Modified => style("modified").yellow(),
            ChangeKind::Deleted => style("deleted").red(),
            ChangeKind::Renamed => style("renamed").cyan(),
        };
        match &entry.old_path {
            Some(old) => out.push_str(&format!("{label}: {old} -> {}\n", entry.path)),
            None => out.push_str(&format!("{label}: {}\n", entry.path)),
        }
    }
    for entry in view.diff {
        out.push('\n');
        out.push_str(&entry.patch);
    }
    out
}

pub fn lookup_text(lookup: &IdentifierLookup) -> String {
    let mut out = String::new();
    for (title, occurrences) in [
        ("definitions", &lookup.definitions),
        ("references", &lookup.references),
        ("documentation", &lookup.documentation),
    ] {
        out.push_str(&format!("{} ({})\n", style(title).bold(), occurrences.len()));
        for IdentifierOccurrence { path, line, kind } in occurrences {
            match kind {
                Some(kind) => out.push_str(&format!("  {path}:{line}  {}\n", style(kind).dim())),
                None => out.push_str(&format!("  {path}:{line}\n")),
            }
        }
    }
    out
}

pub fn lines_text(lines: &[String]) -> String {
    lines.join("\n")
}
