//! Status command - what the working copy holds.

use super::Global;
use crate::output::{self, Format};
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct Status {
    workdir: String,
    head: Option<String>,
    generation: u64,
    tags: usize,
}

pub fn run(global: &Global, format: Format) -> Result<()> {
    let config = global.config()?;
    let service = super::open(&config)?;
    let state = service.working_copy();

    let status = Status {
        workdir: config.repository_path()?.display().to_string(),
        head: state.head.map(|h| h.as_hex()),
        generation: state.generation,
        tags: service.tags()?.len(),
    };
    output::success(format, status, "working copy status", |s| {
        format!(
            "workdir:    {}\nhead:       {}\ngeneration: {}\ntags:       {}",
            s.workdir,
            s.head.as_deref().unwrap_or("(unborn)"),
            s.generation,
            s.tags
        )
    })
}
