//! lxq CLI - query a versioned kernel source tree.

use anyhow::Result;
use clap::{Parser, Subcommand};
use lxq_core::TreeEntryKind;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod output;

use commands::Global;
use output::Format;

#[derive(Parser)]
#[command(name = "lxq")]
#[command(about = "Versioned snapshot access to a kernel source history", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: ./lxq.toml)
    #[arg(long, global = true, env = "LXQ_CONFIG")]
    config: Option<PathBuf>,
    /// Git working copy to serve (overrides config and LXQ_REPO_DIR)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tags
    Tags,
    /// List versions accepted by the other commands
    Versions,
    /// Resolve a tag, commit id or branch to a commit
    Resolve {
        /// Revision token
        version: String,
    },
    /// List a directory
    Ls {
        /// Revision token
        version: String,
        /// Directory path (root-relative)
        #[arg(default_value = "/")]
        path: String,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
        /// Maximum depth (implies --recursive)
        #[arg(short, long)]
        depth: Option<usize>,
        /// Omit sizes, timestamps and modes
        #[arg(long)]
        brief: bool,
    },
    /// Print a file
    Cat {
        /// Revision token
        version: String,
        /// File path (root-relative)
        path: String,
    },
    /// Show metadata of a path
    Stat {
        /// Revision token
        version: String,
        /// Path (root-relative)
        path: String,
    },
    /// Check whether a path exists
    Exists {
        /// Revision token
        version: String,
        /// Path (root-relative)
        path: String,
        /// Require a kind (file, directory, symlink)
        #[arg(short, long)]
        kind: Option<TreeEntryKind>,
    },
    /// Show commit metadata and diff
    Commit {
        /// Revision token
        version: String,
    },
    /// Look up definitions, references and documentation of an identifier
    Ident {
        /// Revision token
        version: String,
        /// Identifier, e.g. raw_spin_unlock_irq
        ident: String,
        /// C for code identifiers, B for device-tree compatible strings
        #[arg(short, long, default_value = "C")]
        family: String,
    },
    /// Show what the working copy holds
    Status,
}

fn main() -> ExitCode {
    // Initialize tracing subscriber
    // Respects RUST_LOG environment variable (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format;

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::failure(format, &err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let global = Global {
        config: cli.config,
        repo: cli.repo,
    };
    let format = cli.format;

    match cli.command {
        Commands::Tags => commands::revisions::tags(&global, format),
        Commands::Versions => commands::revisions::versions(&global, format),
        Commands::Resolve { version } => commands::revisions::resolve(&global, format, &version),
        Commands::Ls {
            version,
            path,
            recursive,
            depth,
            brief,
        } => commands::tree::ls(&global, format, &version, &path, recursive, depth, brief),
        Commands::Cat { version, path } => commands::tree::cat(&global, format, &version, &path),
        Commands::Stat { version, path } => commands::tree::stat(&global, format, &version, &path),
        Commands::Exists {
            version,
            path,
            kind,
        } => commands::tree::exists(&global, format, &version, &path, kind),
        Commands::Commit { version } => commands::commit::run(&global, format, &version),
        Commands::Ident {
            version,
            ident,
            family,
        } => commands::ident::run(&global, format, &version, &ident, &family),
        Commands::Status => commands::status::run(&global, format),
    }
}
