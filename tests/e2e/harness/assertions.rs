use anyhow::Result;
use lxq_core::{ChangeKind, ErrorKind, SnapshotAccessService};

/// A service call, used by steps that run it and by failure assertions
#[derive(Debug, Clone)]
pub enum Query {
    ReadFile { version: String, path: String },
    List { version: String, path: String, recursive: bool },
    Stat { version: String, path: String },
    Exists { version: String, path: String },
    Commit { version: String },
    Resolve { token: String },
    Lookup { version: String, ident: String, family: String },
}

/// Declarative assertions on service results and working-copy state
pub enum Assertion {
    // Tree contents
    FileContent {
        version: String,
        path: String,
        content: String,
    },
    PathExists {
        version: String,
        path: String,
        exists: bool,
    },
    ListingNames {
        version: String,
        path: String,
        names: Vec<String>,
    },
    StatMatchesListing {
        version: String,
        path: String,
    },

    // History
    ResolvesTo {
        token: String,
        version: String,
    },
    CommitChanges {
        version: String,
        changes: Vec<(String, ChangeKind)>,
    },
    CommitIsRoot {
        version: String,
    },

    // Identifiers
    IdentCounts {
        version: String,
        ident: String,
        family: String,
        counts: [usize; 3],
    },

    // Errors
    Fails {
        query: Query,
        kind: ErrorKind,
    },

    // Working copy
    HeadAt {
        version: String,
    },
    Generation(u64),
    WorkingCopyFile {
        path: String,
        content: String,
    },

    // Concurrency: every (version, path, content) read many times from parallel threads
    ConcurrentReads {
        reads: Vec<(String, String, String)>,
        rounds: usize,
    },

    // Custom
    Custom(Box<dyn Fn(&SnapshotAccessService) -> Result<()> + Send + Sync>),
}

impl std::fmt::Debug for Assertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileContent { version, path, content } => write!(
                f,
                "FileContent {{ version: {:?}, path: {:?}, content: {:?} }}",
                version, path, content
            ),
            Self::PathExists { version, path, exists } => write!(
                f,
                "PathExists {{ version: {:?}, path: {:?}, exists: {} }}",
                version, path, exists
            ),
            Self::ListingNames { version, path, names } => write!(
                f,
                "ListingNames {{ version: {:?}, path: {:?}, names: {:?} }}",
                version, path, names
            ),
            Self::StatMatchesListing { version, path } => {
                write!(f, "StatMatchesListing {{ version: {:?}, path: {:?} }}", version, path)
            }
            Self::ResolvesTo { token, version } => {
                write!(f, "ResolvesTo {{ token: {:?}, version: {:?} }}", token, version)
            }
            Self::CommitChanges { version, changes } => {
                write!(f, "CommitChanges {{ version: {:?}, changes: {:?} }}", version, changes)
            }
            Self::CommitIsRoot { version } => write!(f, "CommitIsRoot({:?})", version),
            Self::IdentCounts {
                version,
                ident,
                family,
                counts,
            } => write!(
                f,
                "IdentCounts {{ version: {:?}, ident: {:?}, family: {:?}, counts: {:?} }}",
                version, ident, family, counts
            ),
            Self::Fails { query, kind } => {
                write!(f, "Fails {{ query: {:?}, kind: {} }}", query, kind)
            }
            Self::HeadAt { version } => write!(f, "HeadAt({:?})", version),
            Self::Generation(n) => write!(f, "Generation({})", n),
            Self::WorkingCopyFile { path, content } => {
                write!(f, "WorkingCopyFile {{ path: {:?}, content: {:?} }}", path, content)
            }
            Self::ConcurrentReads { reads, rounds } => {
                write!(f, "ConcurrentReads {{ reads: {}, rounds: {} }}", reads.len(), rounds)
            }
            Self::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}
