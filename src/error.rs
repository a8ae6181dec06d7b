//! Error types for the library.
//!
//! Infrastructure errors never abort a run: the checker reports them
//! through the [`Reporter`](crate::report::Reporter) and moves on to the
//! next package.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to resolve or read a package.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("project directory not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("pattern {pattern:?} expanded to {count} packages, want 1")]
    PackageCount { pattern: String, count: usize },

    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no comment grammar for {}", .0.display())]
    Unsupported(PathBuf),

    #[error("parsing {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("walking {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Failure to run the analysis over a loaded package.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} terminated by signal")]
    Signaled { command: String },

    #[error("{command} exited with status {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("invalid JSON findings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure to interpret a quoted string literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnquoteError {
    #[error("missing quoted pattern")]
    Empty,

    #[error("pattern must be a double-quoted string, found {0:?}")]
    NotQuoted(String),

    #[error("unterminated string literal")]
    Unterminated,

    #[error("unexpected {0:?} inside string literal")]
    Unescaped(char),

    #[error("trailing text after closing quote: {0:?}")]
    Trailing(String),

    #[error("invalid escape sequence \\{0}")]
    InvalidEscape(String),
}

/// Failure to materialize a temporary project tree.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] io::Error),

    #[error("invalid file name {0:?}: must be relative and stay inside the tree")]
    InvalidName(String),

    #[error("writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
