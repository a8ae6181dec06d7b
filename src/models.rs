//! Data models for the expectation checker.
//!
//! This module contains the core data structures shared by the loader,
//! the analyzer, and the reconciliation engine: positions, findings,
//! comments, and loaded packages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A source location reduced to file and line.
///
/// Column information is never kept: only file and line participate in
/// matching findings to expectations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// File name, absolute as produced by the loader or sanitized.
    pub file: String,
    /// Line number (1-indexed).
    pub line: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A diagnostic reported by the analysis under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Where the analysis reported the finding.
    pub position: Position,
    /// Human-readable message.
    pub message: String,
}

impl Finding {
    /// Creates a new finding.
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Kind of comment delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...` running to the end of the line.
    Line,
    /// `/* ... */`, possibly spanning several lines.
    Block,
}

/// A single comment as it appears in source, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Position of the opening delimiter.
    pub position: Position,
    /// Line or block comment.
    pub kind: CommentKind,
    /// Raw comment text including delimiters.
    pub raw: String,
}

impl Comment {
    /// Returns the comment body with delimiters removed.
    pub fn body(&self) -> &str {
        match self.kind {
            CommentKind::Line => self.raw.strip_prefix("//").unwrap_or(&self.raw),
            CommentKind::Block => {
                let inner = self.raw.strip_prefix("/*").unwrap_or(&self.raw);
                inner.strip_suffix("*/").unwrap_or(inner)
            }
        }
    }
}

/// Adjacent comments with no code and no blank line between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentGroup {
    /// Comments in source order. Never empty.
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    /// Position of the group, which is that of its first comment.
    pub fn position(&self) -> Option<&Position> {
        self.comments.first().map(|c| &c.position)
    }

    /// Renders the group's text.
    ///
    /// Delimiters are removed, each line is stripped of leading indentation
    /// and trailing whitespace, lines are joined with `\n`, and the result is
    /// trimmed.
    pub fn text(&self) -> String {
        let lines: Vec<&str> = self
            .comments
            .iter()
            .flat_map(|c| c.body().lines())
            .map(str::trim)
            .collect();

        lines.join("\n").trim().to_string()
    }
}

/// A parsed source file belonging to a package.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Full file content.
    pub content: String,
    /// Comment groups in source order.
    pub comments: Vec<CommentGroup>,
}

/// A resolved package: one directory of source files.
#[derive(Debug, Clone)]
pub struct Package {
    /// Identifier the package was requested by.
    pub id: String,
    /// Absolute directory of the package.
    pub dir: PathBuf,
    /// Files of the package, sorted by path.
    pub files: Vec<SourceFile>,
}
