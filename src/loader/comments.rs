//! Comment extraction.
//!
//! Files are parsed with tree-sitter, so delimiters inside string, template,
//! character and regex literals never open a comment, and nested block
//! comments stay whole. The comment nodes are then grouped the way Go's
//! parser does: comments join a group when no code separates them and they
//! are at most one line apart. A comment trailing code on its line only
//! groups with further comments on that same line.

use crate::error::LoadError;
use crate::models::{Comment, CommentGroup, CommentKind, Position};
use std::path::Path;
use tracing::warn;
use tree_sitter::{Language as TsLanguage, Node, Parser, Tree};

/// Source languages whose comments can be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    C,
    Cpp,
    Go,
    Java,
    JavaScript,
    TypeScript,
    Tsx,
    Rust,
}

impl Language {
    /// Detect the language from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "c" | "h" => Some(Self::C),
            "cc" | "cpp" | "cxx" | "hh" | "hpp" | "hxx" => Some(Self::Cpp),
            "go" => Some(Self::Go),
            "java" => Some(Self::Java),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            "rs" => Some(Self::Rust),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    fn grammar(self) -> TsLanguage {
        match self {
            Self::C => tree_sitter_c::LANGUAGE.into(),
            Self::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }
}

/// Extracts the comment groups of `source`, positioned in `path`.
pub fn comment_groups(path: &Path, source: &str) -> Result<Vec<CommentGroup>, LoadError> {
    let language =
        Language::from_path(path).ok_or_else(|| LoadError::Unsupported(path.to_path_buf()))?;
    let tree = parse(language, source).map_err(|reason| LoadError::Parse {
        path: path.to_path_buf(),
        reason,
    })?;
    if tree.root_node().has_error() {
        warn!("{}: syntax errors, comments may be incomplete", path.display());
    }

    let file = path.to_string_lossy();
    let mut groups = Vec::new();
    let mut builder = GroupBuilder::default();
    let mut previous_end = 0;

    for node in comment_nodes(&tree) {
        let Ok(text) = node.utf8_text(source.as_bytes()) else {
            continue;
        };
        let raw = text.trim_end_matches(['\r', '\n']);
        let start = node.start_byte();
        let line = node.start_position().row + 1;
        let end_line = line + raw.matches('\n').count();

        if has_code(source, previous_end, start) {
            builder.interrupt();
        }
        let line_start = source
            .get(..start)
            .and_then(|s| s.rfind('\n'))
            .map_or(0, |i| i + 1);
        let after_code = has_code(source, line_start, start);

        let kind = if raw.starts_with("//") {
            CommentKind::Line
        } else {
            CommentKind::Block
        };
        let comment = Comment {
            position: Position::new(&*file, line),
            kind,
            raw: raw.to_string(),
        };
        builder.push(comment, end_line, after_code, &mut groups);
        previous_end = node.end_byte();
    }

    builder.flush(&mut groups);
    Ok(groups)
}

fn parse(language: Language, source: &str) -> Result<Tree, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| e.to_string())?;
    parser
        .parse(source, None)
        .ok_or_else(|| format!("{:?} parser produced no tree", language))
}

/// Comment nodes in document order. Their children (Rust doc markers and
/// the like) are not visited.
fn comment_nodes(tree: &Tree) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut cursor = tree.walk();

    'walk: loop {
        let node = cursor.node();
        if node.kind().ends_with("comment") {
            nodes.push(node);
        } else if cursor.goto_first_child() {
            continue;
        }

        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    nodes
}

fn has_code(source: &str, from: usize, to: usize) -> bool {
    source
        .get(from..to)
        .is_some_and(|s| s.chars().any(|c| !c.is_whitespace()))
}

#[derive(Debug, Default)]
struct GroupBuilder {
    comments: Vec<Comment>,
    end_line: usize,
    trailing: bool,
    interrupted: bool,
}

impl GroupBuilder {
    fn push(
        &mut self,
        comment: Comment,
        end_line: usize,
        after_code: bool,
        groups: &mut Vec<CommentGroup>,
    ) {
        let start = comment.position.line;
        let joins = !self.comments.is_empty()
            && !self.interrupted
            && if self.trailing {
                start == self.end_line
            } else {
                start <= self.end_line + 1
            };

        if !joins {
            self.flush(groups);
            self.trailing = after_code;
        }

        self.comments.push(comment);
        self.end_line = end_line;
        self.interrupted = false;
    }

    fn interrupt(&mut self) {
        self.interrupted = true;
    }

    fn flush(&mut self, groups: &mut Vec<CommentGroup>) {
        if !self.comments.is_empty() {
            groups.push(CommentGroup {
                comments: std::mem::take(&mut self.comments),
            });
        }
    }
}
