//! Expectation extraction.
//!
//! Test sources declare the findings they expect with comments of the form
//!
//! ```text
//! x := compute() // want "unused variable"
//! ```
//!
//! The quoted text is a regular expression matched anywhere inside the
//! finding's message. Only one annotation is recognized per comment group.

mod unquote;

pub use unquote::unquote;

use crate::models::{Package, Position};
use crate::report::Reporter;
use crate::sanitize::Sanitizer;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

/// Keyword introducing an annotation.
pub const KEYWORD: &str = "want";

/// Expected findings keyed by sanitized position.
///
/// Entries are removed as findings consume them; whatever is left after
/// reconciliation is the set of unsatisfied expectations, in position order.
#[derive(Debug, Default)]
pub struct ExpectationIndex {
    entries: BTreeMap<Position, Regex>,
}

impl ExpectationIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an expectation, replacing any prior one at the same position.
    pub fn insert(&mut self, position: Position, pattern: Regex) -> Option<Regex> {
        self.entries.insert(position, pattern)
    }

    /// Removes and returns the expectation at `position`.
    pub fn take(&mut self, position: &Position) -> Option<Regex> {
        self.entries.remove(position)
    }

    /// Looks up the expectation at `position` without consuming it.
    pub fn get(&self, position: &Position) -> Option<&Regex> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ExpectationIndex {
    type Item = (Position, Regex);
    type IntoIter = std::collections::btree_map::IntoIter<Position, Regex>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Returns the annotation payload if `text` starts with the `want` keyword.
///
/// The keyword must stand alone: `wanted` is not an annotation, while
/// `want"x"` and a bare `want` are.
fn annotation(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(KEYWORD)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() || c == '"' => Some(rest.trim()),
        Some(_) => None,
    }
}

/// Builds the expectation index for every comment of a package.
///
/// Malformed annotations are reported once each and skipped; they never
/// stop extraction of the remaining comments.
pub fn extract(
    package: &Package,
    sanitizer: &Sanitizer,
    reporter: &mut dyn Reporter,
) -> ExpectationIndex {
    let mut index = ExpectationIndex::new();

    for file in &package.files {
        for group in &file.comments {
            let Some(position) = group.position() else {
                continue;
            };
            let position = sanitizer.sanitized(position);

            let text = group.text();
            let Some(payload) = annotation(&text) else {
                continue;
            };

            let pattern = match unquote(payload) {
                Ok(pattern) => pattern,
                Err(e) => {
                    reporter.report(format_args!("{}: in 'want' comment: {}", position, e));
                    continue;
                }
            };

            let rx = match Regex::new(&pattern) {
                Ok(rx) => rx,
                Err(e) => {
                    reporter.report(format_args!("{}: {}", position, e));
                    continue;
                }
            };

            debug!("Expectation at {}: {:?}", position, rx.as_str());
            if let Some(previous) = index.insert(position.clone(), rx) {
                debug!(
                    "Expectation at {} replaces earlier pattern {:?}",
                    position,
                    previous.as_str()
                );
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Comment, CommentGroup, CommentKind, SourceFile};
    use std::path::PathBuf;

    fn group(raw: &str, line: usize) -> CommentGroup {
        CommentGroup {
            comments: vec![Comment {
                position: Position::new("/tmp/w/src/p/a.go", line),
                kind: if raw.starts_with("/*") {
                    CommentKind::Block
                } else {
                    CommentKind::Line
                },
                raw: raw.to_string(),
            }],
        }
    }

    fn package(groups: Vec<CommentGroup>) -> Package {
        Package {
            id: "p".to_string(),
            dir: PathBuf::from("/tmp/w/src/p"),
            files: vec![SourceFile {
                path: PathBuf::from("/tmp/w/src/p/a.go"),
                content: String::new(),
                comments: groups,
            }],
        }
    }

    fn run(groups: Vec<CommentGroup>) -> (ExpectationIndex, Vec<String>) {
        let mut failures: Vec<String> = Vec::new();
        let index = extract(&package(groups), &Sanitizer::default(), &mut failures);
        (index, failures)
    }

    #[test]
    fn test_annotation_keyword() {
        assert_eq!(annotation(r#"want "x""#), Some(r#""x""#));
        assert_eq!(annotation(r#"want"x""#), Some(r#""x""#));
        assert_eq!(annotation("want"), Some(""));
        assert_eq!(annotation("wanted \"x\""), None);
        assert_eq!(annotation("nothing to see"), None);
    }

    #[test]
    fn test_extracts_sanitized_expectation() {
        let (index, failures) = run(vec![group(r#"// want "unused variable""#, 5)]);
        assert!(failures.is_empty());
        assert_eq!(index.len(), 1);
        let rx = index.get(&Position::new("p/a.go", 5)).unwrap();
        assert_eq!(rx.as_str(), "unused variable");
    }

    #[test]
    fn test_ignores_ordinary_comments() {
        let (index, failures) = run(vec![
            group("// just a note", 1),
            group("/* wanting more */", 2),
        ]);
        assert!(index.is_empty());
        assert!(failures.is_empty());
    }

    #[test]
    fn test_block_comment_annotation() {
        let (index, failures) = run(vec![group(r#"/* want "nil deref" */"#, 9)]);
        assert!(failures.is_empty());
        assert!(index.get(&Position::new("p/a.go", 9)).is_some());
    }

    #[test]
    fn test_unquoted_payload_reports_once() {
        let (index, failures) = run(vec![group("// want foo", 4), group(r#"// want "ok""#, 6)]);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("p/a.go:4: in 'want' comment:"));
        assert_eq!(index.len(), 1);
        assert!(index.get(&Position::new("p/a.go", 6)).is_some());
    }

    #[test]
    fn test_bare_keyword_reports_once() {
        let (index, failures) = run(vec![group("// want", 2)]);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].contains("in 'want' comment"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_bad_regex_reports_once() {
        let (index, failures) = run(vec![group(r#"// want "(unclosed""#, 3)]);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("p/a.go:3: "));
        assert!(index.is_empty());
    }

    #[test]
    fn test_later_annotation_overwrites() {
        let (index, failures) = run(vec![
            group(r#"/* want "first" */"#, 7),
            group(r#"// want "second""#, 7),
        ]);
        assert!(failures.is_empty());
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&Position::new("p/a.go", 7)).unwrap().as_str(), "second");
    }
}
