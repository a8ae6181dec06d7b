//! Position sanitizing.
//!
//! Packages are usually materialized under a throwaway directory such as
//! `/tmp/.tmpXYZ/src/pkg/a.go`. Stripping everything up to the source-root
//! marker leaves `pkg/a.go`, which is stable across runs. When the project
//! root is known, its own `src/` directory is cut first, so a root that
//! itself sits below some `src/` directory still yields `pkg/a.go`.

use crate::models::Position;
use std::path::Path;

/// Default source-root marker.
pub const DEFAULT_MARKER: &str = "/src/";

/// Strips the ephemeral workspace prefix from positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitizer {
    markers: Vec<String>,
    /// `<project root>/src/`, checked before the markers.
    root: Option<String>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            markers: vec![DEFAULT_MARKER.to_string()],
            root: None,
        }
    }
}

impl Sanitizer {
    /// Create a sanitizer recognizing the given markers.
    ///
    /// Empty markers are ignored; with no usable marker left, the default
    /// `/src/` is used.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let markers: Vec<String> = markers
            .into_iter()
            .map(Into::into)
            .filter(|m| !m.is_empty())
            .collect();

        if markers.is_empty() {
            Self::default()
        } else {
            Self {
                markers,
                root: None,
            }
        }
    }

    /// Returns a copy that strips `<root>/src/` before trying the markers.
    ///
    /// `root` should be absolute and canonical, as the loader's file paths
    /// are.
    pub fn rooted(&self, root: &Path) -> Self {
        let mut prefix = root.join("src").to_string_lossy().into_owned();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self {
            markers: self.markers.clone(),
            root: Some(prefix),
        }
    }

    /// Markers recognized by this sanitizer.
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Returns the sanitized form of a file name.
    ///
    /// Only absolute `/`-separated paths are rewritten, and the result is
    /// always relative, so sanitizing twice changes nothing.
    // TODO: handle `\` separators and drive prefixes for Windows paths.
    pub fn file<'a>(&self, file: &'a str) -> &'a str {
        if !file.starts_with('/') {
            return file;
        }

        if let Some(rest) = self.root.as_deref().and_then(|root| file.strip_prefix(root)) {
            return rest.trim_start_matches('/');
        }

        let cut = self
            .markers
            .iter()
            .filter_map(|marker| {
                file.find(marker.as_str())
                    .filter(|&i| i > 0)
                    .map(|i| (i, i + marker.len()))
            })
            .min_by_key(|&(start, _)| start);

        match cut {
            Some((_, end)) => file[end..].trim_start_matches('/'),
            None => file,
        }
    }

    /// Returns a sanitized copy of a position. The line is never touched.
    pub fn sanitized(&self, position: &Position) -> Position {
        Position::new(self.file(&position.file), position.line)
    }
}
