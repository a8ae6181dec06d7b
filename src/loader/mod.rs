//! Package loading.
//!
//! A project root holds its packages under `src/`, so the package `a/b`
//! lives in `<root>/src/a/b` and consists of the source files directly in
//! that directory. This module resolves package identifiers, reads the
//! files, and extracts their comments.

mod comments;

pub use comments::{comment_groups, Language};

use crate::error::LoadError;
use crate::models::{Package, SourceFile};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Suffix expanding a package identifier to every package beneath it.
pub const WILDCARD: &str = "...";

/// Resolves and parses packages for the checker.
pub trait Loader {
    /// Loads exactly one package named by `package` from the project rooted
    /// at `dir`.
    fn load(&self, dir: &Path, package: &str) -> Result<Package, LoadError>;
}

/// Configuration for source-tree loading.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// File extensions to include (e.g., ["go", "rs", "c"])
    pub extensions: Vec<String>,
    /// Names to skip (e.g., ["target", "node_modules"])
    pub excludes: Vec<String>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self::from(&crate::config::LoaderConfig::default())
    }
}

impl From<&crate::config::LoaderConfig> for LoadConfig {
    fn from(config: &crate::config::LoaderConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            excludes: config.excludes.clone(),
        }
    }
}

/// Loads packages from a `src/`-rooted directory tree.
#[derive(Debug, Clone, Default)]
pub struct SourceTreeLoader {
    config: LoadConfig,
}

impl SourceTreeLoader {
    /// Create a new loader.
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Resolve a package identifier to its directory.
    ///
    /// A trailing `/...` expands to every directory under the prefix that
    /// contains source files; the expansion must name exactly one package.
    pub fn resolve(&self, dir: &Path, package: &str) -> Result<PathBuf, LoadError> {
        if !dir.is_dir() {
            return Err(LoadError::MissingRoot(dir.to_path_buf()));
        }
        let root = dir.join("src");

        let prefix = match package.strip_suffix(WILDCARD) {
            Some(prefix) => prefix.trim_end_matches('/'),
            None => {
                let pkg_dir = root.join(package);
                let count = usize::from(pkg_dir.is_dir() && self.has_sources(&pkg_dir)?);
                if count != 1 {
                    return Err(LoadError::PackageCount {
                        pattern: package.to_string(),
                        count,
                    });
                }
                return Ok(pkg_dir);
            }
        };

        let base = root.join(prefix);
        let mut matches = Vec::new();
        if base.is_dir() {
            let walker = WalkDir::new(&base)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| {
                    e.depth() == 0 || !self.is_excluded(&e.file_name().to_string_lossy())
                });

            for entry in walker {
                let entry = entry.map_err(|source| LoadError::Walk {
                    path: base.clone(),
                    source,
                })?;
                if entry.file_type().is_dir() && self.has_sources(entry.path())? {
                    matches.push(entry.into_path());
                }
            }
        }

        debug!("Pattern {} matched {} package(s)", package, matches.len());
        if matches.len() != 1 {
            return Err(LoadError::PackageCount {
                pattern: package.to_string(),
                count: matches.len(),
            });
        }
        Ok(matches.remove(0))
    }

    /// Check if a file matches the configured extensions.
    pub fn matches(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if self.is_excluded(name) {
                return false;
            }
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.config.extensions.iter().any(|e| e == ext)
    }

    /// Check if a name matches exclusion patterns.
    fn is_excluded(&self, name: &str) -> bool {
        // Hidden files
        if name.starts_with('.') {
            return true;
        }

        self.config.excludes.iter().any(|pattern| name == pattern)
    }

    /// Source files directly inside `dir`, sorted by name.
    fn source_files(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let entries = fs::read_dir(dir).map_err(|source| LoadError::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && self.matches(path))
            .collect();
        files.sort();
        Ok(files)
    }

    fn has_sources(&self, dir: &Path) -> Result<bool, LoadError> {
        Ok(!self.source_files(dir)?.is_empty())
    }

    fn parse_file(&self, path: PathBuf) -> Result<SourceFile, LoadError> {
        let content = fs::read_to_string(&path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?;
        let comments = comment_groups(&path, &content)?;
        debug!("{}: {} comment group(s)", path.display(), comments.len());

        Ok(SourceFile {
            path,
            content,
            comments,
        })
    }
}

impl Loader for SourceTreeLoader {
    fn load(&self, dir: &Path, package: &str) -> Result<Package, LoadError> {
        // Positions must be absolute so the sanitizer sees the full path.
        let dir = fs::canonicalize(dir).map_err(|_| LoadError::MissingRoot(dir.to_path_buf()))?;
        let pkg_dir = self.resolve(&dir, package)?;

        let mut files = Vec::new();
        for path in self.source_files(&pkg_dir)? {
            match self.parse_file(path) {
                Ok(file) => files.push(file),
                Err(LoadError::Read { path, source })
                    if source.kind() == std::io::ErrorKind::InvalidData =>
                {
                    warn!("Skipping non-UTF-8 file {}", path.display());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Package {
            id: package.to_string(),
            dir: pkg_dir,
            files,
        })
    }
}
