//! Temporary project trees.
//!
//! Tests often describe a package inline as a map of file names to
//! contents. [`write_files`] materializes such a map under a fresh
//! temporary directory, laid out so the loader can resolve packages by
//! their path below `src/`.

use crate::error::WorkspaceError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// A materialized project tree. Dropping it removes the tree.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Root of the project, suitable as the loader's `dir`.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding the packages.
    pub fn src(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    /// Remove the tree now, reporting any failure.
    pub fn cleanup(self) -> std::io::Result<()> {
        debug!("Cleaning up workspace: {}", self.dir.path().display());
        self.dir.close()
    }

    /// Persist the tree and return its path, e.g. to inspect a failing test.
    pub fn keep(self) -> PathBuf {
        let path = self.dir.path().to_path_buf();
        let _ = self.dir.keep();
        info!("Keeping workspace at: {}", path.display());
        path
    }
}

/// File map accepted by [`write_files`].
pub trait FileMap {
    fn entries(&self) -> Vec<(&str, &str)>;
}

impl<K: AsRef<str>, V: AsRef<str>> FileMap for BTreeMap<K, V> {
    fn entries(&self) -> Vec<(&str, &str)> {
        self.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect()
    }
}

impl<K: AsRef<str>, V: AsRef<str>, S> FileMap for HashMap<K, V, S> {
    fn entries(&self) -> Vec<(&str, &str)> {
        self.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FileMap for [(K, V)] {
    fn entries(&self) -> Vec<(&str, &str)> {
        self.iter().map(|(k, v)| (k.as_ref(), v.as_ref())).collect()
    }
}

/// Write `files` (relative name to content) under `<tempdir>/src/`.
///
/// On any failure the partially written tree is removed before the error
/// is returned.
pub fn write_files<M: FileMap + ?Sized>(files: &M) -> Result<Workspace, WorkspaceError> {
    write_files_in(&std::env::temp_dir(), files)
}

/// Like [`write_files`], but creates the temporary directory inside `parent`.
pub fn write_files_in<M: FileMap + ?Sized>(
    parent: &Path,
    files: &M,
) -> Result<Workspace, WorkspaceError> {
    let dir = tempfile::Builder::new()
        .prefix("wantcheck")
        .tempdir_in(parent)
        .map_err(WorkspaceError::TempDir)?;
    let src = dir.path().join("src");

    for (name, content) in files.entries() {
        if !is_contained(name) {
            return Err(WorkspaceError::InvalidName(name.to_string()));
        }

        let filename = src.join(name);
        if let Some(parent) = filename.parent() {
            fs::create_dir_all(parent).map_err(|source| WorkspaceError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&filename, content).map_err(|source| WorkspaceError::Write {
            path: filename.clone(),
            source,
        })?;
    }

    debug!("Wrote workspace at: {}", dir.path().display());
    Ok(Workspace { dir })
}

/// Relative, non-empty, and never climbing out of the tree.
fn is_contained(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
