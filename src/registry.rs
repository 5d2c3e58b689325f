//! Ordered list of tracked paths.

use std::path::{Path, PathBuf};

use crate::FsError;
use crate::path::normalize_path;

/// Insertion-ordered set of canonical paths.
///
/// Used to remember which locations a caller created so they can be
/// cleaned up or reported later. The registry never touches a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathRegistry {
    paths: Vec<PathBuf>,
}

impl PathRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `path`. Returns `false` if it was already tracked.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if `path` is empty or contains a null byte
    pub fn add(&mut self, path: impl AsRef<Path>) -> Result<bool, FsError> {
        let path = normalize_path(path.as_ref())?;
        if self.paths.contains(&path) {
            return Ok(false);
        }
        self.paths.push(path);
        Ok(true)
    }

    /// Stop tracking `path`. Returns `false` if it was not tracked.
    pub fn remove(&mut self, path: impl AsRef<Path>) -> bool {
        let Ok(path) = normalize_path(path.as_ref()) else {
            return false;
        };
        let before = self.paths.len();
        self.paths.retain(|p| *p != path);
        self.paths.len() != before
    }

    /// Whether `path` is tracked.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        normalize_path(path.as_ref()).is_ok_and(|path| self.paths.contains(&path))
    }

    /// Tracked paths in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Number of tracked paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Forget every path.
    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

impl<'a> IntoIterator for &'a PathRegistry {
    type Item = &'a Path;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, PathBuf>, fn(&'a PathBuf) -> &'a Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter().map(PathBuf::as_path as fn(&'a PathBuf) -> &'a Path)
    }
}
