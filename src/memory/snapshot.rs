//! Read-only views of the engine used by tests and debugging.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use super::state::State;
use crate::{FileType, Metadata};

/// A deep copy of everything a [`MemoryBackend`](super::MemoryBackend) holds.
///
/// Mutating the snapshot does not affect the backend.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemorySnapshot {
    /// File contents by path.
    pub files: BTreeMap<PathBuf, Vec<u8>>,
    /// Every directory, root included.
    pub directories: BTreeSet<PathBuf>,
    /// Symlink targets by link path.
    pub symlinks: BTreeMap<PathBuf, PathBuf>,
    /// Metadata for every entry above, as `symlink_metadata` reports it.
    pub metadata: BTreeMap<PathBuf, Metadata>,
}

/// Entry counts and total content size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryStats {
    /// Number of regular files.
    pub files: usize,
    /// Number of directories, root included.
    pub directories: usize,
    /// Number of symlinks.
    pub symlinks: usize,
    /// Sum of all file sizes in bytes.
    pub total_bytes: u64,
}

impl MemorySnapshot {
    pub(super) fn capture(state: &State) -> Self {
        let mut metadata = BTreeMap::new();
        for path in state.files.keys() {
            metadata.insert(path.clone(), state.describe(path, FileType::File));
        }
        for path in &state.dirs {
            metadata.insert(path.clone(), state.describe(path, FileType::Directory));
        }
        for path in state.symlinks.keys() {
            metadata.insert(path.clone(), state.describe(path, FileType::Symlink));
        }
        Self {
            files: state.files.clone(),
            directories: state.dirs.clone(),
            symlinks: state.symlinks.clone(),
            metadata,
        }
    }
}

impl MemoryStats {
    pub(super) fn capture(state: &State) -> Self {
        Self {
            files: state.files.len(),
            directories: state.dirs.len(),
            symlinks: state.symlinks.len(),
            total_bytes: state.files.values().map(|data| data.len() as u64).sum(),
        }
    }
}
