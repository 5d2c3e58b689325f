//! # In-Memory Backend
//!
//! A complete filesystem emulation held in process memory: files,
//! directories, symlinks and per-entry metadata, with POSIX-like rules.
//!
//! ## Behaviour
//!
//! | Operation | Rule |
//! |-----------|------|
//! | `write` | creates missing parents (unless disabled), follows symlinks, keeps `created` on overwrite |
//! | `read`, `metadata`, `list` | follow symlinks in every component |
//! | `exists`, `delete`, `symlink_metadata` | act on the final component itself |
//! | `delete` | refuses non-empty directories unless recursive; never removes `/` |
//! | `rename` | a no-op when both paths resolve to the same entry |
//! | symlink chains | at most [`MAX_SYMLINK_HOPS`](crate::MAX_SYMLINK_HOPS) hops, cycles fail with [`FsError::Symlink`] |
//!
//! All state sits behind one lock, so every operation is atomic with
//! respect to the others. Timestamps come from a per-instance clock that
//! never repeats a value.
//!
//! ```rust
//! use storefs::{FsDir, FsRead, FsWrite, ListOptions, MemoryBackend, WriteOptions};
//! use std::path::{Path, PathBuf};
//!
//! let fs = MemoryBackend::new();
//! fs.write(Path::new("/docs/a.txt"), b"hello", &WriteOptions::default()).unwrap();
//!
//! assert_eq!(fs.read(Path::new("/docs/a.txt")).unwrap(), b"hello");
//! assert_eq!(
//!     fs.list(Path::new("/"), &ListOptions::default()).unwrap(),
//!     vec![PathBuf::from("/docs")],
//! );
//! ```

mod config;
mod snapshot;
mod state;

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::path::{NameFilter, is_direct_child, normalize_path};
use crate::{
    Capabilities, DeleteOptions, FileType, FsDir, FsError, FsInfo, FsLink, FsRead, FsWrite,
    ListOptions, Metadata, MkdirOptions, WriteOptions,
};

pub use config::MemoryConfig;
pub use snapshot::{MemorySnapshot, MemoryStats};

use state::State;

/// In-memory filesystem emulation.
///
/// Cheap to create; share it with `Arc` for concurrent use.
#[derive(Debug)]
pub struct MemoryBackend {
    state: RwLock<State>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// An empty filesystem containing only `/`.
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    /// An empty filesystem with custom defaults.
    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            state: RwLock::new(State::new(config)),
        }
    }

    /// Deep copy of the whole state.
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot::capture(&self.state.read())
    }

    /// Entry counts and total bytes stored.
    pub fn stats(&self) -> MemoryStats {
        MemoryStats::capture(&self.state.read())
    }

    /// Remove everything except the root directory.
    pub fn clear(&self) {
        self.state.write().reset();
        tracing::debug!("cleared in-memory filesystem");
    }
}

impl FsRead for MemoryBackend {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        let path = normalize_path(path)?;
        let mut state = self.state.write();
        let (target, data) = {
            let (target, data, _) = state.file_at(&path)?;
            (target, data.to_vec())
        };
        state.touch_accessed(&target);
        Ok(data)
    }

    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        let path = normalize_path(path)?;
        let state = self.state.read();
        let entry = state.resolve_parent(&path)?;
        Ok(state.kind(&entry).is_some())
    }

    fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let path = normalize_path(path)?;
        let state = self.state.read();
        let target = state.resolve(&path)?;
        match state.kind(&target) {
            Some(file_type) => Ok(state.describe(&target, file_type)),
            None => Err(FsError::not_found(target)),
        }
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let data = self.read(path)?;
        Ok(Box::new(Cursor::new(data)))
    }
}

impl FsWrite for MemoryBackend {
    fn write(&self, path: &Path, data: &[u8], opts: &WriteOptions) -> Result<(), FsError> {
        let path = normalize_path(path)?;
        self.state.write().write_file(&path, data.to_vec(), opts, None)
    }

    fn delete(&self, path: &Path, opts: &DeleteOptions) -> Result<(), FsError> {
        let path = normalize_path(path)?;
        let mut state = self.state.write();
        let entry = state.resolve_parent(&path)?;
        match state.kind(&entry) {
            None => Err(FsError::not_found(entry)),
            Some(FileType::Directory) => state.remove_dir(&entry, opts.recursive),
            Some(_) => {
                state.remove_entry(&entry);
                tracing::debug!(path = %entry.display(), "deleted entry");
                Ok(())
            }
        }
    }

    fn copy(&self, from: &Path, to: &Path, opts: &WriteOptions) -> Result<(), FsError> {
        let from = normalize_path(from)?;
        let to = normalize_path(to)?;
        let mut state = self.state.write();
        let (data, meta) = {
            let (_, data, meta) = state.file_at(&from)?;
            (data.to_vec(), meta.cloned())
        };
        state.write_file(&to, data, opts, meta.as_ref())?;
        tracing::debug!(from = %from.display(), to = %to.display(), "copied file");
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path, opts: &WriteOptions) -> Result<(), FsError> {
        let from = normalize_path(from)?;
        let to = normalize_path(to)?;
        let mut state = self.state.write();
        let source = state.resolve_parent(&from)?;
        if state.kind(&source).is_none() {
            return Err(FsError::not_found(source));
        }
        // Either side may reach the other through a link; copying onto the
        // same entry and then deleting it would lose the content.
        if from == to || state.resolve(&from)? == state.resolve(&to)? {
            return Ok(());
        }
        let (data, meta) = {
            let (_, data, meta) = state.file_at(&from)?;
            (data.to_vec(), meta.cloned())
        };
        state.write_file(&to, data, opts, meta.as_ref())?;
        state.remove_entry(&source);
        tracing::debug!(from = %from.display(), to = %to.display(), "moved file");
        Ok(())
    }
}

impl FsDir for MemoryBackend {
    fn list(&self, path: &Path, opts: &ListOptions) -> Result<Vec<PathBuf>, FsError> {
        let path = normalize_path(path)?;
        let filter = NameFilter::new(&opts.pattern)?;
        let state = self.state.read();
        let dir = state.resolve(&path)?;
        match state.kind(&dir) {
            Some(FileType::Directory) => {}
            Some(_) => return Err(FsError::NotADirectory { path: dir }),
            None => return Err(FsError::not_found(dir)),
        }
        // Entries are reported under the path the caller asked for, even
        // when it reached the directory through a symlink.
        Ok(state
            .descendants(&dir)
            .into_iter()
            .filter(|entry| opts.recursive || is_direct_child(entry, &dir))
            .filter(|entry| filter.matches(entry, &dir, opts.recursive))
            .filter_map(|entry| entry.strip_prefix(&dir).ok().map(|rel| path.join(rel)))
            .collect())
    }

    fn mkdir(&self, path: &Path, opts: &MkdirOptions) -> Result<(), FsError> {
        let path = normalize_path(path)?;
        let mut state = self.state.write();
        let entry = state.resolve_parent(&path)?;
        if state.kind(&entry).is_some() {
            return Err(FsError::AlreadyExists {
                path: entry,
                operation: "mkdir",
            });
        }
        state.ensure_parents(&entry, opts.parents)?;
        let mode = opts.mode.unwrap_or_else(|| state.default_dir_mode());
        state.insert_dir(entry.clone(), mode);
        tracing::debug!(path = %entry.display(), "created directory");
        Ok(())
    }

    fn rmdir(&self, path: &Path, opts: &DeleteOptions) -> Result<(), FsError> {
        let path = normalize_path(path)?;
        let mut state = self.state.write();
        let entry = state.resolve_parent(&path)?;
        match state.kind(&entry) {
            Some(FileType::Directory) => state.remove_dir(&entry, opts.recursive),
            Some(_) => Err(FsError::NotADirectory { path: entry }),
            None => Err(FsError::not_found(entry)),
        }
    }
}

impl FsLink for MemoryBackend {
    fn symlink(&self, target: &Path, link: &Path) -> Result<(), FsError> {
        let link = normalize_path(link)?;
        // Relative targets are kept as given and resolved from the link's
        // directory on every lookup.
        let target = if target.is_absolute() {
            normalize_path(target)?
        } else {
            crate::path::validate_path(target)?;
            target.to_path_buf()
        };

        let mut state = self.state.write();
        let entry = state.resolve_parent(&link)?;
        if state.kind(&entry).is_some() {
            return Err(FsError::symlink(entry, "link path already exists"));
        }
        if let Some(parent) = entry.parent() {
            match state.kind(parent) {
                Some(FileType::Directory) => {}
                Some(_) => {
                    return Err(FsError::NotADirectory {
                        path: parent.to_path_buf(),
                    });
                }
                None => return Err(FsError::not_found(parent)),
            }
        }
        tracing::debug!(link = %entry.display(), target = %target.display(), "created symlink");
        state.insert_symlink(entry, target);
        Ok(())
    }

    fn is_symlink(&self, path: &Path) -> Result<bool, FsError> {
        let path = normalize_path(path)?;
        let state = self.state.read();
        let entry = state.resolve_parent(&path)?;
        Ok(state.symlinks.contains_key(&entry))
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, FsError> {
        let path = normalize_path(path)?;
        let state = self.state.read();
        let entry = state.resolve_parent(&path)?;
        let Some(target) = state.symlinks.get(&entry) else {
            return match state.kind(&entry) {
                None => Err(FsError::not_found(entry)),
                Some(_) => Err(FsError::symlink(entry, "not a symlink")),
            };
        };
        let end = state.resolve(&entry)?;
        if state.kind(&end).is_none() {
            return Err(FsError::symlink(
                entry,
                format!("broken link: {} does not exist", end.display()),
            ));
        }
        Ok(target.clone())
    }

    fn symlink_metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let path = normalize_path(path)?;
        let state = self.state.read();
        let entry = state.resolve_parent(&path)?;
        match state.kind(&entry) {
            Some(file_type) => Ok(state.describe(&entry, file_type)),
            None => Err(FsError::not_found(entry)),
        }
    }
}

impl FsInfo for MemoryBackend {
    fn scheme(&self) -> &'static str {
        "memory"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            symlinks: true,
            permissions: true,
            streaming: true,
            atomic_writes: false,
            custom_metadata: true,
        }
    }
}
