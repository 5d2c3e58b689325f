//! # FsPath Trait
//!
//! Path canonicalization with a default implementation.
//!
//! ## Responsibility
//! - Resolve every symlink along a path and normalize `.`/`..`
//!
//! ## Dependencies
//! - [`FsLink`] for `symlink_metadata` and `read_link`
//! - [`FsError`] for error handling
//!
//! ## Usage
//!
//! ```rust
//! use storefs::{FsPath, MemoryBackend};
//! use std::path::Path;
//!
//! let fs = MemoryBackend::new();
//! storefs::FsDir::mkdir(&fs, Path::new("/real"), &Default::default()).unwrap();
//! storefs::FsLink::symlink(&fs, Path::new("/real"), Path::new("/alias")).unwrap();
//!
//! assert_eq!(fs.canonicalize(Path::new("/alias/../alias")).unwrap(), Path::new("/real"));
//! assert_eq!(fs.soft_canonicalize(Path::new("/alias/new.txt")).unwrap(), Path::new("/real/new.txt"));
//! ```

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::path::{normalize_path, validate_path};
use crate::{FsError, FsLink, FsRead};

/// Maximum number of symlinks followed while resolving one path.
pub const MAX_SYMLINK_HOPS: usize = 40;

/// Path canonicalization with a default implementation.
///
/// # Blanket Implementation
///
/// Implemented for every type that implements [`FsRead`] + [`FsLink`]; a
/// backend without symlink support gets [`FsError::NotSupported`] from the
/// first lookup.
pub trait FsPath: FsRead + FsLink {
    /// Resolve all symlinks and normalize the path.
    ///
    /// Every component must exist.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if a component does not exist
    /// - [`FsError::Symlink`] if more than [`MAX_SYMLINK_HOPS`] links are followed
    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        resolve_components(self, path)
    }

    /// Like [`canonicalize`](Self::canonicalize), but the final component
    /// may be missing; it is appended lexically to the resolved parent.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if a parent component does not exist
    /// - [`FsError::Symlink`] on a symlink loop in the parent chain
    fn soft_canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        let normalized = normalize_path(path)?;
        match (normalized.parent(), normalized.file_name()) {
            (Some(parent), Some(name)) => Ok(resolve_components(self, parent)?.join(name)),
            _ => Ok(normalized),
        }
    }
}

impl<T: FsRead + FsLink + ?Sized> FsPath for T {}

enum Step {
    Up,
    Enter(OsString),
}

fn push_steps(pending: &mut Vec<Step>, path: &Path) {
    // Reversed so `pop` yields components front to back.
    for component in path.components().rev() {
        match component {
            Component::ParentDir => pending.push(Step::Up),
            Component::Normal(name) => pending.push(Step::Enter(name.to_os_string())),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
}

fn resolve_components<F: FsLink + ?Sized>(fs: &F, path: &Path) -> Result<PathBuf, FsError> {
    validate_path(path)?;

    let mut resolved = PathBuf::from("/");
    let mut pending = Vec::new();
    push_steps(&mut pending, path);
    let mut hops = 0;

    while let Some(step) = pending.pop() {
        let name = match step {
            Step::Up => {
                resolved.pop();
                continue;
            }
            Step::Enter(name) => name,
        };
        let candidate = resolved.join(&name);
        if !fs.symlink_metadata(&candidate)?.is_symlink() {
            resolved = candidate;
            continue;
        }

        hops += 1;
        if hops > MAX_SYMLINK_HOPS {
            return Err(FsError::symlink(
                path,
                format!("more than {MAX_SYMLINK_HOPS} symlinks followed"),
            ));
        }
        let target = fs.read_link(&candidate)?;
        tracing::trace!(link = %candidate.display(), target = %target.display(), "following symlink");
        if target.is_absolute() {
            resolved = PathBuf::from("/");
        }
        push_steps(&mut pending, &target);
    }

    Ok(resolved)
}
