//! Symlink operations.

use std::path::{Path, PathBuf};

use crate::{FsError, Metadata};

/// Symlink operations.
///
/// Every method defaults to [`FsError::NotSupported`], so a backend without
/// symlinks opts out with an empty `impl FsLink for MyBackend {}` and
/// reports `symlinks: false` in its
/// [`Capabilities`](crate::Capabilities).
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsLink`.
pub trait FsLink: Send + Sync {
    /// Create a symbolic link at `link` pointing at `target`.
    ///
    /// `target` need not exist. A relative target is stored as given and
    /// resolved from the directory containing `link` each time the link is
    /// followed.
    ///
    /// # Errors
    ///
    /// - [`FsError::Symlink`] if `link` already exists
    /// - [`FsError::NotFound`] if the parent of `link` does not exist
    /// - [`FsError::InvalidPath`] if either path is malformed, or a relative
    ///   target would climb above the backend's root
    fn symlink(&self, target: &Path, link: &Path) -> Result<(), FsError> {
        let _ = (target, link);
        Err(FsError::NotSupported {
            operation: "symlink",
        })
    }

    /// True iff the path itself is a symlink.
    fn is_symlink(&self, path: &Path) -> Result<bool, FsError> {
        let _ = path;
        Err(FsError::NotSupported {
            operation: "is_symlink",
        })
    }

    /// Read the immediate target of a symbolic link.
    ///
    /// The whole chain is resolved first so broken and circular links are
    /// reported rather than returned. Relative targets come back exactly as
    /// they were created.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if nothing exists at `path`
    /// - [`FsError::Symlink`] if `path` is not a symlink, the chain is
    ///   broken, or the chain loops
    fn read_link(&self, path: &Path) -> Result<PathBuf, FsError> {
        let _ = path;
        Err(FsError::NotSupported {
            operation: "read_link",
        })
    }

    /// Get metadata without following symlinks.
    ///
    /// Unlike [`FsRead::metadata`](super::FsRead::metadata), a symlink
    /// reports its own metadata.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `path` does not exist
    fn symlink_metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let _ = path;
        Err(FsError::NotSupported {
            operation: "symlink_metadata",
        })
    }
}
