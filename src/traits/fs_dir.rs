//! Directory operations for storage backends.

use std::path::{Path, PathBuf};

use crate::{DeleteOptions, FsError, ListOptions, MkdirOptions};

/// Directory operations for a storage backend.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsDir`.
pub trait FsDir: Send + Sync {
    /// List the entries under a directory as sorted canonical paths.
    ///
    /// Direct children only, unless `opts.recursive` is set. `opts.pattern`
    /// filters by name (see [`NameFilter`](crate::NameFilter)).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is not a directory
    /// - [`FsError::InvalidPattern`] if the glob is malformed
    fn list(&self, path: &Path, opts: &ListOptions) -> Result<Vec<PathBuf>, FsError>;

    /// Create a directory, and by default its missing ancestors.
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if anything already occupies the path
    /// - [`FsError::NotFound`] if a parent is missing and `opts.parents` is `false`
    /// - [`FsError::NotADirectory`] if an ancestor is a file
    fn mkdir(&self, path: &Path, opts: &MkdirOptions) -> Result<(), FsError>;

    /// Remove a directory; `delete` restricted to directories.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path does not exist
    /// - [`FsError::NotADirectory`] if the path is not a directory
    /// - [`FsError::DirectoryNotEmpty`] if non-empty and `opts.recursive` is unset
    fn rmdir(&self, path: &Path, opts: &DeleteOptions) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_dir_is_object_safe() {
        fn _check(_: &dyn FsDir) {}
    }

    #[test]
    fn fs_dir_requires_send_sync() {
        fn _assert_send_sync<T: Send + Sync>() {}
        fn _check<T: FsDir>() {
            _assert_send_sync::<T>();
        }
    }
}
