//! Read operations for storage backends.

use std::io::Read;
use std::path::Path;

use crate::{FsError, Metadata};

/// Read operations for a storage backend.
///
/// All methods use `&self`; backends manage their own synchronization.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Backends should use interior
/// mutability (one lock around their state) for concurrent callers.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsRead`.
pub trait FsRead: Send + Sync {
    /// Read entire file contents as bytes, following symlinks.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path (or a symlink's final target) does not exist
    /// - [`FsError::NotAFile`] if the path is a directory
    /// - [`FsError::Symlink`] if symlink resolution loops
    /// - [`FsError::InvalidPath`] if the path is empty or contains a null byte
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    /// Read file contents as UTF-8 string.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read), plus
    /// [`FsError::InvalidData`] if the file contains invalid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| FsError::InvalidData {
            path: path.to_path_buf(),
            details: "file contents are not valid UTF-8".into(),
        })
    }

    /// Check if any entry (file, directory or symlink) occupies the path.
    ///
    /// Symlinks are not followed: a broken link still exists.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if the path is empty or contains a null byte
    fn exists(&self, path: &Path) -> Result<bool, FsError>;

    /// Get metadata for a path (follows symlinks).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the path or the symlink target does not exist
    /// - [`FsError::Symlink`] if symlink resolution loops
    fn metadata(&self, path: &Path) -> Result<Metadata, FsError>;

    /// Open a file for streaming reads.
    ///
    /// Prefer [`FsExt::with_reader`](crate::FsExt::with_reader), which
    /// scopes the stream to a closure.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotSupported`] unless the backend supports streaming
    /// - otherwise as [`read`](Self::read)
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let _ = path;
        Err(FsError::NotSupported {
            operation: "open_read",
        })
    }
}
