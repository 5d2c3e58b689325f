//! Error types shared by every storage backend.

use std::io;
use std::path::{Path, PathBuf};

/// Filesystem error type with contextual variants.
///
/// Every backend reports failures through this one enum, so calling code
/// never branches on backend-specific error types. Use [`FsError::kind`] to
/// classify an error into the coarse [`ErrorKind`] taxonomy.
///
/// # Examples
///
/// ```rust
/// use storefs::{ErrorKind, FsError};
/// use std::path::PathBuf;
///
/// let err = FsError::NotFound { path: PathBuf::from("/missing") };
/// assert_eq!(err.to_string(), "not found: /missing");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    // Specialised kinds
    /// Path does not exist (or a symlink points at nothing).
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Path is empty, contains a null byte, or is otherwise malformed.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path, as given by the caller.
        path: String,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// Symlink misuse: occupied link location, non-symlink passed to a
    /// symlink-only operation, broken link, or a resolution cycle.
    #[error("symlink error: {path} ({reason})")]
    Symlink {
        /// The path being created or resolved.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Permission denied for operation.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The path where permission was denied.
        path: PathBuf,
        /// The operation that was denied.
        operation: &'static str,
    },

    /// The active backend does not implement the operation.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    // Base kinds
    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The path that already exists.
        path: PathBuf,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Expected a file but found a directory.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is not a file.
        path: PathBuf,
    },

    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: PathBuf,
    },

    /// Directory is not empty and the recursive option was not given.
    #[error("directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The path to the non-empty directory.
        path: PathBuf,
    },

    /// A listing pattern could not be compiled.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// The pattern as given.
        pattern: String,
        /// The compiler's complaint.
        reason: String,
    },

    /// Invalid data encountered.
    #[error("invalid data: {path} ({details})")]
    InvalidData {
        /// The path with invalid data.
        path: PathBuf,
        /// Details about the invalid data.
        details: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Coarse classification of an [`FsError`].
///
/// `Other` is the base kind; the rest are its specialisations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Generic failure (already exists, not empty, wrong entry kind, I/O...).
    Other,
    /// The path, or a symlink's target, does not exist.
    NotFound,
    /// The path was rejected before reaching storage.
    InvalidPath,
    /// Symlink creation or resolution failed.
    Symlink,
    /// Access was denied by the backing store.
    Permission,
    /// The backend lacks the capability.
    NotSupported,
}

impl FsError {
    /// Classify this error into the flat taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::NotFound { .. } => ErrorKind::NotFound,
            FsError::InvalidPath { .. } => ErrorKind::InvalidPath,
            FsError::Symlink { .. } => ErrorKind::Symlink,
            FsError::PermissionDenied { .. } => ErrorKind::Permission,
            FsError::NotSupported { .. } => ErrorKind::NotSupported,
            _ => ErrorKind::Other,
        }
    }

    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        FsError::NotFound { path: path.into() }
    }

    pub(crate) fn symlink(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FsError::Symlink {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Translate a native I/O error raised while performing `operation` on
    /// `path`, via the fixed kind lookup table (errno fallback for loops).
    pub fn from_io(operation: &'static str, path: &Path, error: io::Error) -> Self {
        let path = path.to_path_buf();
        let mapped = ERROR_TABLE
            .iter()
            .find(|(kind, _)| *kind == error.kind())
            .map(|(_, target)| *target)
            .or_else(|| {
                error
                    .raw_os_error()
                    .filter(|code| Some(*code) == ELOOP)
                    .map(|_| Translated::Symlink)
            });

        match mapped {
            Some(Translated::NotFound) => FsError::NotFound { path },
            Some(Translated::PermissionDenied) => FsError::PermissionDenied { path, operation },
            Some(Translated::DirectoryNotEmpty) => FsError::DirectoryNotEmpty { path },
            Some(Translated::AlreadyExists) => FsError::AlreadyExists { path, operation },
            Some(Translated::NotADirectory) => FsError::NotADirectory { path },
            Some(Translated::NotAFile) => FsError::NotAFile { path },
            Some(Translated::InvalidPath) => FsError::InvalidPath {
                path: path.display().to_string(),
                reason: "rejected by the host filesystem",
            },
            Some(Translated::Symlink) => FsError::Symlink {
                path,
                reason: "too many levels of symbolic links".into(),
            },
            Some(Translated::NotSupported) => FsError::NotSupported { operation },
            None => FsError::Io {
                operation,
                path,
                source: error,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Translated {
    NotFound,
    PermissionDenied,
    DirectoryNotEmpty,
    AlreadyExists,
    NotADirectory,
    NotAFile,
    InvalidPath,
    Symlink,
    NotSupported,
}

/// Native error kinds and the taxonomy variant each one becomes.
const ERROR_TABLE: &[(io::ErrorKind, Translated)] = &[
    (io::ErrorKind::NotFound, Translated::NotFound),
    (io::ErrorKind::PermissionDenied, Translated::PermissionDenied),
    (io::ErrorKind::DirectoryNotEmpty, Translated::DirectoryNotEmpty),
    (io::ErrorKind::AlreadyExists, Translated::AlreadyExists),
    (io::ErrorKind::NotADirectory, Translated::NotADirectory),
    (io::ErrorKind::IsADirectory, Translated::NotAFile),
    (io::ErrorKind::InvalidInput, Translated::InvalidPath),
    (io::ErrorKind::Unsupported, Translated::NotSupported),
];

// `io::ErrorKind::FilesystemLoop` is unstable, so circular references are
// recognised by errno.
#[cfg(any(target_os = "linux", target_os = "android"))]
const ELOOP: Option<i32> = Some(40);
#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
))]
const ELOOP: Option<i32> = Some(62);
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd"
)))]
const ELOOP: Option<i32> = None;

impl From<io::Error> for FsError {
    fn from(error: io::Error) -> Self {
        FsError::from_io("io", Path::new(""), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_error_not_found_display() {
        let err = FsError::NotFound {
            path: PathBuf::from("/missing"),
        };
        assert_eq!(err.to_string(), "not found: /missing");
    }

    #[test]
    fn fs_error_already_exists_display() {
        let err = FsError::AlreadyExists {
            path: PathBuf::from("/exists"),
            operation: "mkdir",
        };
        assert_eq!(err.to_string(), "mkdir: already exists: /exists");
    }

    #[test]
    fn fs_error_symlink_display() {
        let err = FsError::symlink("/loop", "cycle detected");
        assert_eq!(err.to_string(), "symlink error: /loop (cycle detected)");
    }

    #[test]
    fn specialised_kinds_classify() {
        assert_eq!(FsError::not_found("/x").kind(), ErrorKind::NotFound);
        assert_eq!(
            FsError::InvalidPath {
                path: String::new(),
                reason: "empty"
            }
            .kind(),
            ErrorKind::InvalidPath
        );
        assert_eq!(FsError::symlink("/l", "x").kind(), ErrorKind::Symlink);
        assert_eq!(
            FsError::PermissionDenied {
                path: PathBuf::from("/p"),
                operation: "read"
            }
            .kind(),
            ErrorKind::Permission
        );
        assert_eq!(
            FsError::NotSupported {
                operation: "symlink"
            }
            .kind(),
            ErrorKind::NotSupported
        );
    }

    #[test]
    fn base_kinds_classify_as_other() {
        let err = FsError::DirectoryNotEmpty {
            path: PathBuf::from("/d"),
        };
        assert_eq!(err.kind(), ErrorKind::Other);
        let err = FsError::NotAFile {
            path: PathBuf::from("/d"),
        };
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn from_io_not_found_keeps_path() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let fs_err = FsError::from_io("read", Path::new("/a"), io_err);
        assert!(matches!(fs_err, FsError::NotFound { ref path } if path == Path::new("/a")));
    }

    #[test]
    fn from_io_permission_denied() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "test");
        let fs_err = FsError::from_io("write", Path::new("/a"), io_err);
        assert!(matches!(
            fs_err,
            FsError::PermissionDenied {
                operation: "write",
                ..
            }
        ));
    }

    #[test]
    fn from_io_directory_not_empty() {
        let io_err = io::Error::new(io::ErrorKind::DirectoryNotEmpty, "test");
        let fs_err = FsError::from_io("rmdir", Path::new("/d"), io_err);
        assert!(matches!(fs_err, FsError::DirectoryNotEmpty { .. }));
    }

    #[test]
    fn from_io_invalid_input_is_invalid_path() {
        let io_err = io::Error::new(io::ErrorKind::InvalidInput, "test");
        let fs_err = FsError::from_io("write", Path::new("/bad"), io_err);
        assert_eq!(fs_err.kind(), ErrorKind::InvalidPath);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn from_io_eloop_is_symlink() {
        let io_err = io::Error::from_raw_os_error(40);
        let fs_err = FsError::from_io("read", Path::new("/loop"), io_err);
        assert_eq!(fs_err.kind(), ErrorKind::Symlink);
    }

    #[test]
    fn from_io_other_keeps_source() {
        let io_err = io::Error::other("disk on fire");
        let fs_err = FsError::from_io("write", Path::new("/a"), io_err);
        assert!(matches!(fs_err, FsError::Io { operation: "write", .. }));
        assert!(fs_err.to_string().contains("disk on fire"));
    }

    #[test]
    fn from_io_conversion_uses_table() {
        let io_err = io::Error::new(io::ErrorKind::AlreadyExists, "test");
        let fs_err = FsError::from(io_err);
        assert!(matches!(fs_err, FsError::AlreadyExists { .. }));
    }
}
