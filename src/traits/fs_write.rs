//! Write operations for storage backends.

use std::path::Path;

use crate::path::normalize_path;
use crate::{DeleteOptions, FsError, FsRead, WriteOptions};

/// Write operations for a storage backend.
///
/// `copy` and `rename` have default implementations built from `read`,
/// `write` and `delete`; backends override them when they can do better.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsWrite`.
pub trait FsWrite: FsRead {
    /// Write data to a file, creating or replacing it.
    ///
    /// Missing parent directories are created unless `opts.parents` is
    /// `false`. Overwriting keeps the original creation time. Writing to a
    /// symlink writes to its final target.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotAFile`] if the path is a directory
    /// - [`FsError::NotFound`] if a parent is missing and `opts.parents` is `false`
    /// - [`FsError::NotADirectory`] if an ancestor is a file
    /// - [`FsError::NotSupported`] if `opts` asks for a capability the backend lacks
    fn write(&self, path: &Path, data: &[u8], opts: &WriteOptions) -> Result<(), FsError>;

    /// Remove a file, a symlink (not its target) or a directory.
    ///
    /// Directories must be empty unless `opts.recursive` is set, in which
    /// case all descendants are removed with them.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if nothing exists at the path
    /// - [`FsError::DirectoryNotEmpty`] for a non-empty directory without `recursive`
    /// - [`FsError::InvalidPath`] when asked to remove the root directory
    fn delete(&self, path: &Path, opts: &DeleteOptions) -> Result<(), FsError>;

    /// Copy a file's content to `to`.
    ///
    /// The default reads the source (following symlinks) and writes it at
    /// the destination with `opts`, so the destination's parent-creation
    /// and overwrite rules apply.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the source does not exist
    /// - [`FsError::NotAFile`] if the source or destination is a directory
    fn copy(&self, from: &Path, to: &Path, opts: &WriteOptions) -> Result<(), FsError> {
        if self.metadata(from)?.is_dir() {
            return Err(FsError::NotAFile {
                path: from.to_path_buf(),
            });
        }
        let data = self.read(from)?;
        self.write(to, &data, opts)
    }

    /// Move a file: copy to `to`, then delete `from`.
    ///
    /// Moving a path onto itself is a no-op once the source is known to
    /// exist. Only the lexical paths are compared here, so backends with
    /// symlinks override this to catch a destination that aliases the
    /// source.
    ///
    /// # Errors
    ///
    /// Same as [`copy`](Self::copy) and [`delete`](Self::delete).
    fn rename(&self, from: &Path, to: &Path, opts: &WriteOptions) -> Result<(), FsError> {
        if normalize_path(from)? == normalize_path(to)? {
            return if self.exists(from)? {
                Ok(())
            } else {
                Err(FsError::not_found(from))
            };
        }
        self.copy(from, to, opts)?;
        self.delete(from, &DeleteOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileType, Metadata};
    use parking_lot::Mutex;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    /// Flat map of files, just enough to exercise the provided methods.
    #[derive(Default)]
    struct FlatFs {
        files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    }

    impl FsRead for FlatFs {
        fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
            self.files
                .lock()
                .get(path)
                .cloned()
                .ok_or_else(|| FsError::not_found(path))
        }

        fn exists(&self, path: &Path) -> Result<bool, FsError> {
            Ok(path == Path::new("/") || self.files.lock().contains_key(path))
        }

        fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
            if path == Path::new("/") {
                return Ok(Metadata {
                    file_type: FileType::Directory,
                    ..Default::default()
                });
            }
            let size = self.read(path)?.len() as u64;
            Ok(Metadata {
                size,
                ..Default::default()
            })
        }
    }

    impl FsWrite for FlatFs {
        fn write(&self, path: &Path, data: &[u8], _: &WriteOptions) -> Result<(), FsError> {
            self.files.lock().insert(path.to_path_buf(), data.to_vec());
            Ok(())
        }

        fn delete(&self, path: &Path, _: &DeleteOptions) -> Result<(), FsError> {
            self.files
                .lock()
                .remove(path)
                .map(|_| ())
                .ok_or_else(|| FsError::not_found(path))
        }
    }

    #[test]
    fn fs_write_is_object_safe() {
        fn _check(_: &dyn FsWrite) {}
    }

    #[test]
    fn default_copy_reads_then_writes() {
        let fs = FlatFs::default();
        fs.write(Path::new("/a"), b"payload", &WriteOptions::default())
            .unwrap();
        fs.copy(Path::new("/a"), Path::new("/b"), &WriteOptions::default())
            .unwrap();
        assert_eq!(fs.read(Path::new("/b")).unwrap(), b"payload");
        assert!(fs.exists(Path::new("/a")).unwrap());
    }

    #[test]
    fn default_copy_refuses_directories() {
        let fs = FlatFs::default();
        let result = fs.copy(Path::new("/"), Path::new("/b"), &WriteOptions::default());
        assert!(matches!(result, Err(FsError::NotAFile { .. })));
    }

    #[test]
    fn default_rename_copies_then_deletes() {
        let fs = FlatFs::default();
        fs.write(Path::new("/a"), b"x", &WriteOptions::default())
            .unwrap();
        fs.rename(Path::new("/a"), Path::new("/b"), &WriteOptions::default())
            .unwrap();
        assert!(!fs.exists(Path::new("/a")).unwrap());
        assert_eq!(fs.read(Path::new("/b")).unwrap(), b"x");
    }

    #[test]
    fn default_rename_onto_itself_keeps_content() {
        let fs = FlatFs::default();
        fs.write(Path::new("/a"), b"x", &WriteOptions::default())
            .unwrap();
        fs.rename(Path::new("/a"), Path::new("/./a"), &WriteOptions::default())
            .unwrap();
        assert_eq!(fs.read(Path::new("/a")).unwrap(), b"x");
    }

    #[test]
    fn default_rename_of_missing_source_fails() {
        let fs = FlatFs::default();
        let result = fs.rename(Path::new("/a"), Path::new("/b"), &WriteOptions::default());
        assert!(matches!(result, Err(FsError::NotFound { .. })));
    }
}
