//! A file handle bound to one path on one backend.

use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::path::normalize_path;
use crate::{
    Backend, DeleteOptions, FsError, FsExt, FsInfo, FsLink, FsRead, FsWrite, Metadata, WriteOptions,
};

/// A path on a shared backend, with the backend's operations curried.
///
/// The backend is injected at construction, so two facades over different
/// backends never interfere.
///
/// ```rust
/// use storefs::{Backend, FileRef, MemoryBackend};
/// use std::sync::Arc;
///
/// let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
/// let notes = FileRef::new(Arc::clone(&backend), "notes/today.md").unwrap();
/// notes.write(b"# Today").unwrap();
///
/// assert_eq!(notes.path().to_str(), Some("/notes/today.md"));
/// assert_eq!(notes.read_to_string().unwrap(), "# Today");
/// assert_eq!(notes.uri().unwrap(), "memory:///notes/today.md");
/// ```
pub struct FileRef<B: Backend + ?Sized> {
    backend: Arc<B>,
    path: PathBuf,
}

impl<B: Backend + ?Sized> Clone for FileRef<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            path: self.path.clone(),
        }
    }
}

impl<B: Backend + ?Sized> fmt::Debug for FileRef<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRef")
            .field("scheme", &self.backend.scheme())
            .field("path", &self.path)
            .finish()
    }
}

impl<B: Backend + ?Sized> FileRef<B> {
    /// Bind `path` on `backend`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if `path` is empty or contains a null byte
    pub fn new(backend: Arc<B>, path: impl AsRef<Path>) -> Result<Self, FsError> {
        let path = normalize_path(path.as_ref())?;
        Ok(Self { backend, path })
    }

    /// Canonical path of this file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The backend this file lives on.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Final component of the path, if any.
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Full content.
    pub fn read(&self) -> Result<Vec<u8>, FsError> {
        self.backend.read(&self.path)
    }

    /// Full content as UTF-8.
    pub fn read_to_string(&self) -> Result<String, FsError> {
        self.backend.read_to_string(&self.path)
    }

    /// Replace the content with default options.
    pub fn write(&self, data: &[u8]) -> Result<(), FsError> {
        self.backend.write(&self.path, data, &WriteOptions::default())
    }

    /// Replace the content with explicit options.
    pub fn write_with(&self, data: &[u8], opts: &WriteOptions) -> Result<(), FsError> {
        self.backend.write(&self.path, data, opts)
    }

    /// Whether anything occupies the path.
    pub fn exists(&self) -> Result<bool, FsError> {
        self.backend.exists(&self.path)
    }

    /// Metadata, following symlinks.
    pub fn metadata(&self) -> Result<Metadata, FsError> {
        self.backend.metadata(&self.path)
    }

    /// Size in bytes.
    pub fn size(&self) -> Result<u64, FsError> {
        Ok(self.metadata()?.size)
    }

    /// Remove the file (or the link, when the path is a symlink).
    pub fn delete(&self) -> Result<(), FsError> {
        self.backend.delete(&self.path, &DeleteOptions::default())
    }

    /// Whether the path itself is a symlink.
    pub fn is_symlink(&self) -> Result<bool, FsError> {
        self.backend.is_symlink(&self.path)
    }

    /// Immediate target when this path is a symlink.
    pub fn destination(&self) -> Result<PathBuf, FsError> {
        self.backend.read_link(&self.path)
    }

    /// URI naming this file in its backend.
    pub fn uri(&self) -> Result<String, FsError> {
        self.backend.uri_for(&self.path)
    }

    /// Copy to `to` on the same backend and return a facade for the copy.
    pub fn copy_to(&self, to: impl AsRef<Path>) -> Result<Self, FsError> {
        let target = Self::new(Arc::clone(&self.backend), to)?;
        self.backend
            .copy(&self.path, &target.path, &WriteOptions::default())?;
        Ok(target)
    }

    /// Move to `to` on the same backend and return a facade for the new
    /// location.
    pub fn move_to(&self, to: impl AsRef<Path>) -> Result<Self, FsError> {
        let target = Self::new(Arc::clone(&self.backend), to)?;
        self.backend
            .rename(&self.path, &target.path, &WriteOptions::default())?;
        Ok(target)
    }

    /// Scoped streaming read, see [`FsExt::with_reader`].
    pub fn with_reader<T, F>(&self, f: F) -> Result<T, FsError>
    where
        F: FnOnce(&mut dyn Read) -> Result<T, FsError>,
    {
        self.backend.with_reader(&self.path, f)
    }

    /// Scoped streaming write, see [`FsExt::with_writer`].
    pub fn with_writer<T, F>(&self, opts: &WriteOptions, f: F) -> Result<T, FsError>
    where
        F: FnOnce(&mut dyn Write) -> Result<T, FsError>,
    {
        self.backend.with_writer(&self.path, opts, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, MemoryBackend};
    use pretty_assertions::assert_eq;

    fn shared() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::new())
    }

    #[test]
    fn new_normalizes_and_validates() {
        let backend = shared();
        let file = FileRef::new(Arc::clone(&backend), "a/./b/../c.txt").unwrap();
        assert_eq!(file.path(), Path::new("/a/c.txt"));
        assert_eq!(file.name(), Some("c.txt"));

        let err = FileRef::new(backend, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
    }

    #[test]
    fn facade_delegates_to_backend() {
        let backend = shared();
        let file = FileRef::new(Arc::clone(&backend), "/f.txt").unwrap();
        assert!(!file.exists().unwrap());
        file.write(b"abc").unwrap();
        assert!(file.exists().unwrap());
        assert_eq!(file.size().unwrap(), 3);
        assert_eq!(backend.read(Path::new("/f.txt")).unwrap(), b"abc");
        file.delete().unwrap();
        assert!(!file.exists().unwrap());
    }

    #[test]
    fn write_with_forwards_options() {
        let file = FileRef::new(shared(), "/data.csv").unwrap();
        let opts = WriteOptions::default().with_content_type("text/csv");
        file.write_with(b"a,b", &opts).unwrap();
        assert_eq!(file.metadata().unwrap().content_type, "text/csv");
    }

    #[test]
    fn destination_of_symlink() {
        let backend = shared();
        backend
            .write(Path::new("/t"), b"", &WriteOptions::default())
            .unwrap();
        backend.symlink(Path::new("/t"), Path::new("/l")).unwrap();
        let link = FileRef::new(backend, "/l").unwrap();
        assert!(link.is_symlink().unwrap());
        assert_eq!(link.destination().unwrap(), PathBuf::from("/t"));
    }

    #[test]
    fn copy_and_move_return_new_facades() {
        let file = FileRef::new(shared(), "/a").unwrap();
        file.write(b"x").unwrap();
        let copy = file.copy_to("/b").unwrap();
        assert_eq!(copy.read().unwrap(), b"x");
        let moved = copy.move_to("/c").unwrap();
        assert!(!copy.exists().unwrap());
        assert_eq!(moved.read().unwrap(), b"x");
    }

    #[test]
    fn facades_on_separate_backends_are_isolated() {
        let one = FileRef::new(shared(), "/same").unwrap();
        let two = FileRef::new(shared(), "/same").unwrap();
        one.write(b"1").unwrap();
        assert!(!two.exists().unwrap());
    }

    #[test]
    fn works_over_dyn_backend() {
        let backend: Arc<dyn Backend> = Arc::new(MemoryBackend::new());
        let file = FileRef::new(backend, "/s").unwrap();
        file.with_writer(&WriteOptions::default(), |w| {
            w.write_all(b"streamed")?;
            Ok(())
        })
        .unwrap();
        let text = file
            .with_reader(|r| {
                let mut s = String::new();
                r.read_to_string(&mut s)?;
                Ok(s)
            })
            .unwrap();
        assert_eq!(text, "streamed");
    }
}
