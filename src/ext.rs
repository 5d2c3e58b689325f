//! # Convenience Methods
//!
//! Built from the contract, so every backend has them.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`is_file`](FsExt::is_file) | Content entry here, after following links |
//! | [`is_dir`](FsExt::is_dir) | Directory here, after following links |
//! | [`file_size`](FsExt::file_size) | Content length |
//! | [`with_reader`](FsExt::with_reader) | Scoped streaming read |
//! | [`with_writer`](FsExt::with_writer) | Scoped streaming write, committed on success |
//!
//! ## JSON
//!
//! With the `serde` feature enabled, [`FsExtJson`] adds `read_json` and
//! `write_json`.

use std::io::{Read, Write};
use std::path::Path;

use crate::{Fs, FsError, WriteOptions};

/// Extension methods for any [`Fs`] backend.
///
/// # Example
///
/// ```rust
/// use storefs::{FsExt, FsWrite, MemoryBackend, WriteOptions};
/// use std::io::{Read, Write};
/// use std::path::Path;
///
/// let fs = MemoryBackend::new();
/// fs.with_writer(Path::new("/log.txt"), &WriteOptions::default(), |w| {
///     writeln!(w, "first")?;
///     writeln!(w, "second")?;
///     Ok(())
/// })
/// .unwrap();
///
/// let lines = fs
///     .with_reader(Path::new("/log.txt"), |r| {
///         let mut text = String::new();
///         r.read_to_string(&mut text)?;
///         Ok(text.lines().count())
///     })
///     .unwrap();
/// assert_eq!(lines, 2);
/// ```
pub trait FsExt: Fs {
    /// Check if the path points to a regular file (following symlinks).
    ///
    /// Returns `Ok(false)` if the path doesn't exist.
    fn is_file(&self, path: &Path) -> Result<bool, FsError> {
        match self.metadata(path) {
            Ok(m) => Ok(m.is_file()),
            Err(FsError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if the path points to a directory (following symlinks).
    ///
    /// Returns `Ok(false)` if the path doesn't exist.
    fn is_dir(&self, path: &Path) -> Result<bool, FsError> {
        match self.metadata(path) {
            Ok(m) => Ok(m.is_dir()),
            Err(FsError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Content length of the entry at `path`.
    ///
    /// # Errors
    ///
    /// - `FsError::NotFound` when nothing is there
    fn file_size(&self, path: &Path) -> Result<u64, FsError> {
        Ok(self.metadata(path)?.size)
    }

    /// Open `path` for reading, hand the stream to `f`, and release it
    /// when `f` returns, whatever the outcome.
    ///
    /// I/O errors raised inside `f` convert into [`FsError`] with `?`.
    ///
    /// # Errors
    ///
    /// - anything [`open_read`](crate::FsRead::open_read) reports
    /// - whatever `f` returns
    fn with_reader<T, F>(&self, path: &Path, f: F) -> Result<T, FsError>
    where
        F: FnOnce(&mut dyn Read) -> Result<T, FsError>,
    {
        let mut reader = self.open_read(path)?;
        f(&mut *reader)
    }

    /// Collect everything `f` writes and store it at `path` with one
    /// [`write`](crate::FsWrite::write), only if `f` returns `Ok`.
    ///
    /// On error nothing is written and the previous content, if any, is
    /// left in place.
    ///
    /// # Errors
    ///
    /// - whatever `f` returns
    /// - anything the final `write` reports
    fn with_writer<T, F>(&self, path: &Path, opts: &WriteOptions, f: F) -> Result<T, FsError>
    where
        F: FnOnce(&mut dyn Write) -> Result<T, FsError>,
    {
        let mut buffer = Vec::new();
        let value = f(&mut buffer)?;
        self.write(path, &buffer, opts)?;
        Ok(value)
    }
}

impl<B: Fs + ?Sized> FsExt for B {}

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::{Serialize, de::DeserializeOwned};

    /// Typed JSON documents on any backend (`serde` feature).
    pub trait FsExtJson: Fs {
        /// Parse the file at `path` as JSON into `T`.
        ///
        /// # Errors
        ///
        /// - `FsError::NotFound` if the file doesn't exist
        /// - `FsError::InvalidData` if the file isn't valid UTF-8
        /// - `FsError::Deserialization` if JSON parsing failed
        fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T, FsError> {
            let data = self.read_to_string(path)?;
            serde_json::from_str(&data).map_err(|e| FsError::Deserialization(e.to_string()))
        }

        /// Serialize a value and write it as pretty-printed JSON.
        ///
        /// # Errors
        ///
        /// - `FsError::Serialization` if serialization failed
        /// - other variants from the underlying `write`
        fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), FsError> {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| FsError::Serialization(e.to_string()))?;
            self.write(path, json.as_bytes(), &WriteOptions::default())
        }
    }

    impl<B: Fs + ?Sized> FsExtJson for B {}
}

#[cfg(feature = "serde")]
pub use json::FsExtJson;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, FsRead, FsWrite, MemoryBackend};
    use pretty_assertions::assert_eq;

    fn fs_with_file() -> MemoryBackend {
        let fs = MemoryBackend::new();
        fs.write(Path::new("/f.txt"), b"hello", &WriteOptions::default())
            .unwrap();
        fs
    }

    #[test]
    fn is_file_and_is_dir() {
        let fs = fs_with_file();
        assert!(fs.is_file(Path::new("/f.txt")).unwrap());
        assert!(!fs.is_dir(Path::new("/f.txt")).unwrap());
        assert!(fs.is_dir(Path::new("/")).unwrap());
        assert!(!fs.is_file(Path::new("/missing")).unwrap());
        assert!(!fs.is_dir(Path::new("/missing")).unwrap());
    }

    #[test]
    fn file_size_reports_bytes() {
        let fs = fs_with_file();
        assert_eq!(fs.file_size(Path::new("/f.txt")).unwrap(), 5);
        assert_eq!(
            fs.file_size(Path::new("/missing")).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn with_reader_propagates_closure_error() {
        let fs = fs_with_file();
        let result: Result<(), FsError> = fs.with_reader(Path::new("/f.txt"), |_| {
            Err(FsError::NotSupported { operation: "test" })
        });
        assert!(matches!(result, Err(FsError::NotSupported { .. })));
    }

    #[test]
    fn with_reader_on_missing_file_never_calls_closure() {
        let fs = MemoryBackend::new();
        let mut called = false;
        let result = fs.with_reader(Path::new("/missing"), |_| {
            called = true;
            Ok(())
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        assert!(!called);
    }

    #[test]
    fn failed_writer_keeps_previous_content() {
        let fs = fs_with_file();
        let result: Result<(), FsError> =
            fs.with_writer(Path::new("/f.txt"), &WriteOptions::default(), |w| {
                w.write_all(b"replacement")?;
                Err(FsError::NotSupported { operation: "test" })
            });
        assert!(result.is_err());
        assert_eq!(fs.read(Path::new("/f.txt")).unwrap(), b"hello");
    }

    #[test]
    fn with_writer_honours_options() {
        let fs = MemoryBackend::new();
        let opts = WriteOptions::default().with_content_type("text/csv");
        fs.with_writer(Path::new("/t.csv"), &opts, |w| {
            w.write_all(b"a,b\n")?;
            Ok(())
        })
        .unwrap();
        let meta = fs.metadata(Path::new("/t.csv")).unwrap();
        assert_eq!(meta.content_type, "text/csv");
        assert_eq!(meta.size, 4);
    }

    #[test]
    fn fs_ext_available_on_dyn_fs() {
        let fs = fs_with_file();
        let dyn_fs: &dyn Fs = &fs;
        assert!(dyn_fs.is_file(Path::new("/f.txt")).unwrap());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip() {
        use std::collections::BTreeMap;

        let fs = MemoryBackend::new();
        let mut value = BTreeMap::new();
        value.insert("name".to_string(), 3u32);
        fs.write_json(Path::new("/c.json"), &value).unwrap();
        let back: BTreeMap<String, u32> = fs.read_json(Path::new("/c.json")).unwrap();
        assert_eq!(back, value);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_parse_failure_is_deserialization_error() {
        let fs = fs_with_file();
        let result: Result<serde_json::Value, FsError> = fs.read_json(Path::new("/f.txt"));
        assert!(matches!(result, Err(FsError::Deserialization(_))));
    }
}
