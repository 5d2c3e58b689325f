//! # storefs
//!
//! A storage-backend contract plus two implementations: a complete
//! in-memory filesystem emulation and an adapter over a host directory.
//!
//! Code written against [`Backend`] runs unchanged on either, which makes
//! the in-memory engine a drop-in substitute for disk in tests.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use storefs::{
//!     Backend, FsDir, FsError, FsLink, FsRead, FsWrite, ListOptions, MemoryBackend, WriteOptions,
//! };
//! use std::path::Path;
//!
//! fn publish(fs: &dyn Backend) -> Result<usize, FsError> {
//!     fs.write(Path::new("/site/index.html"), b"<h1>hi</h1>", &WriteOptions::default())?;
//!     fs.symlink(Path::new("/site/index.html"), Path::new("/site/home.html"))?;
//!     Ok(fs.list(Path::new("/site"), &ListOptions::default())?.len())
//! }
//!
//! let fs = MemoryBackend::new();
//! assert_eq!(publish(&fs).unwrap(), 2);
//! assert_eq!(fs.read(Path::new("/site/home.html")).unwrap(), b"<h1>hi</h1>");
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Backend`] | The full contract: [`Fs`] + [`FsLink`] + [`FsInfo`] |
//! | [`MemoryBackend`] | In-memory filesystem emulation |
//! | [`DiskBackend`] | Host directory adapter |
//! | [`FileRef`] | One path on one shared backend |
//! | [`PathRegistry`] | Ordered set of tracked paths |
//! | [`FsError`] / [`ErrorKind`] | Error type and its flat taxonomy |
//! | [`Metadata`] | Type, size, times, permissions, content type, attributes |
//! | [`Capabilities`] | Static feature flags per backend |
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`. Errors carry the path and,
//! where it helps, the operation:
//!
//! ```rust
//! use storefs::{ErrorKind, FsError};
//! use std::path::PathBuf;
//!
//! let err = FsError::PermissionDenied {
//!     path: PathBuf::from("/secret"),
//!     operation: "read",
//! };
//! assert_eq!(err.to_string(), "read: permission denied: /secret");
//! assert_eq!(err.kind(), ErrorKind::Permission);
//! ```
//!
//! ---
//!
//! ## Logging
//!
//! Mutations and host calls emit [`tracing`] events at `debug`, symlink
//! hops at `trace`. The crate never installs a subscriber.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Metadata`], [`MemorySnapshot`], [`MemoryConfig`], and [`FsExtJson`] |

mod disk;
mod error;
mod ext;
mod file;
mod memory;
mod options;
mod path;
mod registry;
mod traits;
mod types;

// Errors
pub use error::{ErrorKind, FsError};

// Core types
pub use options::{DeleteOptions, ListOptions, MkdirOptions, WriteOptions};
pub use types::{Capabilities, DEFAULT_CONTENT_TYPE, FileType, Metadata, Permissions};

// Traits
pub use traits::{
    Backend, Fs, FsDir, FsInfo, FsLink, FsPath, FsRead, FsWrite, MAX_SYMLINK_HOPS,
};

// Paths
pub use path::{NameFilter, is_descendant, is_direct_child, normalize_path, validate_path};

// Backends and facades
pub use disk::DiskBackend;
pub use file::FileRef;
pub use memory::{MemoryBackend, MemoryConfig, MemorySnapshot, MemoryStats};
pub use registry::PathRegistry;

// Infrastructure
pub use ext::FsExt;

#[cfg(feature = "serde")]
pub use ext::FsExtJson;
