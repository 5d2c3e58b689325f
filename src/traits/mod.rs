//! # Backend Traits
//!
//! The trait hierarchy every storage backend implements.
//!
//! ## Trait Layers
//!
//! ```text
//! Core:     FsRead + FsWrite + FsDir         = Fs
//!                                            ↓
//! Backend:  Fs + FsLink + FsInfo             = Backend
//! ```
//!
//! | Composite | Component Traits | Use Case |
//! |-----------|------------------|----------|
//! | [`Fs`] | [`FsRead`], [`FsWrite`], [`FsDir`] | Content and directory operations |
//! | [`Backend`] | + [`FsLink`], [`FsInfo`] | What facades and registries hold |
//!
//! [`FsPath`] comes for free with [`FsRead`] + [`FsLink`].
//!
//! ## Blanket Implementations
//!
//! Implement the component traits and the composites follow:
//!
//! ```rust
//! use storefs::{Backend, MemoryBackend};
//!
//! fn takes_backend(_: &dyn Backend) {}
//! takes_backend(&MemoryBackend::new());
//! ```
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. Methods take `&self`; backends keep
//! their state behind interior mutability.

mod fs_dir;
mod fs_info;
mod fs_link;
mod fs_path;
mod fs_read;
mod fs_write;

pub use fs_dir::FsDir;
pub use fs_info::FsInfo;
pub use fs_link::FsLink;
pub use fs_path::{FsPath, MAX_SYMLINK_HOPS};
pub use fs_read::FsRead;
pub use fs_write::FsWrite;

/// Content and directory operations.
///
/// Combines [`FsRead`], [`FsWrite`] and [`FsDir`]; never implement it
/// directly.
///
/// ```rust
/// use storefs::{Fs, FsError, ListOptions, WriteOptions};
/// use std::path::Path;
///
/// fn archive<B: Fs + ?Sized>(fs: &B, dir: &Path) -> Result<usize, FsError> {
///     let entries = fs.list(dir, &ListOptions::default().with_pattern("*.log"))?;
///     for entry in &entries {
///         let name = entry.file_name().unwrap_or_default();
///         fs.rename(entry, &Path::new("/archive").join(name), &WriteOptions::default())?;
///     }
///     Ok(entries.len())
/// }
/// ```
pub trait Fs: FsRead + FsWrite + FsDir {}

impl<T: FsRead + FsWrite + FsDir + ?Sized> Fs for T {}

/// A complete storage backend: [`Fs`] plus symlinks and self-description.
///
/// This is the type file facades and callers hold, usually as
/// `Arc<dyn Backend>` or `&dyn Backend`.
pub trait Backend: Fs + FsLink + FsInfo {}

impl<T: Fs + FsLink + FsInfo + ?Sized> Backend for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_is_object_safe() {
        fn _check(_: &dyn Backend) {}
    }

    #[test]
    fn dyn_backend_upcasts_to_fs() {
        fn _inner(_: &dyn Fs) {}
        fn _outer<B: Backend>(b: &B) {
            _inner(b);
        }
    }
}
