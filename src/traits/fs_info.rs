//! Backend self-description: capabilities, path canonicalization and URIs.

use std::path::{Path, PathBuf};

use crate::{Capabilities, FsError};

/// Static description of a backend.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsInfo`.
pub trait FsInfo: Send + Sync {
    /// URI scheme used by [`uri_for`](Self::uri_for), e.g. `"memory"`.
    fn scheme(&self) -> &'static str;

    /// The fixed set of optional features this backend supports.
    ///
    /// The answer never changes over the lifetime of a backend.
    fn capabilities(&self) -> Capabilities;

    /// Canonicalize a path lexically (see [`normalize_path`](crate::normalize_path)).
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if the path is empty or contains a null byte
    fn normalize_path(&self, path: &Path) -> Result<PathBuf, FsError> {
        crate::path::normalize_path(path)
    }

    /// Render a URI naming `path` in this backend, e.g. `memory:///a/b.txt`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPath`] if the path is empty or contains a null byte
    fn uri_for(&self, path: &Path) -> Result<String, FsError> {
        let normalized = self.normalize_path(path)?;
        Ok(format!("{}://{}", self.scheme(), normalized.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl FsInfo for Plain {
        fn scheme(&self) -> &'static str {
            "plain"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::NONE
        }
    }

    #[test]
    fn fs_info_is_object_safe() {
        fn _check(_: &dyn FsInfo) {}
    }

    #[test]
    fn uri_uses_scheme_and_canonical_path() {
        let uri = Plain.uri_for(Path::new("a//b/../c.txt")).unwrap();
        assert_eq!(uri, "plain:///a/c.txt");
    }

    #[test]
    fn uri_rejects_empty_path() {
        assert!(Plain.uri_for(Path::new("")).is_err());
    }
}
