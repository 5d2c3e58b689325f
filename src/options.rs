//! Per-operation option sets.
//!
//! Each operation takes one explicit struct listing exactly the options it
//! recognises. All structs implement [`Default`] with the documented
//! defaults and offer `with_*` setters for chaining:
//!
//! ```rust
//! use storefs::{ListOptions, WriteOptions};
//!
//! let list = ListOptions::default().with_recursive(true).with_pattern("*.rs");
//! let write = WriteOptions::default().with_content_type("text/plain");
//! assert!(list.recursive);
//! assert_eq!(write.content_type.as_deref(), Some("text/plain"));
//! ```

use std::collections::BTreeMap;

/// Options for `write`, `copy` and `rename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Content-type tag to record. `None` keeps the previous tag on
    /// overwrite, or the backend default for new files.
    pub content_type: Option<String>,
    /// Custom attributes. `None` keeps the previous attributes on overwrite.
    pub metadata: Option<BTreeMap<String, String>>,
    /// Permission bits. `None` keeps the previous mode on overwrite.
    pub mode: Option<u32>,
    /// Create missing ancestor directories (default `true`).
    pub parents: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            content_type: None,
            metadata: None,
            mode: None,
            parents: true,
        }
    }
}

impl WriteOptions {
    /// Set the content-type tag.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set one custom attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace all custom attributes.
    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the permission bits.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Toggle automatic creation of missing parent directories.
    pub fn with_parents(mut self, parents: bool) -> Self {
        self.parents = parents;
        self
    }

    /// True when the options ask for anything beyond plain content.
    pub(crate) fn carries_attributes(&self) -> bool {
        self.content_type.is_some() || self.metadata.is_some()
    }
}

/// Options for `delete` and `rmdir`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    /// Remove a directory together with all its descendants (default `false`).
    pub recursive: bool,
}

impl DeleteOptions {
    /// Recursive removal.
    pub const RECURSIVE: Self = Self { recursive: true };

    /// Toggle recursive removal.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Options for `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Include all descendants, not just direct children (default `false`).
    pub recursive: bool,
    /// Glob applied to entry names (default `*`, everything).
    pub pattern: String,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            pattern: "*".to_string(),
        }
    }
}

impl ListOptions {
    /// Toggle recursive listing.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the name glob.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }
}

/// Options for `mkdir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MkdirOptions {
    /// Create missing ancestors (default `true`).
    pub parents: bool,
    /// Permission bits for the new directory.
    pub mode: Option<u32>,
}

impl Default for MkdirOptions {
    fn default() -> Self {
        Self {
            parents: true,
            mode: None,
        }
    }
}

impl MkdirOptions {
    /// Toggle creation of missing ancestors.
    pub fn with_parents(mut self, parents: bool) -> Self {
        self.parents = parents;
        self
    }

    /// Set the permission bits.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documentation() {
        let w = WriteOptions::default();
        assert!(w.parents);
        assert!(w.content_type.is_none() && w.metadata.is_none() && w.mode.is_none());

        assert!(!DeleteOptions::default().recursive);

        let l = ListOptions::default();
        assert!(!l.recursive);
        assert_eq!(l.pattern, "*");

        let m = MkdirOptions::default();
        assert!(m.parents);
        assert!(m.mode.is_none());
    }

    #[test]
    fn with_attribute_accumulates() {
        let w = WriteOptions::default()
            .with_attribute("owner", "ops")
            .with_attribute("tier", "hot");
        let attrs = w.metadata.unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs["tier"], "hot");
    }

    #[test]
    fn carries_attributes_ignores_mode_and_parents() {
        let w = WriteOptions::default().with_mode(0o600).with_parents(false);
        assert!(!w.carries_attributes());
        assert!(w.with_content_type("text/plain").carries_attributes());
    }
}
