//! Path validation, lexical normalization and name filtering.
//!
//! Every backend funnels caller paths through [`normalize_path`] before
//! touching storage, so two spellings of one location always map to the
//! same canonical key.

use std::path::{Component, Path, PathBuf};

use crate::FsError;

/// Reject paths that can never name an entry.
///
/// # Errors
///
/// - [`FsError::InvalidPath`] if `path` is empty or contains a null byte
pub fn validate_path(path: &Path) -> Result<(), FsError> {
    let bytes = path.as_os_str().as_encoded_bytes();
    if bytes.is_empty() {
        return Err(invalid(path, "path is empty"));
    }
    if bytes.contains(&0) {
        return Err(invalid(path, "path contains a null byte"));
    }
    Ok(())
}

/// Validate and lexically canonicalize a path.
///
/// The result is absolute, has no `.`/`..` segments, no repeated
/// separators and no trailing slash (except the root `/` itself).
/// Relative paths are taken relative to `/`; `..` never climbs above root.
/// Symlinks are not consulted.
///
/// ```rust
/// use storefs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("a//b/./c/../d/")).unwrap(), PathBuf::from("/a/b/d"));
/// assert_eq!(normalize_path(Path::new("/..")).unwrap(), PathBuf::from("/"));
/// ```
///
/// # Errors
///
/// - [`FsError::InvalidPath`] if the path fails [`validate_path`]
pub fn normalize_path(path: &Path) -> Result<PathBuf, FsError> {
    validate_path(path)?;

    let mut normalized = PathBuf::from("/");
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(name) => normalized.push(name),
        }
    }
    Ok(normalized)
}

/// True if `path` lies strictly below `dir`.
///
/// The comparison is per component, so `/foobar` is not below `/foo`.
pub fn is_descendant(path: &Path, dir: &Path) -> bool {
    path != dir && path.starts_with(dir)
}

/// True if `path` is an immediate child of `dir`.
pub fn is_direct_child(path: &Path, dir: &Path) -> bool {
    path.parent() == Some(dir)
}

fn invalid(path: &Path, reason: &'static str) -> FsError {
    FsError::InvalidPath {
        path: path.to_string_lossy().into_owned(),
        reason,
    }
}

/// Compiled glob filter used by `list`.
///
/// Non-recursive listings match the pattern against the entry's basename;
/// recursive listings keep an entry when any of its segments below the
/// listed directory matches.
#[derive(Debug, Clone)]
pub struct NameFilter {
    pattern: glob::Pattern,
    match_all: bool,
}

impl NameFilter {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidPattern`] if the glob is malformed
    pub fn new(pattern: &str) -> Result<Self, FsError> {
        let compiled = glob::Pattern::new(pattern).map_err(|e| FsError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern: compiled,
            match_all: pattern == "*" || pattern == "**",
        })
    }

    /// Decide whether `entry` (a descendant of `dir`) passes the filter.
    pub fn matches(&self, entry: &Path, dir: &Path, recursive: bool) -> bool {
        if self.match_all {
            return true;
        }
        if !recursive {
            return entry
                .file_name()
                .is_some_and(|name| self.pattern.matches(&name.to_string_lossy()));
        }
        entry.strip_prefix(dir).is_ok_and(|relative| {
            relative
                .components()
                .any(|segment| self.pattern.matches(&segment.as_os_str().to_string_lossy()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn normalize_collapses_dots_and_separators() {
        let result = normalize_path(Path::new("/a/./b/../c"));
        assert_eq!(result.unwrap(), PathBuf::from("/a/c"));
        let result = normalize_path(Path::new("//a///b//"));
        assert_eq!(result.unwrap(), PathBuf::from("/a/b"));
    }

    #[test]
    fn normalize_root_forms() {
        for raw in ["/", "/.", "/..", "/a/..", "."] {
            assert_eq!(normalize_path(Path::new(raw)).unwrap(), PathBuf::from("/"));
        }
    }

    #[test]
    fn normalize_makes_relative_absolute() {
        let result = normalize_path(Path::new("docs/readme.md"));
        assert_eq!(result.unwrap(), PathBuf::from("/docs/readme.md"));
    }

    #[test]
    fn empty_path_is_invalid() {
        let err = normalize_path(Path::new("")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
    }

    #[test]
    fn null_byte_is_invalid() {
        let err = normalize_path(Path::new("/a\0b")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
    }

    #[test]
    fn descendant_respects_component_boundary() {
        assert!(is_descendant(Path::new("/foo/bar"), Path::new("/foo")));
        assert!(!is_descendant(Path::new("/foobar"), Path::new("/foo")));
        assert!(!is_descendant(Path::new("/foo"), Path::new("/foo")));
        assert!(is_descendant(Path::new("/foo"), Path::new("/")));
    }

    #[test]
    fn direct_child_only_one_level() {
        assert!(is_direct_child(Path::new("/d/a"), Path::new("/d")));
        assert!(!is_direct_child(Path::new("/d/s/a"), Path::new("/d")));
    }

    #[test]
    fn filter_matches_basename_when_flat() {
        let filter = NameFilter::new("*.txt").unwrap();
        assert!(filter.matches(Path::new("/d/a.txt"), Path::new("/d"), false));
        assert!(!filter.matches(Path::new("/d/sub"), Path::new("/d"), false));
    }

    #[test]
    fn filter_matches_any_segment_when_recursive() {
        let filter = NameFilter::new("sub").unwrap();
        assert!(filter.matches(Path::new("/d/sub/c.txt"), Path::new("/d"), true));
        assert!(!filter.matches(Path::new("/sub/d/c.txt"), Path::new("/sub/d"), true));
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        let err = NameFilter::new("[").unwrap_err();
        assert!(matches!(err, FsError::InvalidPattern { .. }));
    }
}
