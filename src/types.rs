//! Core types for the storage abstraction.

use std::collections::BTreeMap;
use std::time::SystemTime;

/// Content type reported when none was supplied on write.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// What occupies a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Content entry.
    File,
    /// Container for other entries.
    Directory,
    /// Pointer to another path.
    Symlink,
}

/// Everything a backend reports about one entry.
///
/// Directories report a size of 0. [`FsRead::metadata`](crate::FsRead::metadata)
/// follows symlinks, so `file_type` is only `Symlink` when obtained through
/// [`FsLink::symlink_metadata`](crate::FsLink::symlink_metadata).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Entry kind.
    pub file_type: FileType,
    /// Content length; 0 for directories, target length for links.
    pub size: u64,
    /// Permission bits. Informational only for the in-memory backend.
    pub permissions: Permissions,
    /// Set once, when the entry first appears.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub created: SystemTime,
    /// Advanced by every content write.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
    /// Advanced by reads where the backend tracks it.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub accessed: SystemTime,
    /// Content-type tag, [`DEFAULT_CONTENT_TYPE`] unless set on write.
    pub content_type: String,
    /// Caller-defined attributes.
    pub custom: BTreeMap<String, String>,
}

impl Metadata {
    /// Whether the entry holds content.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    /// Whether the entry is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Whether the entry is a link (only seen via `symlink_metadata`).
    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            file_type: FileType::File,
            size: 0,
            permissions: Permissions::default_file(),
            created: SystemTime::UNIX_EPOCH,
            modified: SystemTime::UNIX_EPOCH,
            accessed: SystemTime::UNIX_EPOCH,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            custom: BTreeMap::new(),
        }
    }
}

/// Permission bits in Unix `mode` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions(u32);

impl Permissions {
    /// Keep the low twelve bits of `mode`, dropping file-type bits.
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// The stored bits.
    #[inline]
    pub const fn mode(&self) -> u32 {
        self.0
    }

    /// No write bit is set for anyone.
    #[inline]
    pub const fn readonly(&self) -> bool {
        (self.0 & 0o222) == 0
    }

    /// `0o644`.
    #[inline]
    pub const fn default_file() -> Self {
        Self(0o644)
    }

    /// `0o755`.
    #[inline]
    pub const fn default_dir() -> Self {
        Self(0o755)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::default_file()
    }
}

/// Static feature flags a backend declares.
///
/// Query these before invoking optional operations; a backend that lacks a
/// capability fails the matching operation with
/// [`FsError::NotSupported`](crate::FsError::NotSupported).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    /// `symlink`, `read_link` and `symlink_metadata` work.
    pub symlinks: bool,
    /// The `mode` write/mkdir option is honoured.
    pub permissions: bool,
    /// `open_read` and the scoped streaming helpers work.
    pub streaming: bool,
    /// A `write` either fully replaces the content or leaves it untouched.
    pub atomic_writes: bool,
    /// The `content_type` and `metadata` write options are stored.
    pub custom_metadata: bool,
}

impl Capabilities {
    /// A backend that supports nothing optional.
    pub const NONE: Self = Self {
        symlinks: false,
        permissions: false,
        streaming: false,
        atomic_writes: false,
        custom_metadata: false,
    };
}

/// `SystemTime` as `(secs, nanos)` since the epoch.
#[cfg(feature = "serde")]
pub(crate) mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_kind_flags_are_exclusive() {
        for (file_type, expected) in [
            (FileType::File, (true, false, false)),
            (FileType::Directory, (false, true, false)),
            (FileType::Symlink, (false, false, true)),
        ] {
            let m = Metadata {
                file_type,
                ..Default::default()
            };
            assert_eq!((m.is_file(), m.is_dir(), m.is_symlink()), expected);
        }
    }

    #[test]
    fn metadata_default_content_type() {
        let m = Metadata::default();
        assert_eq!(m.content_type, "application/octet-stream");
        assert!(m.custom.is_empty());
    }

    #[test]
    fn permissions_from_mode_masks_extra_bits() {
        let p = Permissions::from_mode(0o100755);
        assert_eq!(p.mode(), 0o755);
    }

    #[test]
    fn permissions_readonly() {
        assert!(Permissions::from_mode(0o444).readonly());
        assert!(!Permissions::from_mode(0o644).readonly());
    }

    #[test]
    fn permissions_defaults() {
        assert_eq!(Permissions::default_file().mode(), 0o644);
        assert_eq!(Permissions::default_dir().mode(), 0o755);
    }

    #[test]
    fn capabilities_none_is_default() {
        assert_eq!(Capabilities::NONE, Capabilities::default());
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileType>();
        assert_send_sync::<Metadata>();
        assert_send_sync::<Permissions>();
        assert_send_sync::<Capabilities>();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn metadata_serde_round_trips_times() {
        let m = Metadata {
            modified: SystemTime::UNIX_EPOCH + std::time::Duration::new(5, 7),
            ..Default::default()
        };
        let json = serde_json::to_string(&m).unwrap();
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
