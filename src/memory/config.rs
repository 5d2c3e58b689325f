//! Defaults applied by the in-memory engine when a write leaves them open.

use crate::{DEFAULT_CONTENT_TYPE, Permissions};

/// Defaults for [`MemoryBackend`](super::MemoryBackend).
///
/// With the `serde` feature this deserializes from any format, and missing
/// fields fall back to [`MemoryConfig::default`]:
///
/// ```rust
/// # #[cfg(feature = "serde")] {
/// let config: storefs::MemoryConfig =
///     serde_json::from_str(r#"{ "default_content_type": "text/plain" }"#).unwrap();
/// assert_eq!(config.file_mode, 0o644);
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MemoryConfig {
    /// Content type stored for files written without one.
    pub default_content_type: String,
    /// Mode recorded for files written without one.
    pub file_mode: u32,
    /// Mode recorded for directories created without one, root included.
    pub dir_mode: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            file_mode: Permissions::default_file().mode(),
            dir_mode: Permissions::default_dir().mode(),
        }
    }
}

impl MemoryConfig {
    /// Set the content type used when a write does not supply one.
    pub fn with_default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    /// Set the mode recorded for new files.
    pub fn with_file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Set the mode recorded for new directories.
    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventional_modes() {
        let config = MemoryConfig::default();
        assert_eq!(config.default_content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(config.file_mode, 0o644);
        assert_eq!(config.dir_mode, 0o755);
        assert_eq!(config.dir_mode, Permissions::default_dir().mode());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: MemoryConfig = serde_json::from_str(r#"{ "dir_mode": 448 }"#).unwrap();
        assert_eq!(config.dir_mode, 0o700);
        assert_eq!(config.file_mode, 0o644);
    }
}
