//! Engine state: four maps keyed by canonical path, plus a clock.
//!
//! Every key is the output of [`normalize_path`](crate::normalize_path).
//! A path appears in at most one of `files`, `dirs` and `symlinks`, and
//! every present path has an entry in `metadata`. `/` is always a
//! directory.

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::ops::Bound;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::MemoryConfig;
use crate::path::is_descendant;
use crate::{FileType, FsError, MAX_SYMLINK_HOPS, Metadata, Permissions, WriteOptions};

/// Per-entry attributes.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct EntryMeta {
    pub(super) created: SystemTime,
    pub(super) modified: SystemTime,
    pub(super) accessed: SystemTime,
    pub(super) mode: u32,
    pub(super) content_type: String,
    pub(super) custom: BTreeMap<String, String>,
}

#[derive(Debug)]
pub(super) struct State {
    pub(super) files: BTreeMap<PathBuf, Vec<u8>>,
    pub(super) dirs: BTreeSet<PathBuf>,
    pub(super) symlinks: BTreeMap<PathBuf, PathBuf>,
    pub(super) metadata: BTreeMap<PathBuf, EntryMeta>,
    config: MemoryConfig,
    last_tick: SystemTime,
}

impl State {
    pub(super) fn new(config: MemoryConfig) -> Self {
        let mut state = Self {
            files: BTreeMap::new(),
            dirs: BTreeSet::new(),
            symlinks: BTreeMap::new(),
            metadata: BTreeMap::new(),
            config,
            last_tick: SystemTime::UNIX_EPOCH,
        };
        state.install_root();
        state
    }

    fn install_root(&mut self) {
        let mode = self.config.dir_mode;
        self.insert_dir(PathBuf::from("/"), mode);
    }

    /// Drop every entry except a fresh root. The clock keeps running.
    pub(super) fn reset(&mut self) {
        self.files.clear();
        self.dirs.clear();
        self.symlinks.clear();
        self.metadata.clear();
        self.install_root();
    }

    /// Current time, strictly later than any earlier tick.
    pub(super) fn tick(&mut self) -> SystemTime {
        let now = SystemTime::now();
        self.last_tick = if now > self.last_tick {
            now
        } else {
            self.last_tick + Duration::from_micros(1)
        };
        self.last_tick
    }

    pub(super) fn kind(&self, path: &Path) -> Option<FileType> {
        if self.files.contains_key(path) {
            Some(FileType::File)
        } else if self.dirs.contains(path) {
            Some(FileType::Directory)
        } else if self.symlinks.contains_key(path) {
            Some(FileType::Symlink)
        } else {
            None
        }
    }

    /// Follow symlinks in every component of `path`.
    ///
    /// Relative targets are taken from the directory holding the link.
    /// The result never names a symlink but may name nothing; callers
    /// decide whether that is an error.
    pub(super) fn resolve(&self, path: &Path) -> Result<PathBuf, FsError> {
        let mut resolved = PathBuf::from("/");
        let mut pending = Vec::new();
        push_steps(&mut pending, path);
        let mut hops = 0;

        while let Some(step) = pending.pop() {
            let name = match step {
                Step::Up => {
                    resolved.pop();
                    continue;
                }
                Step::Enter(name) => name,
            };
            let candidate = resolved.join(&name);
            let Some(target) = self.symlinks.get(&candidate) else {
                resolved = candidate;
                continue;
            };
            hops += 1;
            if hops > MAX_SYMLINK_HOPS {
                return Err(FsError::symlink(
                    path,
                    format!("too many levels of symbolic links (limit {MAX_SYMLINK_HOPS}), likely a cycle"),
                ));
            }
            tracing::trace!(link = %candidate.display(), target = %target.display(), "following symlink");
            if target.is_absolute() {
                resolved = PathBuf::from("/");
            }
            push_steps(&mut pending, target);
        }
        Ok(resolved)
    }

    /// Resolve everything but the final component, which is kept as is.
    pub(super) fn resolve_parent(&self, path: &Path) -> Result<PathBuf, FsError> {
        match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => Ok(self.resolve(parent)?.join(name)),
            _ => Ok(path.to_path_buf()),
        }
    }

    /// Check (and with `create`, build) the directory chain above `path`.
    ///
    /// Walks upwards until it meets an existing directory, then creates
    /// the missing levels top-down.
    pub(super) fn ensure_parents(&mut self, path: &Path, create: bool) -> Result<(), FsError> {
        let mut missing = Vec::new();
        let mut cursor = path.parent();
        while let Some(dir) = cursor {
            match self.kind(dir) {
                Some(FileType::Directory) => break,
                Some(_) => {
                    return Err(FsError::NotADirectory {
                        path: dir.to_path_buf(),
                    });
                }
                None if !create => return Err(FsError::not_found(dir)),
                None => {
                    missing.push(dir.to_path_buf());
                    cursor = dir.parent();
                }
            }
        }
        let mode = self.config.dir_mode;
        for dir in missing.into_iter().rev() {
            tracing::debug!(path = %dir.display(), "created missing parent directory");
            self.insert_dir(dir, mode);
        }
        Ok(())
    }

    pub(super) fn default_dir_mode(&self) -> u32 {
        self.config.dir_mode
    }

    pub(super) fn insert_dir(&mut self, path: PathBuf, mode: u32) {
        let now = self.tick();
        let meta = self.fresh_meta(now, mode);
        self.metadata.insert(path.clone(), meta);
        self.dirs.insert(path);
    }

    pub(super) fn insert_symlink(&mut self, link: PathBuf, target: PathBuf) {
        let now = self.tick();
        let meta = self.fresh_meta(now, 0o777);
        self.metadata.insert(link.clone(), meta);
        self.symlinks.insert(link, target);
    }

    fn fresh_meta(&self, now: SystemTime, mode: u32) -> EntryMeta {
        EntryMeta {
            created: now,
            modified: now,
            accessed: now,
            mode,
            content_type: self.config.default_content_type.clone(),
            custom: BTreeMap::new(),
        }
    }

    /// Store `data` at `path`, following symlinks.
    ///
    /// Attribute precedence: `opts`, then `inherit` (a copy source), then
    /// the overwritten file, then the configured defaults. Overwrites keep
    /// the original creation time.
    pub(super) fn write_file(
        &mut self,
        path: &Path,
        data: Vec<u8>,
        opts: &WriteOptions,
        inherit: Option<&EntryMeta>,
    ) -> Result<(), FsError> {
        let target = self.resolve(path)?;
        if self.kind(&target) == Some(FileType::Directory) {
            return Err(FsError::NotAFile { path: target });
        }
        self.ensure_parents(&target, opts.parents)?;

        let now = self.tick();
        let previous = self.metadata.get(&target).cloned();
        let created = previous.as_ref().map_or(now, |m| m.created);
        let fallback = inherit.or(previous.as_ref());
        let content_type = opts
            .content_type
            .clone()
            .or_else(|| fallback.map(|m| m.content_type.clone()))
            .unwrap_or_else(|| self.config.default_content_type.clone());
        let custom = opts
            .metadata
            .clone()
            .or_else(|| fallback.map(|m| m.custom.clone()))
            .unwrap_or_default();
        let mode = opts
            .mode
            .or(fallback.map(|m| m.mode))
            .unwrap_or(self.config.file_mode);

        tracing::debug!(path = %target.display(), size = data.len(), "wrote file");
        self.files.insert(target.clone(), data);
        self.metadata.insert(
            target,
            EntryMeta {
                created,
                modified: now,
                accessed: now,
                mode,
                content_type,
                custom,
            },
        );
        Ok(())
    }

    /// Content and attributes of the file `path` resolves to.
    pub(super) fn file_at(&self, path: &Path) -> Result<(PathBuf, &[u8], Option<&EntryMeta>), FsError> {
        let target = self.resolve(path)?;
        match self.files.get(&target) {
            Some(data) => {
                let meta = self.metadata.get(&target);
                Ok((target, data.as_slice(), meta))
            }
            None if self.dirs.contains(&target) => Err(FsError::NotAFile { path: target }),
            None => Err(FsError::not_found(target)),
        }
    }

    pub(super) fn touch_accessed(&mut self, path: &Path) {
        let now = self.tick();
        if let Some(meta) = self.metadata.get_mut(path) {
            meta.accessed = now;
        }
    }

    /// Every path strictly below `dir`, in string order.
    pub(super) fn descendants(&self, dir: &Path) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = keys_below(&self.files, dir)
            .chain(keys_below(&self.symlinks, dir))
            .cloned()
            .collect();
        found.extend(
            self.dirs
                .range::<Path, _>((Bound::Excluded(dir), Bound::Unbounded))
                .take_while(|p| is_descendant(p, dir))
                .cloned(),
        );
        // `Path` ordering is per component (`/a/c` < `/a-b`); listings are
        // ordered by the canonical string instead.
        found.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        found
    }

    fn has_descendants(&self, dir: &Path) -> bool {
        keys_below(&self.files, dir).next().is_some()
            || keys_below(&self.symlinks, dir).next().is_some()
            || self
                .dirs
                .range::<Path, _>((Bound::Excluded(dir), Bound::Unbounded))
                .next()
                .is_some_and(|p| is_descendant(p, dir))
    }

    pub(super) fn remove_entry(&mut self, path: &Path) {
        self.files.remove(path);
        self.dirs.remove(path);
        self.symlinks.remove(path);
        self.metadata.remove(path);
    }

    /// Remove the directory `path`, with its subtree when `recursive`.
    pub(super) fn remove_dir(&mut self, path: &Path, recursive: bool) -> Result<(), FsError> {
        if path == Path::new("/") {
            return Err(FsError::InvalidPath {
                path: "/".to_string(),
                reason: "the root directory cannot be removed",
            });
        }
        if self.has_descendants(path) {
            if !recursive {
                return Err(FsError::DirectoryNotEmpty {
                    path: path.to_path_buf(),
                });
            }
            for child in self.descendants(path) {
                self.remove_entry(&child);
            }
        }
        self.remove_entry(path);
        tracing::debug!(path = %path.display(), recursive, "removed directory");
        Ok(())
    }

    /// Public view of the entry stored at exactly `path`.
    pub(super) fn describe(&self, path: &Path, file_type: FileType) -> Metadata {
        let size = match file_type {
            FileType::File => self.files.get(path).map_or(0, |d| d.len() as u64),
            FileType::Directory => 0,
            FileType::Symlink => self
                .symlinks
                .get(path)
                .map_or(0, |t| t.as_os_str().len() as u64),
        };
        match self.metadata.get(path) {
            Some(meta) => Metadata {
                file_type,
                size,
                permissions: Permissions::from_mode(meta.mode),
                created: meta.created,
                modified: meta.modified,
                accessed: meta.accessed,
                content_type: meta.content_type.clone(),
                custom: meta.custom.clone(),
            },
            None => Metadata {
                file_type,
                size,
                ..Default::default()
            },
        }
    }
}

enum Step {
    Up,
    Enter(OsString),
}

/// Queue the components of `path` so they pop off in order.
fn push_steps(pending: &mut Vec<Step>, path: &Path) {
    for component in path.components().rev() {
        match component {
            Component::Normal(name) => pending.push(Step::Enter(name.to_os_string())),
            Component::ParentDir => pending.push(Step::Up),
            _ => {}
        }
    }
}

fn keys_below<'a, V>(
    map: &'a BTreeMap<PathBuf, V>,
    dir: &'a Path,
) -> impl Iterator<Item = &'a PathBuf> + 'a {
    // Path ordering is per component, so a subtree is one contiguous run.
    map.range::<Path, _>((Bound::Excluded(dir), Bound::Unbounded))
        .map(|(key, _)| key)
        .take_while(move |key| is_descendant(key, dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> State {
        State::new(MemoryConfig::default())
    }

    #[test]
    fn new_state_has_only_root() {
        let s = state();
        assert_eq!(s.kind(Path::new("/")), Some(FileType::Directory));
        assert_eq!(s.dirs.len(), 1);
        assert!(s.files.is_empty() && s.symlinks.is_empty());
        assert_eq!(s.metadata.len(), 1);
    }

    #[test]
    fn tick_is_strictly_increasing() {
        let mut s = state();
        let mut last = s.tick();
        for _ in 0..1000 {
            let next = s.tick();
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn resolve_follows_intermediate_links() {
        let mut s = state();
        s.insert_dir(PathBuf::from("/real"), 0o755);
        s.insert_symlink(PathBuf::from("/alias"), PathBuf::from("/real"));
        let resolved = s.resolve(Path::new("/alias/f.txt")).unwrap();
        assert_eq!(resolved, PathBuf::from("/real/f.txt"));
    }

    #[test]
    fn resolve_parent_keeps_final_link() {
        let mut s = state();
        s.insert_symlink(PathBuf::from("/l"), PathBuf::from("/elsewhere"));
        assert_eq!(s.resolve_parent(Path::new("/l")).unwrap(), PathBuf::from("/l"));
    }

    #[test]
    fn resolve_detects_cycle() {
        let mut s = state();
        s.insert_symlink(PathBuf::from("/a"), PathBuf::from("/b"));
        s.insert_symlink(PathBuf::from("/b"), PathBuf::from("/a"));
        let err = s.resolve(Path::new("/a")).unwrap_err();
        assert!(matches!(err, FsError::Symlink { .. }));
    }

    #[test]
    fn ensure_parents_creates_chain_top_down() {
        let mut s = state();
        s.ensure_parents(Path::new("/a/b/c/file"), true).unwrap();
        for dir in ["/a", "/a/b", "/a/b/c"] {
            assert_eq!(s.kind(Path::new(dir)), Some(FileType::Directory));
        }
        let a = &s.metadata[Path::new("/a")];
        let c = &s.metadata[Path::new("/a/b/c")];
        assert!(a.created < c.created);
    }

    #[test]
    fn ensure_parents_without_create_reports_missing_dir() {
        let mut s = state();
        let err = s.ensure_parents(Path::new("/a/b/file"), false).unwrap_err();
        assert!(matches!(err, FsError::NotFound { path } if path == Path::new("/a/b")));
    }

    #[test]
    fn descendants_do_not_leak_into_siblings() {
        let mut s = state();
        s.insert_dir(PathBuf::from("/d"), 0o755);
        s.insert_dir(PathBuf::from("/d/sub"), 0o755);
        s.insert_dir(PathBuf::from("/d0"), 0o755);
        s.insert_dir(PathBuf::from("/d-x"), 0o755);
        assert_eq!(s.descendants(Path::new("/d")), vec![PathBuf::from("/d/sub")]);
        assert!(s.has_descendants(Path::new("/d")));
        assert!(!s.has_descendants(Path::new("/d0")));
    }

    #[test]
    fn resolve_relative_target_from_link_directory() {
        let mut s = state();
        s.insert_dir(PathBuf::from("/a"), 0o755);
        s.insert_dir(PathBuf::from("/a/b"), 0o755);
        s.insert_symlink(PathBuf::from("/a/b/up"), PathBuf::from("../sibling"));
        s.insert_symlink(PathBuf::from("/a/b/here"), PathBuf::from("file"));
        assert_eq!(s.resolve(Path::new("/a/b/up")).unwrap(), PathBuf::from("/a/sibling"));
        assert_eq!(s.resolve(Path::new("/a/b/here")).unwrap(), PathBuf::from("/a/b/file"));
    }

    #[test]
    fn resolve_relative_parent_stops_at_root() {
        let mut s = state();
        s.insert_symlink(PathBuf::from("/l"), PathBuf::from("../../x"));
        assert_eq!(s.resolve(Path::new("/l")).unwrap(), PathBuf::from("/x"));
    }

    #[test]
    fn descendants_are_in_string_order() {
        let mut s = state();
        s.insert_dir(PathBuf::from("/d"), 0o755);
        s.insert_dir(PathBuf::from("/d/a"), 0o755);
        s.insert_dir(PathBuf::from("/d/a/c"), 0o755);
        s.insert_dir(PathBuf::from("/d/a-b"), 0o755);
        assert_eq!(
            s.descendants(Path::new("/d")),
            vec![
                PathBuf::from("/d/a"),
                PathBuf::from("/d/a-b"),
                PathBuf::from("/d/a/c"),
            ]
        );
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut s = state();
        let err = s.remove_dir(Path::new("/"), true).unwrap_err();
        assert!(matches!(err, FsError::InvalidPath { .. }));
    }
}
