//! Host filesystem backend.
//!
//! Maps canonical virtual paths onto a directory of the host filesystem.
//! `/a/b.txt` on a backend rooted at `/srv/data` is `/srv/data/a/b.txt`.
//! Native failures are translated with [`FsError::from_io`].
//!
//! The host has no place for content types or custom attributes, so writes
//! that carry them fail with [`FsError::NotSupported`]. Permission bits and
//! symlinks are only available on Unix.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::path::{NameFilter, is_direct_child, normalize_path};
use crate::{
    Capabilities, DeleteOptions, FileType, FsDir, FsError, FsInfo, FsLink, FsRead, FsWrite,
    ListOptions, Metadata, MkdirOptions, Permissions, WriteOptions,
};

/// Storage backend over a host directory.
#[derive(Debug, Clone)]
pub struct DiskBackend {
    root: PathBuf,
}

impl DiskBackend {
    /// Serve the existing host directory `root` as `/`.
    ///
    /// The root is canonicalized once here (e.g. macOS `/tmp` becomes
    /// `/private/tmp`).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `root` does not exist
    /// - [`FsError::NotADirectory`] if `root` is not a directory
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, FsError> {
        let root: PathBuf = root.into();
        let root = fs::canonicalize(&root).map_err(|e| FsError::from_io("open", &root, e))?;
        if !root.is_dir() {
            return Err(FsError::NotADirectory { path: root });
        }
        tracing::debug!(root = %root.display(), "opened disk backend");
        Ok(Self { root })
    }

    /// The host directory serving as `/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical virtual path and the host path it maps to.
    fn locate(&self, path: &Path) -> Result<(PathBuf, PathBuf), FsError> {
        let virtual_path = normalize_path(path)?;
        let relative = virtual_path.strip_prefix("/").unwrap_or(&virtual_path);
        let host = self.root.join(relative);
        Ok((virtual_path, host))
    }

    fn to_virtual(&self, host: &Path) -> Option<PathBuf> {
        host.strip_prefix(&self.root)
            .ok()
            .map(|relative| Path::new("/").join(relative))
    }

    /// Number of directories between the root and the real directory
    /// holding `host_link`.
    #[cfg(unix)]
    fn depth_of_parent(&self, virtual_link: &Path, host_link: &Path) -> Result<usize, FsError> {
        let virtual_parent = virtual_link.parent().unwrap_or(Path::new("/"));
        let Some(parent) = host_link.parent() else {
            return Ok(0);
        };
        let physical =
            fs::canonicalize(parent).map_err(|e| FsError::from_io("symlink", virtual_parent, e))?;
        physical
            .strip_prefix(&self.root)
            .map(|relative| relative.components().count())
            .map_err(|_| FsError::symlink(virtual_link, "link directory lies outside the backend root"))
    }

    fn reject_attributes(opts: &WriteOptions) -> Result<(), FsError> {
        if opts.carries_attributes() {
            return Err(FsError::NotSupported {
                operation: "custom metadata",
            });
        }
        Ok(())
    }

    fn prepare_parent(virtual_path: &Path, host: &Path, create: bool) -> Result<(), FsError> {
        let Some(parent) = host.parent() else {
            return Ok(());
        };
        let virtual_parent = virtual_path.parent().unwrap_or(Path::new("/"));
        match fs::metadata(parent) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(FsError::NotADirectory {
                path: virtual_parent.to_path_buf(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound && create => fs::create_dir_all(parent)
                .map_err(|e| FsError::from_io("create parents", virtual_parent, e)),
            Err(e) => Err(FsError::from_io("write", virtual_parent, e)),
        }
    }
}

#[cfg(unix)]
fn apply_mode(host: &Path, virtual_path: &Path, mode: Option<u32>) -> Result<(), FsError> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        fs::set_permissions(host, fs::Permissions::from_mode(mode))
            .map_err(|e| FsError::from_io("set permissions", virtual_path, e))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_: &Path, _: &Path, mode: Option<u32>) -> Result<(), FsError> {
    match mode {
        Some(_) => Err(FsError::NotSupported {
            operation: "permissions",
        }),
        None => Ok(()),
    }
}

#[cfg(unix)]
fn mode_of(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

fn convert_metadata(meta: &fs::Metadata) -> Metadata {
    let file_type = if meta.file_type().is_symlink() {
        FileType::Symlink
    } else if meta.is_dir() {
        FileType::Directory
    } else {
        FileType::File
    };
    let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    Metadata {
        file_type,
        size: if meta.is_dir() { 0 } else { meta.len() },
        permissions: Permissions::from_mode(mode_of(meta)),
        created: meta.created().unwrap_or(modified),
        modified,
        accessed: meta.accessed().unwrap_or(modified),
        ..Default::default()
    }
}

impl FsRead for DiskBackend {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        let (virtual_path, host) = self.locate(path)?;
        fs::read(&host).map_err(|e| FsError::from_io("read", &virtual_path, e))
    }

    fn exists(&self, path: &Path) -> Result<bool, FsError> {
        let (virtual_path, host) = self.locate(path)?;
        match fs::symlink_metadata(&host) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FsError::from_io("exists", &virtual_path, e)),
        }
    }

    fn metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let (virtual_path, host) = self.locate(path)?;
        let meta = fs::metadata(&host).map_err(|e| FsError::from_io("metadata", &virtual_path, e))?;
        Ok(convert_metadata(&meta))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FsError> {
        let (virtual_path, host) = self.locate(path)?;
        if host.is_dir() {
            return Err(FsError::NotAFile { path: virtual_path });
        }
        let file = fs::File::open(&host).map_err(|e| FsError::from_io("open_read", &virtual_path, e))?;
        Ok(Box::new(io::BufReader::new(file)))
    }
}

impl FsWrite for DiskBackend {
    fn write(&self, path: &Path, data: &[u8], opts: &WriteOptions) -> Result<(), FsError> {
        Self::reject_attributes(opts)?;
        let (virtual_path, host) = self.locate(path)?;
        if host.is_dir() {
            return Err(FsError::NotAFile { path: virtual_path });
        }
        Self::prepare_parent(&virtual_path, &host, opts.parents)?;
        // Written in place so an overwrite keeps the file's creation time.
        fs::write(&host, data).map_err(|e| FsError::from_io("write", &virtual_path, e))?;
        apply_mode(&host, &virtual_path, opts.mode)?;
        tracing::debug!(path = %virtual_path.display(), size = data.len(), "wrote file to disk");
        Ok(())
    }

    fn delete(&self, path: &Path, opts: &DeleteOptions) -> Result<(), FsError> {
        let (virtual_path, host) = self.locate(path)?;
        if host == self.root {
            return Err(FsError::InvalidPath {
                path: "/".to_string(),
                reason: "the root directory cannot be removed",
            });
        }
        let meta = fs::symlink_metadata(&host)
            .map_err(|e| FsError::from_io("delete", &virtual_path, e))?;
        let result = if meta.is_dir() && opts.recursive {
            fs::remove_dir_all(&host)
        } else if meta.is_dir() {
            fs::remove_dir(&host)
        } else {
            fs::remove_file(&host)
        };
        result.map_err(|e| FsError::from_io("delete", &virtual_path, e))?;
        tracing::debug!(path = %virtual_path.display(), recursive = opts.recursive, "deleted from disk");
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path, opts: &WriteOptions) -> Result<(), FsError> {
        Self::reject_attributes(opts)?;
        let (virtual_from, host_from) = self.locate(from)?;
        let (virtual_to, host_to) = self.locate(to)?;
        let meta = fs::metadata(&host_from).map_err(|e| FsError::from_io("copy", &virtual_from, e))?;
        if meta.is_dir() {
            return Err(FsError::NotAFile { path: virtual_from });
        }
        if host_to.is_dir() {
            return Err(FsError::NotAFile { path: virtual_to });
        }
        Self::prepare_parent(&virtual_to, &host_to, opts.parents)?;
        fs::copy(&host_from, &host_to).map_err(|e| FsError::from_io("copy", &virtual_to, e))?;
        apply_mode(&host_to, &virtual_to, opts.mode)?;
        tracing::debug!(from = %virtual_from.display(), to = %virtual_to.display(), "copied on disk");
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path, opts: &WriteOptions) -> Result<(), FsError> {
        let (virtual_from, host_from) = self.locate(from)?;
        let (virtual_to, host_to) = self.locate(to)?;
        fs::symlink_metadata(&host_from)
            .map_err(|e| FsError::from_io("rename", &virtual_from, e))?;
        if same_entry(&host_from, &host_to) {
            tracing::debug!(from = %virtual_from.display(), to = %virtual_to.display(), "rename onto the same file skipped");
            return Ok(());
        }
        self.copy(&virtual_from, &virtual_to, opts)?;
        self.delete(&virtual_from, &DeleteOptions::default())
    }
}

/// Whether a relative `target`, read from a directory `depth` levels below
/// the root, steps above the root at any point.
#[cfg(unix)]
fn climbs_above(depth: usize, target: &Path) -> bool {
    use std::path::Component;

    let mut depth = depth;
    for component in target.components() {
        match component {
            Component::ParentDir => match depth.checked_sub(1) {
                Some(up) => depth = up,
                None => return true,
            },
            Component::Normal(_) => depth += 1,
            _ => {}
        }
    }
    false
}

/// Whether `from` and `to` land on the same host file once links are
/// followed. `to` need not exist yet.
fn same_entry(from: &Path, to: &Path) -> bool {
    if from == to {
        return true;
    }
    let Ok(source) = fs::canonicalize(from) else {
        return false;
    };
    let dest = match fs::canonicalize(to) {
        Ok(dest) => dest,
        Err(_) => match (to.parent(), to.file_name()) {
            (Some(dir), Some(name)) => match fs::canonicalize(dir) {
                Ok(dir) => dir.join(name),
                Err(_) => return false,
            },
            _ => return false,
        },
    };
    source == dest
}

impl FsDir for DiskBackend {
    fn list(&self, path: &Path, opts: &ListOptions) -> Result<Vec<PathBuf>, FsError> {
        let (virtual_path, host) = self.locate(path)?;
        let filter = NameFilter::new(&opts.pattern)?;
        let meta = fs::metadata(&host).map_err(|e| FsError::from_io("list", &virtual_path, e))?;
        if !meta.is_dir() {
            return Err(FsError::NotADirectory { path: virtual_path });
        }

        let mut found = Vec::new();
        let mut pending = vec![(virtual_path.clone(), host)];
        while let Some((virtual_dir, host_dir)) = pending.pop() {
            let entries = fs::read_dir(&host_dir)
                .map_err(|e| FsError::from_io("list", &virtual_dir, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| FsError::from_io("list", &virtual_dir, e))?;
                let child = virtual_dir.join(entry.file_name());
                let is_real_dir = entry.file_type().is_ok_and(|t| t.is_dir());
                if opts.recursive && is_real_dir {
                    pending.push((child.clone(), entry.path()));
                }
                found.push(child);
            }
        }

        found.retain(|entry| {
            (opts.recursive || is_direct_child(entry, &virtual_path))
                && filter.matches(entry, &virtual_path, opts.recursive)
        });
        found.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        Ok(found)
    }

    fn mkdir(&self, path: &Path, opts: &MkdirOptions) -> Result<(), FsError> {
        let (virtual_path, host) = self.locate(path)?;
        if fs::symlink_metadata(&host).is_ok() {
            return Err(FsError::AlreadyExists {
                path: virtual_path,
                operation: "mkdir",
            });
        }
        let result = if opts.parents {
            fs::create_dir_all(&host)
        } else {
            fs::create_dir(&host)
        };
        result.map_err(|e| FsError::from_io("mkdir", &virtual_path, e))?;
        apply_mode(&host, &virtual_path, opts.mode)?;
        tracing::debug!(path = %virtual_path.display(), "created directory on disk");
        Ok(())
    }

    fn rmdir(&self, path: &Path, opts: &DeleteOptions) -> Result<(), FsError> {
        let (virtual_path, host) = self.locate(path)?;
        let meta = fs::symlink_metadata(&host)
            .map_err(|e| FsError::from_io("rmdir", &virtual_path, e))?;
        if !meta.is_dir() {
            return Err(FsError::NotADirectory { path: virtual_path });
        }
        self.delete(&virtual_path, opts)
    }
}

#[cfg(unix)]
impl FsLink for DiskBackend {
    fn symlink(&self, target: &Path, link: &Path) -> Result<(), FsError> {
        let (virtual_link, host_link) = self.locate(link)?;
        if fs::symlink_metadata(&host_link).is_ok() {
            return Err(FsError::symlink(virtual_link, "link path already exists"));
        }
        // Absolute targets are rebased under the root; relative ones are
        // stored as given once they are known to stay inside it.
        let host_target = if target.is_absolute() {
            self.locate(target)?.1
        } else {
            crate::path::validate_path(target)?;
            let depth = self.depth_of_parent(&virtual_link, &host_link)?;
            if climbs_above(depth, target) {
                return Err(FsError::InvalidPath {
                    path: target.display().to_string(),
                    reason: "symlink target escapes the backend root",
                });
            }
            target.to_path_buf()
        };

        std::os::unix::fs::symlink(&host_target, &host_link)
            .map_err(|e| FsError::from_io("symlink", &virtual_link, e))?;
        tracing::debug!(link = %virtual_link.display(), target = %target.display(), "created symlink on disk");
        Ok(())
    }

    fn is_symlink(&self, path: &Path) -> Result<bool, FsError> {
        let (virtual_path, host) = self.locate(path)?;
        match fs::symlink_metadata(&host) {
            Ok(meta) => Ok(meta.file_type().is_symlink()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FsError::from_io("is_symlink", &virtual_path, e)),
        }
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, FsError> {
        let (virtual_path, host) = self.locate(path)?;
        let meta = fs::symlink_metadata(&host)
            .map_err(|e| FsError::from_io("read_link", &virtual_path, e))?;
        if !meta.file_type().is_symlink() {
            return Err(FsError::symlink(virtual_path, "not a symlink"));
        }
        let host_target = fs::read_link(&host)
            .map_err(|e| FsError::from_io("read_link", &virtual_path, e))?;
        match fs::metadata(&host) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FsError::symlink(virtual_path, "broken link: target does not exist"));
            }
            Err(e) => return Err(FsError::from_io("read_link", &virtual_path, e)),
        }
        if host_target.is_relative() {
            return Ok(host_target);
        }
        self.to_virtual(&host_target)
            .ok_or_else(|| FsError::symlink(virtual_path, "target lies outside the backend root"))
    }

    fn symlink_metadata(&self, path: &Path) -> Result<Metadata, FsError> {
        let (virtual_path, host) = self.locate(path)?;
        let meta = fs::symlink_metadata(&host)
            .map_err(|e| FsError::from_io("symlink_metadata", &virtual_path, e))?;
        Ok(convert_metadata(&meta))
    }
}

#[cfg(not(unix))]
impl FsLink for DiskBackend {}

impl FsInfo for DiskBackend {
    fn scheme(&self) -> &'static str {
        "file"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            symlinks: cfg!(unix),
            permissions: cfg!(unix),
            streaming: true,
            atomic_writes: false,
            custom_metadata: false,
        }
    }

    /// `file://` URI of the host path backing `path`.
    fn uri_for(&self, path: &Path) -> Result<String, FsError> {
        let (_, host) = self.locate(path)?;
        Ok(format!("file://{}", host.display()))
    }
}
