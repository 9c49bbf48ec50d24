//! Filesystem inspection backed by `std::fs`

use selutils_errors::PlatformError;
use selutils_types::ObjectKind;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use crate::filesystem::{FileIdentity, Filesystem};

/// The real filesystem of the running host
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFilesystem;

impl HostFilesystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn kind_of(file_type: fs::FileType) -> ObjectKind {
    if file_type.is_symlink() {
        ObjectKind::Symlink
    } else if file_type.is_dir() {
        ObjectKind::Directory
    } else if file_type.is_file() {
        ObjectKind::Regular
    } else {
        ObjectKind::Other
    }
}

impl Filesystem for HostFilesystem {
    fn classify(&self, path: &Path) -> Result<ObjectKind, PlatformError> {
        let metadata = fs::symlink_metadata(path)
            .map_err(|e| PlatformError::from_io("lstat", path, &e))?;
        Ok(kind_of(metadata.file_type()))
    }

    fn resolve_symlink(&self, path: &Path) -> Result<PathBuf, PlatformError> {
        let target = fs::read_link(path).map_err(|e| PlatformError::from_io("readlink", path, &e))?;
        if target.is_absolute() {
            return Ok(target);
        }
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.join(target)),
            _ => Ok(target),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, PlatformError> {
        let entries = fs::read_dir(path).map_err(|e| PlatformError::from_io("opendir", path, &e))?;
        let mut paths = Vec::new();
        for entry in entries {
            // Keep the directory's own path as spelled by the caller.
            let entry = entry.map_err(|e| PlatformError::from_io("readdir", path, &e))?;
            paths.push(path.join(entry.file_name()));
        }
        Ok(paths)
    }

    fn identity(&self, path: &Path) -> Result<FileIdentity, PlatformError> {
        let metadata = fs::metadata(path).map_err(|e| PlatformError::from_io("stat", path, &e))?;
        Ok(FileIdentity {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;

    #[test]
    fn test_classify_does_not_follow_links() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();
        let link = dir.path().join("link");
        symlink(&target, &link).unwrap();
        fs::write(dir.path().join("file"), b"x").unwrap();

        let host = HostFilesystem::new();
        assert_eq!(host.classify(&target).unwrap(), ObjectKind::Directory);
        assert_eq!(host.classify(&link).unwrap(), ObjectKind::Symlink);
        assert_eq!(
            host.classify(&dir.path().join("file")).unwrap(),
            ObjectKind::Regular
        );
        assert!(host.classify(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_resolve_relative_target() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("link");
        symlink("sub/file", &link).unwrap();

        let host = HostFilesystem::new();
        assert_eq!(
            host.resolve_symlink(&link).unwrap(),
            dir.path().join("sub/file")
        );
    }

    #[test]
    fn test_read_dir_joins_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), b"").unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();

        let host = HostFilesystem::new();
        let mut entries = host.read_dir(dir.path()).unwrap();
        entries.sort();
        assert_eq!(entries, vec![dir.path().join("a"), dir.path().join("b")]);
    }

    #[test]
    fn test_identity_follows_links() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("self");
        symlink(dir.path(), &link).unwrap();

        let host = HostFilesystem::new();
        assert_eq!(
            host.identity(&link).unwrap(),
            host.identity(dir.path()).unwrap()
        );
    }
}
