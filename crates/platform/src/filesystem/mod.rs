//! Filesystem inspection used by the traversal engine

use selutils_errors::PlatformError;
use selutils_types::ObjectKind;
use std::path::{Path, PathBuf};

/// Device and inode pair identifying one filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub dev: u64,
    pub ino: u64,
}

/// Read-only view of the filesystem.
///
/// Implementations must not follow a trailing symlink unless the method says
/// so, and must report races (an entry vanishing between listing and
/// inspection) as errors rather than panicking.
pub trait Filesystem {
    /// Kind of the object itself, `lstat` style.
    fn classify(&self, path: &Path) -> Result<ObjectKind, PlatformError>;

    /// Target of a symlink, one level only. Relative targets are returned
    /// joined onto the link's parent directory.
    fn resolve_symlink(&self, path: &Path) -> Result<PathBuf, PlatformError>;

    /// Paths of the direct entries of a directory, `.` and `..` excluded.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>, PlatformError>;

    /// Identity of the object, following symlinks.
    fn identity(&self, path: &Path) -> Result<FileIdentity, PlatformError>;
}
