//! Filesystem object classification and per-object outcomes

use selutils_errors::TraversalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of a filesystem object, read without following a trailing symlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Regular,
    Directory,
    Symlink,
    /// Devices, sockets, fifos.
    Other,
}

impl ObjectKind {
    #[must_use]
    pub fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "regular file"),
            Self::Directory => write!(f, "directory"),
            Self::Symlink => write!(f, "symbolic link"),
            Self::Other => write!(f, "special file"),
        }
    }
}

/// Result of visiting one object.
///
/// `kind` is `None` when the object could not be classified at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub path: PathBuf,
    pub kind: Option<ObjectKind>,
    pub error: Option<TraversalError>,
}

impl Outcome {
    /// An object whose label was applied.
    #[must_use]
    pub fn applied(path: impl Into<PathBuf>, kind: ObjectKind) -> Self {
        Self {
            path: path.into(),
            kind: Some(kind),
            error: None,
        }
    }

    /// An object that was visited but failed.
    #[must_use]
    pub fn failed(
        path: impl Into<PathBuf>,
        kind: Option<ObjectKind>,
        error: TraversalError,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Failure cause rendered for a diagnostic line.
    #[must_use]
    pub fn diagnostic(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}
