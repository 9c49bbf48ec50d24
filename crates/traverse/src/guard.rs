//! Refusal to recurse into the filesystem root

use selutils_platform::{FileIdentity, Filesystem};
use std::path::{Component, Path};

/// Decides whether a directory is the filesystem root.
///
/// The root's identity is read once per run. Comparing identities rather
/// than spellings catches `//`, `/.`, `/..` and symlinks that point at `/`.
#[derive(Debug, Clone, Copy)]
pub struct RootGuard {
    root: Option<FileIdentity>,
}

impl RootGuard {
    /// Capture the identity of `/` through `filesystem`.
    ///
    /// If `/` cannot be inspected the guard falls back to a lexical check.
    #[must_use]
    pub fn capture(filesystem: &dyn Filesystem) -> Self {
        let root = match filesystem.identity(Path::new("/")) {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::warn!(error = %err, "cannot stat '/', root guard falls back to path comparison");
                None
            }
        };
        Self { root }
    }

    /// Whether the directory at `path`, with identity `identity` if known, is
    /// the root.
    #[must_use]
    pub fn refuses(&self, path: &Path, identity: Option<FileIdentity>) -> bool {
        match (self.root, identity) {
            (Some(root), Some(identity)) => root == identity,
            _ => is_lexical_root(path),
        }
    }
}

fn is_lexical_root(path: &Path) -> bool {
    path.has_root()
        && path.components().all(|component| {
            matches!(
                component,
                Component::RootDir | Component::CurDir | Component::ParentDir
            )
        })
}
