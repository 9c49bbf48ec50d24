//! Security label mutation

use selutils_errors::PlatformError;
use selutils_types::{ContextComponents, SecurityContext};
use std::path::{Path, PathBuf};

/// Sets the security label on exactly the named object.
///
/// `apply` never resolves the path: a symlink gets its own label, never its
/// target's. It must not touch file content, and applying the same label
/// twice must succeed both times.
pub trait ContextApplier {
    fn apply(&self, path: &Path) -> Result<(), PlatformError>;
}

impl<T: ContextApplier + ?Sized> ContextApplier for &T {
    fn apply(&self, path: &Path) -> Result<(), PlatformError> {
        (**self).apply(path)
    }
}

impl<T: ContextApplier + ?Sized> ContextApplier for Box<T> {
    fn apply(&self, path: &Path) -> Result<(), PlatformError> {
        (**self).apply(path)
    }
}

/// Where the label to apply comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelSource {
    /// A complete context given on the command line.
    Context(SecurityContext),
    /// Copy the context of a reference file.
    Reference(PathBuf),
    /// Replace selected fields of each object's current context.
    Components(ContextComponents),
}
