//! Bundle of the host collaborators handed to the traversal engine

use selutils_errors::PlatformError;

use crate::filesystem::Filesystem;
use crate::implementations::host::{HostFilesystem, XattrContextApplier};
use crate::label::{ContextApplier, LabelSource};

/// Filesystem view plus label applier for one invocation
pub struct Platform {
    filesystem: Box<dyn Filesystem>,
    applier: Box<dyn ContextApplier>,
}

impl Platform {
    /// Create a platform instance with the specified implementations
    pub fn new(filesystem: Box<dyn Filesystem>, applier: Box<dyn ContextApplier>) -> Self {
        Self {
            filesystem,
            applier,
        }
    }

    /// The running host, labelling through `xattr_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the label source cannot be resolved (for example an
    /// unreadable reference file).
    pub fn host(source: LabelSource, xattr_name: &str) -> Result<Self, PlatformError> {
        Ok(Self::new(
            Box::new(HostFilesystem::new()),
            Box::new(XattrContextApplier::new(source, xattr_name)?),
        ))
    }

    /// Access filesystem operations
    pub fn filesystem(&self) -> &dyn Filesystem {
        &*self.filesystem
    }

    /// Access the label applier
    pub fn applier(&self) -> &dyn ContextApplier {
        &*self.applier
    }
}
