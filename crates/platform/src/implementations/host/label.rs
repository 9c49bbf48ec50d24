//! Label mutation through the security extended attribute

use selutils_errors::PlatformError;
use selutils_types::{ContextComponents, SecurityContext};
use std::fs::File;
use std::io;
use std::path::Path;
use xattr::FileExt;

use crate::label::{ContextApplier, LabelSource};

#[derive(Debug, Clone)]
enum ResolvedLabel {
    Fixed(SecurityContext),
    Components(ContextComponents),
}

/// Applies labels without following symlinks, so a link is labelled itself.
#[derive(Debug, Clone)]
pub struct XattrContextApplier {
    xattr_name: String,
    label: ResolvedLabel,
}

fn label_error(operation: &str, path: &Path, err: &io::Error) -> PlatformError {
    if !xattr::SUPPORTED_PLATFORM {
        return PlatformError::CapabilityUnavailable {
            capability: operation.to_string(),
        };
    }
    PlatformError::LabelOperationFailed {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

impl XattrContextApplier {
    /// Build an applier. A reference file is read once, here.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute name contains a NUL byte or the
    /// reference file's context cannot be read.
    pub fn new(source: LabelSource, xattr_name: &str) -> Result<Self, PlatformError> {
        if xattr_name.is_empty() || xattr_name.contains('\0') {
            return Err(PlatformError::LabelOperationFailed {
                operation: "configure".to_string(),
                path: String::new(),
                message: format!("invalid attribute name: {xattr_name:?}"),
            });
        }

        let mut applier = Self {
            xattr_name: xattr_name.to_string(),
            label: ResolvedLabel::Components(ContextComponents::default()),
        };
        applier.label = match source {
            LabelSource::Context(context) => ResolvedLabel::Fixed(context),
            LabelSource::Reference(reference) => {
                ResolvedLabel::Fixed(applier.read_context(&reference, true)?)
            }
            LabelSource::Components(components) => ResolvedLabel::Components(components),
        };
        Ok(applier)
    }

    /// Read the current context of an object.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoContext`] for unlabelled objects and
    /// [`PlatformError::LabelOperationFailed`] for unreadable or malformed
    /// labels.
    pub fn read_context(&self, path: &Path, follow: bool) -> Result<SecurityContext, PlatformError> {
        let operation = if follow { "getxattr" } else { "lgetxattr" };
        let raw = if follow {
            File::open(path).and_then(|file| file.get_xattr(&self.xattr_name))
        } else {
            xattr::get(path, &self.xattr_name)
        }
        .map_err(|e| label_error(operation, path, &e))?
        .ok_or_else(|| PlatformError::NoContext {
            path: path.display().to_string(),
        })?;

        let text = String::from_utf8_lossy(&raw);
        SecurityContext::parse(&text).map_err(|e| PlatformError::LabelOperationFailed {
            operation: operation.to_string(),
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// The context `apply` would set on `path`.
    ///
    /// # Errors
    ///
    /// Fails when components must be merged into a label that cannot be read.
    pub fn context_for(&self, path: &Path) -> Result<SecurityContext, PlatformError> {
        match &self.label {
            ResolvedLabel::Fixed(context) => Ok(context.clone()),
            ResolvedLabel::Components(components) => Ok(self
                .read_context(path, false)?
                .with_components(components)),
        }
    }
}

impl ContextApplier for XattrContextApplier {
    fn apply(&self, path: &Path) -> Result<(), PlatformError> {
        let context = self.context_for(path)?;
        let mut value = context.to_string().into_bytes();
        value.push(0);

        tracing::trace!(path = %path.display(), context = %context, "setting label");
        xattr::set(path, &self.xattr_name, &value).map_err(|e| label_error("lsetxattr", path, &e))
    }
}
