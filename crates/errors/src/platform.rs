//! Host platform operation errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors raised by the host filesystem and labelling collaborators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlatformError {
    #[error("filesystem operation failed: {operation} on {path} - {message}")]
    FilesystemOperationFailed {
        operation: String,
        path: String,
        message: String,
    },

    #[error("label operation failed: {operation} on {path} - {message}")]
    LabelOperationFailed {
        operation: String,
        path: String,
        message: String,
    },

    #[error("{path} has no security context")]
    NoContext { path: String },

    #[error("platform capability not available: {capability}")]
    CapabilityUnavailable { capability: String },

    #[error("invalid path: {path}")]
    InvalidPath { path: String },

    #[error("permission denied: {operation} on {path}")]
    PermissionDenied { operation: String, path: String },
}

impl PlatformError {
    /// Build a filesystem failure from an I/O error, keeping permission
    /// problems distinguishable.
    #[must_use]
    pub fn from_io(operation: &str, path: &std::path::Path, err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::PermissionDenied {
                operation: operation.to_string(),
                path: path.display().to_string(),
            };
        }
        Self::FilesystemOperationFailed {
            operation: operation.to_string(),
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// The short cause, without the operation/path prefix.
    #[must_use]
    pub fn cause(&self) -> Cow<'_, str> {
        match self {
            Self::FilesystemOperationFailed { message, .. }
            | Self::LabelOperationFailed { message, .. } => Cow::Borrowed(message),
            Self::NoContext { .. } => {
                Cow::Borrowed("can't apply partial context to unlabeled file")
            }
            Self::CapabilityUnavailable { capability } => {
                Cow::Owned(format!("{capability} is not supported on this platform"))
            }
            Self::InvalidPath { .. } => Cow::Borrowed("invalid path"),
            Self::PermissionDenied { .. } => Cow::Borrowed("Permission denied"),
        }
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PermissionDenied { .. } => {
                Some("Adjust filesystem permissions or retry with elevated privileges.")
            }
            Self::CapabilityUnavailable { .. } => {
                Some("Security labels can only be changed on a host that supports them.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::FilesystemOperationFailed { .. } => "platform.filesystem",
            Self::LabelOperationFailed { .. } => "platform.label",
            Self::NoContext { .. } => "platform.no_context",
            Self::CapabilityUnavailable { .. } => "platform.capability_unavailable",
            Self::InvalidPath { .. } => "platform.invalid_path",
            Self::PermissionDenied { .. } => "platform.permission_denied",
        };
        Some(code)
    }
}
