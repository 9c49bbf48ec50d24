//! Per-object traversal failures
//!
//! These never abort a run. Each one is recorded against the object it
//! happened on and the engine moves on to the next sibling or root.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Failure recorded for a single visited object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TraversalError {
    /// The object's own status could not be read.
    #[error("cannot access '{path}': {message}")]
    Classification { path: String, message: String },

    /// A symlink target could not be resolved (broken, unreadable).
    #[error("cannot dereference '{path}': {message}")]
    Resolution { path: String, message: String },

    /// A directory could not be opened or read.
    #[error("cannot read directory '{path}': {message}")]
    Enumeration { path: String, message: String },

    /// The label could not be set.
    #[error("failed to change context of '{path}': {message}")]
    Apply { path: String, message: String },

    /// A symlink chain or directory structure loops back on itself.
    #[error("'{path}': too many levels of symbolic links or circular directory structure")]
    CycleDetected { path: String, chain_length: usize },

    /// Recursion was refused at the filesystem root.
    #[error("it is dangerous to operate recursively on '{path}'")]
    RootGuard { path: String },
}

impl TraversalError {
    /// Path of the object this failure was recorded against.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Classification { path, .. }
            | Self::Resolution { path, .. }
            | Self::Enumeration { path, .. }
            | Self::Apply { path, .. }
            | Self::CycleDetected { path, .. }
            | Self::RootGuard { path } => path,
        }
    }
}

impl UserFacingError for TraversalError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::RootGuard { .. } => Some("use --no-preserve-root to override this failsafe"),
            Self::CycleDetected { .. } => Some("Remove the looping symbolic link or use -P."),
            Self::Apply { .. } => {
                Some("Check that the filesystem supports security labels and that you may relabel it.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Classification { .. } => "traverse.classification",
            Self::Resolution { .. } => "traverse.resolution",
            Self::Enumeration { .. } => "traverse.enumeration",
            Self::Apply { .. } => "traverse.apply",
            Self::CycleDetected { .. } => "traverse.cycle_detected",
            Self::RootGuard { .. } => "traverse.root_guard",
        };
        Some(code)
    }
}
