//! Policy resolution and front-end usage errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors raised before any filesystem object is touched.
///
/// Every variant is fatal for the whole invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PolicyError {
    /// `-R --dereference` given with `-P`.
    #[error("-R --dereference requires either -H or -L")]
    DereferenceWithoutTraversal,

    /// `-R -h` given with `-H` or `-L`.
    #[error("-R -h requires -P")]
    TraversalWithoutDereference,

    #[error("conflicting security context specifiers given")]
    ConflictingContextSpecifiers,

    #[error("missing operand")]
    MissingOperand,

    #[error("missing operand after '{operand}'")]
    MissingFileOperand { operand: String },

    #[error("invalid context: '{context}'")]
    InvalidContext { context: String },
}

impl PolicyError {
    /// Whether this error is one of the two traversal-flag conflicts.
    #[must_use]
    pub fn is_conflicting_options(&self) -> bool {
        matches!(
            self,
            Self::DereferenceWithoutTraversal | Self::TraversalWithoutDereference
        )
    }
}

impl UserFacingError for PolicyError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::DereferenceWithoutTraversal => {
                Some("Add -H or -L, or drop --dereference when recursing.")
            }
            Self::TraversalWithoutDereference => {
                Some("Use -P with --no-dereference, or drop -h to follow links.")
            }
            Self::ConflictingContextSpecifiers => {
                Some("Use either --reference or the -u/-r/-t/-l components, not both.")
            }
            Self::MissingOperand | Self::MissingFileOperand { .. } => {
                Some("Name at least one file to relabel.")
            }
            Self::InvalidContext { .. } => {
                Some("A context has the form user:role:type[:range].")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::DereferenceWithoutTraversal | Self::TraversalWithoutDereference => {
                "policy.conflicting_options"
            }
            Self::ConflictingContextSpecifiers => "policy.conflicting_specifiers",
            Self::MissingOperand | Self::MissingFileOperand { .. } => "policy.missing_operand",
            Self::InvalidContext { .. } => "policy.invalid_context",
        };
        Some(code)
    }
}
