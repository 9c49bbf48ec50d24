#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for selutils
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone so they can travel inside outcomes and events.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod platform;
pub mod policy;
pub mod traverse;

// Re-export all error types at the root
pub use config::ConfigError;
pub use platform::PlatformError;
pub use policy::PolicyError;
pub use traverse::TraversalError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("{0}")]
    Policy(#[from] PolicyError),

    #[error("{0}")]
    Traversal(#[from] TraversalError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Result type alias for selutils operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Policy(err) => err.user_message(),
            Error::Traversal(err) => err.user_message(),
            Error::Platform(err) => err.user_message(),
            Error::Config(_) => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Policy(err) => err.user_hint(),
            Error::Traversal(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Platform(err) => err.user_hint(),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Policy(err) => err.user_code(),
            Error::Traversal(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Platform(err) => err.user_code(),
        }
    }
}
