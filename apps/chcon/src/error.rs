//! CLI error handling

use std::fmt;

use selutils_errors::{PlatformError, PolicyError, UserFacingError};

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Usage or option conflict, detected before any file is touched
    Usage(PolicyError),
    /// Configuration file or environment error
    Config(selutils_errors::Error),
    /// Label source could not be prepared
    Platform(PlatformError),
}

impl CliError {
    /// Render the diagnostic lines for `program`.
    pub fn render(&self, program: &str) -> String {
        match self {
            CliError::Usage(err) if err.is_conflicting_options() => {
                format!("{program}: error: {err}")
            }
            CliError::Usage(
                err @ (PolicyError::ConflictingContextSpecifiers
                | PolicyError::MissingOperand
                | PolicyError::MissingFileOperand { .. }),
            ) => format!("{program}: {err}\nType '{program} --help' for more information."),
            _ => format!("{program}: {self}"),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (message, hint) = match self {
            CliError::Usage(e) => (e.user_message(), e.user_hint()),
            CliError::Config(e) => (e.user_message(), e.user_hint()),
            CliError::Platform(e) => (e.user_message(), e.user_hint()),
        };
        write!(f, "{message}")?;
        if let Some(hint) = hint {
            write!(f, "\n  Hint: {hint}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Usage(e) => Some(e),
            CliError::Config(e) => Some(e),
            CliError::Platform(e) => Some(e),
        }
    }
}

impl From<PolicyError> for CliError {
    fn from(e: PolicyError) -> Self {
        CliError::Usage(e)
    }
}

impl From<selutils_errors::Error> for CliError {
    fn from(e: selutils_errors::Error) -> Self {
        CliError::Config(e)
    }
}

impl From<PlatformError> for CliError {
    fn from(e: PlatformError) -> Self {
        CliError::Platform(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_rendering() {
        let err = CliError::from(PolicyError::DereferenceWithoutTraversal);
        assert_eq!(
            err.render("chcon"),
            "chcon: error: -R --dereference requires either -H or -L"
        );
    }

    #[test]
    fn test_usage_rendering_points_at_help() {
        let err = CliError::from(PolicyError::MissingOperand);
        assert_eq!(
            err.render("chcon"),
            "chcon: missing operand\nType 'chcon --help' for more information."
        );
    }
}
