use serde::{Deserialize, Serialize};

/// General utility events for warnings and errors outside a traversal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneralEvent {
    Warning {
        message: String,
        context: Option<String>,
    },

    Error {
        message: String,
        details: Option<String>,
    },

    DebugLog {
        message: String,
    },

    /// Configuration finished loading, with the file it came from if any.
    ConfigurationLoaded {
        source: Option<String>,
    },
}

impl GeneralEvent {
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
            context: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
            details: None,
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
        }
    }
}
