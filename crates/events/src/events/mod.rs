use serde::{Deserialize, Serialize};

use crate::EventSource;

pub mod general;
pub mod traversal;

pub use general::*;
pub use traversal::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    General(GeneralEvent),

    Traversal(TraversalEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Traversal(_) => EventSource::TRAVERSAL,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Traversal(TraversalEvent::ObjectFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,
            Self::Traversal(TraversalEvent::RunCompleted { failed, .. }) if *failed > 0 => {
                Level::WARN
            }

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Traversal(
                TraversalEvent::ObjectApplied { .. }
                | TraversalEvent::SymlinkResolved { .. }
                | TraversalEvent::DirectoryEntered { .. },
            ) => Level::DEBUG,

            _ => Level::INFO,
        }
    }
}
