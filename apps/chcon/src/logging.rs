//! Structured logging integration for events
//!
//! Converts events from the library crates into tracing records with
//! structured fields.

use selutils_events::{AppEvent, EventMessage, GeneralEvent, TraversalEvent};
use selutils_types::LogFormat;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence. Otherwise logging is off unless `debug` is
/// set, so per-object diagnostics are not printed twice.
pub fn init_tracing(format: LogFormat, debug_enabled: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug_enabled {
            "debug"
        } else {
            "off"
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Plain => builder.with_target(false).init(),
    }
}

/// Emit a tracing event at a level only known at runtime.
macro_rules! log_at {
    ($level:expr, $($field:tt)+) => {
        match $level {
            Level::ERROR => tracing::event!(Level::ERROR, $($field)+),
            Level::WARN => tracing::event!(Level::WARN, $($field)+),
            Level::INFO => tracing::event!(Level::INFO, $($field)+),
            Level::DEBUG => tracing::event!(Level::DEBUG, $($field)+),
            Level::TRACE => tracing::event!(Level::TRACE, $($field)+),
        }
    };
}

/// Log an event at its metadata level with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let level = meta.tracing_level();

    match &message.event {
        AppEvent::Traversal(event) => match event {
            TraversalEvent::RunStarted {
                run_id,
                roots,
                policy,
            } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    run_id = %run_id,
                    roots = roots,
                    recursive = policy.recursive,
                    dereference = policy.dereference,
                    mode = %policy.mode,
                    root_guard = policy.root_guard,
                    "Traversal started"
                );
            }
            TraversalEvent::ObjectApplied { run_id, path, kind } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    run_id = %run_id,
                    path = %path.display(),
                    kind = %kind,
                    "Context applied"
                );
            }
            TraversalEvent::ObjectFailed {
                run_id,
                path,
                code,
                message,
            } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    run_id = %run_id,
                    path = %path.display(),
                    code = ?code,
                    message = %message,
                    "Object failed"
                );
            }
            TraversalEvent::SymlinkResolved {
                run_id,
                link,
                target,
                target_kind,
            } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    run_id = %run_id,
                    link = %link.display(),
                    target = %target.display(),
                    target_kind = %target_kind,
                    "Symlink resolved"
                );
            }
            TraversalEvent::DirectoryEntered {
                run_id,
                path,
                entries,
            } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    run_id = %run_id,
                    path = %path.display(),
                    entries = entries,
                    "Directory entered"
                );
            }
            TraversalEvent::RunCompleted {
                run_id,
                visited,
                failed,
                duration_ms,
            } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    run_id = %run_id,
                    visited = visited,
                    failed = failed,
                    duration_ms = duration_ms,
                    "Traversal completed"
                );
            }
        },

        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, context } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    message = %message,
                    context = ?context,
                    "Warning"
                );
            }
            GeneralEvent::Error { message, details } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    message = %message,
                    details = ?details,
                    "Error"
                );
            }
            GeneralEvent::DebugLog { message } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    message = %message,
                    "Debug log"
                );
            }
            GeneralEvent::ConfigurationLoaded { source } => {
                log_at!(
                    level,
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    config_file = ?source,
                    "Configuration loaded"
                );
            }
        },
    }
}
