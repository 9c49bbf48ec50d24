#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for selutils
//!
//! Library crates never print. They emit [`AppEvent`]s through an optional
//! [`EventSender`]; the front end drains the channel and forwards events to
//! `tracing` with structured fields.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, GeneralEvent, PolicySummary, TraversalEvent};

use serde::{Deserialize, Serialize};

/// An event together with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event with metadata derived from the event itself.
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let mut meta = EventMeta::new(event.log_level(), event.event_source());
        if let AppEvent::Traversal(traversal) = &event {
            meta = meta.with_correlation_id(traversal.run_id());
        }
        Self { meta, event }
    }
}

/// Type alias for event sender
pub type EventSender = crossbeam::channel::Sender<EventMessage>;

/// Type alias for event receiver
pub type EventReceiver = crossbeam::channel::Receiver<EventMessage>;

/// Create a new unbounded event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    crossbeam::channel::unbounded()
}

/// The unified trait for emitting events throughout selutils
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event with explicit metadata
    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        let EventMessage { meta, event } = EventMessage::from_event(event);
        self.emit_with_meta(meta, event);
    }

    /// Emit a traversal event
    fn emit_traversal(&self, event: TraversalEvent) {
        self.emit(AppEvent::Traversal(event));
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
