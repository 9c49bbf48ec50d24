//! Draining the event channel while the engine runs

use crate::logging::log_event_with_tracing;
use selutils_events::EventReceiver;
use std::thread::{self, JoinHandle};

/// Forwards events to tracing on a background thread.
///
/// The thread exits once every sender has been dropped.
pub struct EventForwarder {
    handle: JoinHandle<usize>,
}

impl EventForwarder {
    pub fn spawn(receiver: EventReceiver) -> Self {
        let handle = thread::spawn(move || {
            let mut forwarded = 0;
            for message in receiver {
                log_event_with_tracing(&message);
                forwarded += 1;
            }
            forwarded
        });
        Self { handle }
    }

    /// Wait for the channel to close. Returns the number of events forwarded.
    pub fn finish(self) -> usize {
        self.handle.join().unwrap_or_default()
    }
}
