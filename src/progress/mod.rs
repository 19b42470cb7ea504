// src/progress/mod.rs
// =============================================================================
// Progress events: the human-readable status lines an analysis produces.
//
// Submodules:
// - bus: fans every event out to the currently connected observers
//
// Components never talk to the bus directly. They receive a `Reporter`,
// which wraps any `ProgressSink` (the bus, a no-op sink, a test recorder).
// =============================================================================

mod bus;

pub use bus::ProgressBus;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// One status line describing one analysis step.
///
/// Immutable once created; observers receive their own clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub message: String,
    pub emitted_at: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            emitted_at: Utc::now(),
        }
    }
}

/// Anything that can accept progress events.
///
/// `publish` must not block: implementations hand the event off and return.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: ProgressEvent);
}

/// Cloneable handle the analysis steps use to report progress.
///
/// Every message is logged and then published to the sink.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn ProgressSink>,
}

impl Reporter {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink }
    }

    pub fn emit(&self, message: impl Into<String>) {
        let event = ProgressEvent::new(message);
        info!(target: "page_inspector::progress", "{}", event.message);
        self.sink.publish(event);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Sink that drops everything.
    pub struct NoopSink;

    impl ProgressSink for NoopSink {
        fn publish(&self, _event: ProgressEvent) {}
    }

    impl Reporter {
        pub fn silent() -> Self {
            Self::new(Arc::new(NoopSink))
        }
    }

    /// Records every event so tests can assert on the messages.
    #[derive(Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        pub fn messages(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.message.clone())
                .collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn publish(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    pub fn recorder() -> (Arc<RecordingSink>, Reporter) {
        let sink = Arc::new(RecordingSink::default());
        let reporter = Reporter::new(sink.clone());
        (sink, reporter)
    }
}
