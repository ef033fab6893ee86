/*!
 * Progress reporting for translation dispatch.
 *
 * Progress is surfaced to the (external) UI through a caller-supplied
 * callback. A misbehaving callback must never abort a translation run, so
 * every invocation is panic-guarded.
 */

use log::warn;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Phase of a dispatch-progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Dispatch is starting
    Start,
    /// A chunk request is being issued
    ChunkStart,
    /// A chunk completed successfully
    ChunkDone,
    /// A chunk failed; the run is aborting
    Error,
    /// All chunks completed
    Done,
}

/// One progress event
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Service identifier
    pub service: String,
    /// Event phase
    pub phase: ProgressPhase,
    /// Ordinal of the chunk this event concerns, when applicable
    pub chunk_ordinal: Option<usize>,
    /// Total number of chunks in this run
    pub total_chunks: usize,
    /// Number of chunks completed so far
    pub completed: usize,
}

/// Shared, panic-guarded progress sink
#[derive(Clone)]
pub struct ProgressSink {
    callback: Option<Arc<dyn Fn(ProgressEvent) + Send + Sync>>,
}

impl ProgressSink {
    /// Sink that reports to the given callback
    pub fn new(callback: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
        }
    }

    /// Sink that discards all events
    pub fn disabled() -> Self {
        Self { callback: None }
    }

    /// Emit one event. A panicking callback is logged and swallowed.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            let result = catch_unwind(AssertUnwindSafe(|| callback(event)));
            if result.is_err() {
                warn!("progress callback panicked; continuing translation");
            }
        }
    }
}
