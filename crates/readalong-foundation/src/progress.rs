//! Progress reporting and cooperative cancellation (§5).
//!
//! The pipeline invokes a progress callback after each chapter with a
//! fraction in `[0, 1]`; cancellation is checked at that same boundary,
//! never mid-chapter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::Diagnostic;

/// Named progress events a caller can react to. `Chapter` fires once per
/// chapter processed (whether anchored, skipped, or fatal), carrying the
/// running fraction complete.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Chapter { index: usize, total: usize, fraction: f64 },
    Diagnostic(Diagnostic),
}

/// Callback invoked with each progress event. Boxed so the CLI can wire in
/// a `tracing`-backed sink while tests wire in a `Vec`-collecting one.
pub trait ProgressSink: Send {
    fn report(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent) + Send> ProgressSink for F {
    fn report(&mut self, event: ProgressEvent) {
        self(event)
    }
}

/// A no-op sink for callers that don't care about progress.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _event: ProgressEvent) {}
}

/// Cooperative cancellation flag, checked between chapters.
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
