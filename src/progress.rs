//! Progress reporting and cancellation support.
//!
//! The pipeline reports its work as a sequence of discrete
//! [`ProgressEvent`]s — one per phase transition, per capture attempt, and
//! per warning — through the [`ProgressObserver`] trait. Front-ends (console,
//! GUI) subscribe to this seam without the core knowing anything about
//! terminals or windows.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framepress::{CaptureConfig, ProgressEvent, ProgressObserver};
//!
//! struct PrintProgress;
//!
//! impl ProgressObserver for PrintProgress {
//!     fn on_event(&self, event: &ProgressEvent) {
//!         println!("[{:?}] {:.0}% {}", event.phase, event.percent, event.detail);
//!     }
//! }
//!
//! let config = CaptureConfig::new().with_observer(Arc::new(PrintProgress));
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// The pipeline phase a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PipelinePhase {
    /// Opening the source and determining its duration.
    Probe,
    /// Filtering requested timestamps against the probed duration.
    Validate,
    /// Capturing frames at validated timestamps.
    Capture,
    /// Laying out and writing the output document.
    Assemble,
    /// Retiring intermediate files after a successful write.
    Cleanup,
}

/// A discrete progress event.
///
/// `percent` is an overall-run completion estimate in `0.0..=100.0`;
/// `detail` is a short human-readable description of the step, including
/// warnings (e.g. dropped timestamps, failed capture attempts).
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Which phase of the pipeline emitted the event.
    pub phase: PipelinePhase,
    /// Human-readable description of the step or warning.
    pub detail: String,
    /// Overall completion percentage (0.0 – 100.0).
    pub percent: f32,
}

/// Trait for receiving progress events during a run.
///
/// Implementations must be [`Send`] and [`Sync`] — events may be delivered
/// from worker threads when the parallel capture feature is enabled.
///
/// Observers are **infallible**: they can watch but not halt a run. Use a
/// [`CancellationToken`] for cooperative cancellation.
pub trait ProgressObserver: Send + Sync {
    /// Called once per pipeline step, capture attempt, or warning.
    fn on_event(&self, event: &ProgressEvent);
}

/// A no-op observer that discards all events.
///
/// This is the default when no observer is configured.
pub(crate) struct NoOpObserver;

impl ProgressObserver for NoOpObserver {
    fn on_event(&self, _event: &ProgressEvent) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clone the token and share it between threads; call
/// [`cancel`](CancellationToken::cancel) from any thread to request
/// cancellation. The orchestrator checks the token between timestamps, so
/// an in-flight capture finishes (or times out) before the run stops.
///
/// # Example
///
/// ```
/// use framepress::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones of this token observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
