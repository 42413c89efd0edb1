//! Capture configuration.
//!
//! [`CaptureConfig`] is a builder that threads retry policy, the external
//! tool settings, the scratch directory, progress observers, and
//! cancellation tokens through the capture pipeline without polluting every
//! function signature.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use framepress::CaptureConfig;
//!
//! let config = CaptureConfig::new()
//!     .with_max_retries(5)
//!     .with_tool_timeout(Duration::from_secs(30))
//!     .with_scratch_dir("captures");
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::progress::{
    CancellationToken, NoOpObserver, PipelinePhase, ProgressEvent, ProgressObserver,
};

/// Default number of full strategy rounds per timestamp.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default wall-clock timeout for one external tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(15);

/// Default pause between retry rounds.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Default JPEG quality for frames persisted by the decode-seek fallback.
/// Kept high so the screenshots remain faithful to the source.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Configuration for the capture phase.
///
/// Carries retry policy, strategy settings, the scratch directory for
/// intermediate images, and the progress/cancellation seam. All fields have
/// sensible defaults — a default-constructed config matches the behaviour
/// described in the crate documentation.
#[derive(Clone)]
pub struct CaptureConfig {
    /// Full strategy rounds per timestamp before a capture is marked failed.
    pub(crate) max_retries: u32,
    /// Wall-clock timeout for a single external tool invocation. The
    /// process is killed when the timeout elapses.
    pub(crate) tool_timeout: Duration,
    /// Pause between retry rounds.
    pub(crate) retry_backoff: Duration,
    /// JPEG quality (1–100) used when the decode-seek strategy persists a
    /// frame.
    pub(crate) jpeg_quality: u8,
    /// Directory for intermediate captured images. Created on demand.
    pub(crate) scratch_dir: PathBuf,
    /// Explicit path to the external `ffmpeg` binary. `None` searches PATH.
    pub(crate) tool_path: Option<PathBuf>,
    /// Whether the external tool strategy is tried at all.
    pub(crate) use_external_tool: bool,
    /// Progress observer. Defaults to a no-op.
    pub(crate) observer: Arc<dyn ProgressObserver>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Debug for CaptureConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CaptureConfig")
            .field("max_retries", &self.max_retries)
            .field("tool_timeout", &self.tool_timeout)
            .field("retry_backoff", &self.retry_backoff)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("scratch_dir", &self.scratch_dir)
            .field("tool_path", &self.tool_path)
            .field("use_external_tool", &self.use_external_tool)
            .field("has_cancellation", &self.cancellation.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureConfig {
    /// Create a new configuration with default settings.
    ///
    /// Defaults: 3 retry rounds, 15 s tool timeout, 1 s backoff, JPEG
    /// quality 95, scratch directory `high_res_screenshots`, external tool
    /// enabled and discovered on PATH, no observer, no cancellation.
    pub fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            scratch_dir: PathBuf::from("high_res_screenshots"),
            tool_path: None,
            use_external_tool: true,
            observer: Arc::new(NoOpObserver),
            cancellation: None,
        }
    }

    /// Set how many full strategy rounds are tried per timestamp.
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    /// Set the wall-clock timeout for one external tool invocation.
    #[must_use]
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Set the pause between retry rounds.
    #[must_use]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set the JPEG quality used by the decode-seek fallback (1–100).
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Set the directory for intermediate captured images.
    #[must_use]
    pub fn with_scratch_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.scratch_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Point the external tool strategy at a specific `ffmpeg` binary
    /// instead of searching PATH.
    #[must_use]
    pub fn with_tool_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.tool_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable the external tool strategy entirely.
    ///
    /// With the tool disabled every capture goes straight to the in-process
    /// decode-seek fallback.
    #[must_use]
    pub fn with_external_tool(mut self, enabled: bool) -> Self {
        self.use_external_tool = enabled;
        self
    }

    /// Attach a progress observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the orchestrator stops between
    /// timestamps and returns
    /// [`FramepressError::Cancelled`](crate::FramepressError::Cancelled).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The configured scratch directory.
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    /// Deliver an event to the configured observer.
    pub(crate) fn emit(&self, phase: PipelinePhase, detail: impl Into<String>, percent: f32) {
        self.observer.on_event(&ProgressEvent {
            phase,
            detail: detail.into(),
            percent: percent.clamp(0.0, 100.0),
        });
    }
}
