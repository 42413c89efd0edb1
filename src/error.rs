//! Error types for the `framepress` crate.
//!
//! This module defines [`FramepressError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry enough context (the
//! locator, the timestamp, the strategy, the output path) to diagnose a
//! failure without re-running the pipeline.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framepress` operations.
///
/// Every public method that can fail returns `Result<T, FramepressError>`.
/// Phase-level failures (probing, validation, assembly) abort a run and are
/// surfaced verbatim; per-timestamp capture failures are absorbed by the
/// orchestrator and only reported in the aggregate summary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramepressError {
    /// The media source could not be opened at all. Fatal — no captures run.
    #[error("Failed to open media source {locator}: {reason}")]
    SourceUnreadable {
        /// The locator (path or URL) that was passed to the prober.
        locator: String,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The source opened but does not contain a video stream.
    #[error("No video stream found in source")]
    NoVideoStream,

    /// Every requested timestamp fell outside the probed duration.
    #[error(
        "None of the {requested} requested timestamp(s) fall within the video \
         duration of {duration_seconds:.2}s"
    )]
    NoValidTimestamps {
        /// How many timestamps were requested before filtering.
        requested: usize,
        /// The probed duration they were checked against.
        duration_seconds: f64,
    },

    /// A single timestamp could not be captured after exhausting all
    /// strategies and retries. Absorbed at the orchestrator level.
    #[error("Failed to capture frame at {timestamp:.2}s after {attempts} attempt(s): {reason}")]
    ExtractionFailed {
        /// The timestamp that could not be captured.
        timestamp: f64,
        /// How many full strategy rounds were used.
        attempts: u32,
        /// The last strategy error observed.
        reason: String,
    },

    /// The capture phase finished with zero successful screenshots.
    #[error("No screenshots captured out of {requested} requested timestamp(s)")]
    NoScreenshotsCaptured {
        /// How many validated timestamps were attempted.
        requested: usize,
    },

    /// The document could not be written. Intermediate images are preserved
    /// so assembly can be retried without re-capturing.
    #[error("Failed to assemble document at {path}: {reason}")]
    AssemblyFailed {
        /// The resolved output path of the document.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },

    /// An interval of zero or less was provided for timestamp generation.
    #[error("Interval must be greater than zero")]
    InvalidInterval,

    /// A timestamp string could not be parsed as seconds, `MM:SS`, or
    /// `HH:MM:SS`.
    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),

    /// The external seek tool failed, timed out, or produced no output.
    #[error("External tool error: {0}")]
    ToolError(String),

    /// The in-process decoder could not produce a frame.
    #[error("Failed to decode video frame: {0}")]
    DecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while persisting a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The run was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for FramepressError {
    fn from(error: FfmpegError) -> Self {
        FramepressError::FfmpegError(error.to_string())
    }
}
