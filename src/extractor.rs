//! Single-timestamp frame extraction with retry and fallback.
//!
//! [`FrameExtractor`] owns the ordered strategy list and the retry loop: per
//! timestamp it walks every available strategy, and when the whole sequence
//! fails it backs off and retries, up to the configured round budget.
//! Exhaustion produces a [`CaptureStatus::Failed`] result — never an error —
//! so one bad timestamp cannot abort the run.

use std::path::PathBuf;
use std::thread;

use crate::config::CaptureConfig;
use crate::error::FramepressError;
use crate::probe::MediaSource;
use crate::progress::PipelinePhase;
use crate::strategy::{CaptureStrategy, default_strategies};
use crate::utilities::format_timestamp;

/// Whether a capture attempt ultimately produced an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// An image file was written for this timestamp.
    Success,
    /// Every strategy failed in every retry round.
    Failed,
}

/// The outcome of capturing one requested timestamp.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// The timestamp this result belongs to, in seconds.
    pub timestamp: f64,
    /// Success or failure.
    pub status: CaptureStatus,
    /// Path of the written image. `None` on failure.
    pub image_path: Option<PathBuf>,
    /// How many full strategy rounds were used (1-based; equals the
    /// configured retry budget on failure).
    pub attempts_used: u32,
}

impl CaptureResult {
    /// Convenience accessor: `true` for [`CaptureStatus::Success`].
    pub fn is_success(&self) -> bool {
        self.status == CaptureStatus::Success
    }
}

/// Captures one frame per timestamp through an ordered strategy list.
///
/// # Example
///
/// ```no_run
/// use framepress::{CaptureConfig, FrameExtractor, MediaSource};
///
/// let config = CaptureConfig::new();
/// let source = MediaSource::probe("input.mp4")?;
/// let extractor = FrameExtractor::new(&config);
///
/// let result = extractor.capture(&source, 12.5, 1, &config, 0.0);
/// if let Some(path) = &result.image_path {
///     println!("captured {}", path.display());
/// }
/// # Ok::<(), framepress::FramepressError>(())
/// ```
pub struct FrameExtractor {
    strategies: Vec<Box<dyn CaptureStrategy>>,
}

impl FrameExtractor {
    /// Build an extractor with the default strategy list for `config`:
    /// external tool first (when enabled and installed), then decode-seek.
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            strategies: default_strategies(config),
        }
    }

    /// Build an extractor around a custom strategy list.
    ///
    /// The list is tried in order on every retry round. Useful for plugging
    /// in additional seek mechanisms and for testing without media files.
    pub fn with_strategies(strategies: Vec<Box<dyn CaptureStrategy>>) -> Self {
        Self { strategies }
    }

    /// The file name for a capture: zero-padded per-run sequence index plus
    /// the integer truncation of the timestamp. Zero-padding makes lexical
    /// order match timestamp order; the index makes names collision-free
    /// even for duplicate timestamps.
    pub fn image_filename(sequence_index: usize, timestamp: f64) -> String {
        format!("screenshot_{sequence_index:03}_{}s.jpg", timestamp as u64)
    }

    /// Capture one frame at `timestamp` into the configured scratch
    /// directory.
    ///
    /// `sequence_index` is the 1-based position of this timestamp in the
    /// run; it is encoded into the output file name. Every attempt emits a
    /// progress event naming the strategy tried and its outcome, stamped
    /// with `percent` — the caller's overall-run completion estimate.
    pub fn capture(
        &self,
        source: &MediaSource,
        timestamp: f64,
        sequence_index: usize,
        config: &CaptureConfig,
        percent: f32,
    ) -> CaptureResult {
        let output = config
            .scratch_dir
            .join(Self::image_filename(sequence_index, timestamp));

        let mut last_error: Option<String> = None;

        for round in 1..=config.max_retries {
            for strategy in &self.strategies {
                if !strategy.is_available() {
                    continue;
                }

                match strategy.capture(source, timestamp, &output) {
                    Ok(()) => {
                        log::debug!(
                            "captured {} via {} (round {round})",
                            format_timestamp(timestamp),
                            strategy.name(),
                        );
                        config.emit(
                            PipelinePhase::Capture,
                            format!(
                                "captured screenshot at {} via {}",
                                format_timestamp(timestamp),
                                strategy.name(),
                            ),
                            percent,
                        );
                        return CaptureResult {
                            timestamp,
                            status: CaptureStatus::Success,
                            image_path: Some(output),
                            attempts_used: round,
                        };
                    }
                    Err(error) => {
                        log::warn!(
                            "{} failed at {} (round {round}/{}): {error}",
                            strategy.name(),
                            format_timestamp(timestamp),
                            config.max_retries,
                        );
                        config.emit(
                            PipelinePhase::Capture,
                            format!(
                                "{} failed at {} (round {round}/{}): {error}",
                                strategy.name(),
                                format_timestamp(timestamp),
                                config.max_retries,
                            ),
                            percent,
                        );
                        last_error = Some(error.to_string());
                    }
                }
            }

            if round < config.max_retries {
                thread::sleep(config.retry_backoff);
            }
        }

        // Absorbed by the orchestrator: recorded here, skipped there.
        let error = FramepressError::ExtractionFailed {
            timestamp,
            attempts: config.max_retries,
            reason: last_error.unwrap_or_else(|| "no strategy available".to_string()),
        };
        log::warn!("{error}");
        config.emit(PipelinePhase::Capture, error.to_string(), percent);

        CaptureResult {
            timestamp,
            status: CaptureStatus::Failed,
            image_path: None,
            attempts_used: config.max_retries,
        }
    }
}
