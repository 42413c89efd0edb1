//! Capture orchestration across a validated timestamp set.
//!
//! [`CaptureOrchestrator`] drives the [`FrameExtractor`] once per timestamp,
//! absorbs per-timestamp failures, and produces the ordered image list the
//! assembler consumes. Page order is timestamp order, not completion order —
//! the parallel variant reassembles results accordingly.

use std::fs;
use std::path::PathBuf;

use crate::config::CaptureConfig;
use crate::error::FramepressError;
use crate::extractor::{CaptureResult, FrameExtractor};
use crate::probe::MediaSource;
use crate::progress::PipelinePhase;
use crate::utilities::format_timestamp;

/// Aggregate outcome of the capture phase.
///
/// `images` holds one path per successful capture, in ascending-timestamp
/// order; failed timestamps are simply omitted. `results` keeps the full
/// per-timestamp record for summary reporting.
#[derive(Debug)]
pub struct CaptureSummary {
    /// How many validated timestamps were attempted.
    pub requested: usize,
    /// Per-timestamp outcomes, in ascending-timestamp order.
    pub results: Vec<CaptureResult>,
    /// Image paths of the successful captures, ascending-timestamp order.
    pub images: Vec<PathBuf>,
}

impl CaptureSummary {
    /// Timestamps that exhausted their retry budget.
    pub fn failed_timestamps(&self) -> Vec<f64> {
        self.results
            .iter()
            .filter(|result| !result.is_success())
            .map(|result| result.timestamp)
            .collect()
    }

    /// Number of successful captures.
    pub fn captured(&self) -> usize {
        self.images.len()
    }
}

/// Drives the extractor across all timestamps of a run.
///
/// # Example
///
/// ```no_run
/// use framepress::{CaptureConfig, CaptureOrchestrator, MediaSource, timestamps};
///
/// let config = CaptureConfig::new();
/// let source = MediaSource::probe("input.mp4")?;
/// let plan = timestamps::validate(&[10.0, 60.0], source.duration_seconds())?;
///
/// let orchestrator = CaptureOrchestrator::new(&config);
/// let summary = orchestrator.run(&source, &plan.timestamps, &config)?;
/// println!("captured {}/{}", summary.captured(), summary.requested);
/// # Ok::<(), framepress::FramepressError>(())
/// ```
pub struct CaptureOrchestrator {
    extractor: FrameExtractor,
}

impl CaptureOrchestrator {
    /// Build an orchestrator with the default strategy list for `config`.
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            extractor: FrameExtractor::new(config),
        }
    }

    /// Build an orchestrator around a custom extractor.
    pub fn with_extractor(extractor: FrameExtractor) -> Self {
        Self { extractor }
    }

    /// Capture every timestamp sequentially.
    ///
    /// `timestamps` must already be validated and ascending (see
    /// [`timestamps::validate`](crate::timestamps::validate)). The
    /// cancellation token is checked between timestamps, so an in-flight
    /// capture finishes (or times out) before the run stops.
    ///
    /// # Errors
    ///
    /// - [`FramepressError::Cancelled`] when the token fires.
    /// - [`FramepressError::NoScreenshotsCaptured`] when every timestamp
    ///   failed — there is nothing to assemble.
    /// - [`FramepressError::IoError`] when the scratch directory cannot be
    ///   created.
    pub fn run(
        &self,
        source: &MediaSource,
        timestamps: &[f64],
        config: &CaptureConfig,
    ) -> Result<CaptureSummary, FramepressError> {
        fs::create_dir_all(&config.scratch_dir)?;

        let total = timestamps.len();
        let mut results = Vec::with_capacity(total);

        for (index, &timestamp) in timestamps.iter().enumerate() {
            if config.is_cancelled() {
                return Err(FramepressError::Cancelled);
            }

            // Capture occupies the 30–70% band of the overall run.
            let percent = 30.0 + (index as f32 / total.max(1) as f32) * 40.0;
            config.emit(
                PipelinePhase::Capture,
                format!(
                    "capturing screenshot {}/{total} at {}",
                    index + 1,
                    format_timestamp(timestamp),
                ),
                percent,
            );

            results.push(
                self.extractor
                    .capture(source, timestamp, index + 1, config, percent),
            );
        }

        Self::summarize(total, results, config)
    }

    /// Capture every timestamp on a rayon worker pool.
    ///
    /// External-tool invocations are independent processes and the
    /// decode-seek fallback opens its own demuxer and decoder per capture,
    /// so no decoder handle is ever shared between workers. Results are
    /// reassembled into ascending-timestamp order before being returned.
    ///
    /// # Errors
    ///
    /// Same as [`run`](CaptureOrchestrator::run).
    #[cfg(feature = "rayon")]
    pub fn run_parallel(
        &self,
        source: &MediaSource,
        timestamps: &[f64],
        config: &CaptureConfig,
    ) -> Result<CaptureSummary, FramepressError> {
        fs::create_dir_all(&config.scratch_dir)?;

        let results =
            crate::parallel::capture_parallel(&self.extractor, source, timestamps, config)?;
        Self::summarize(timestamps.len(), results, config)
    }

    fn summarize(
        requested: usize,
        results: Vec<CaptureResult>,
        config: &CaptureConfig,
    ) -> Result<CaptureSummary, FramepressError> {
        let images: Vec<PathBuf> = results
            .iter()
            .filter_map(|result| result.image_path.clone())
            .collect();

        log::info!("captured {}/{} screenshot(s)", images.len(), requested);
        config.emit(
            PipelinePhase::Capture,
            format!("captured {}/{} screenshots", images.len(), requested),
            70.0,
        );

        if images.is_empty() {
            return Err(FramepressError::NoScreenshotsCaptured { requested });
        }

        Ok(CaptureSummary {
            requested,
            results,
            images,
        })
    }
}
