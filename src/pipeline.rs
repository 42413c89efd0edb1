//! End-to-end screenshot pipeline.
//!
//! Drives the full probe → validate → capture → assemble sequence for one
//! run. Front-ends (the CLI, a GUI) build a [`PipelineRequest`], attach an
//! observer through [`CaptureConfig`], and call [`run`].

use std::path::PathBuf;
use std::time::Duration;

use crate::assembler::{AssemblyReport, DocumentAssembler};
use crate::config::CaptureConfig;
use crate::error::FramepressError;
use crate::orchestrator::CaptureOrchestrator;
use crate::probe::{MediaSource, duration_fallback};
use crate::progress::PipelinePhase;
use crate::timestamps;
use crate::utilities::format_duration;

/// How the timestamps of a run are specified.
#[derive(Debug, Clone)]
pub enum TimestampSpec {
    /// Capture at these exact timestamps (seconds). Sorted and validated
    /// against the probed duration before capture.
    Explicit(Vec<f64>),
    /// Capture at regular intervals: `{0, i, 2i, …} ≤ duration`.
    Interval(f64),
}

/// Everything a front-end supplies for one run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// Media locator — a local path or a direct stream URL.
    pub locator: String,
    /// Requested timestamps.
    pub timestamps: TimestampSpec,
    /// Document title (sanitized by the assembler).
    pub title: String,
    /// Output document path. A bare file name lands in the assembler's
    /// default output directory.
    pub output: PathBuf,
    /// Optional duration reported by the fetch layer; used only when the
    /// source itself reports none.
    pub duration_hint: Option<Duration>,
}

/// Summary of a completed run.
#[derive(Debug)]
pub struct PipelineReport {
    /// The probed duration the timestamps were validated against.
    pub duration: Duration,
    /// How many timestamps were requested (after interval expansion).
    pub requested: usize,
    /// How many requested timestamps fell outside the duration.
    pub dropped: usize,
    /// How many screenshots were captured.
    pub captured: usize,
    /// Timestamps that exhausted their retry budget.
    pub failed_timestamps: Vec<f64>,
    /// Where the document was written and how many pages it has.
    pub assembly: AssemblyReport,
}

/// Run the full pipeline: probe the source, validate timestamps, capture
/// frames, and assemble the document.
///
/// # Errors
///
/// Aborts with the first phase-level failure: `SourceUnreadable` /
/// `NoVideoStream` (probe), `NoValidTimestamps` / `InvalidInterval`
/// (validation), `Cancelled` or `NoScreenshotsCaptured` (capture), or
/// `AssemblyFailed` (assembly — intermediate images are preserved).
/// Per-timestamp capture failures do not abort; they appear in
/// [`PipelineReport::failed_timestamps`].
///
/// # Example
///
/// ```no_run
/// use std::path::PathBuf;
///
/// use framepress::{CaptureConfig, DocumentAssembler, PipelineRequest, TimestampSpec};
///
/// let request = PipelineRequest {
///     locator: "lecture.mp4".to_string(),
///     timestamps: TimestampSpec::Interval(30.0),
///     title: "Lecture 4".to_string(),
///     output: PathBuf::from("lecture_4_screenshots.pdf"),
///     duration_hint: None,
/// };
///
/// let report = framepress::pipeline::run(
///     &request,
///     &CaptureConfig::new(),
///     &DocumentAssembler::new(),
/// )?;
/// println!(
///     "{} pages at {}",
///     report.assembly.page_count,
///     report.assembly.output_path.display(),
/// );
/// # Ok::<(), framepress::FramepressError>(())
/// ```
pub fn run(
    request: &PipelineRequest,
    config: &CaptureConfig,
    assembler: &DocumentAssembler,
) -> Result<PipelineReport, FramepressError> {
    config.emit(
        PipelinePhase::Probe,
        format!("probing {}", request.locator),
        5.0,
    );

    // The fallback only matters for sources that report no duration: the
    // highest requested timestamp plus a margin, or the fetch layer's hint.
    // Interval mode has no timestamps to lean on, so only the hint helps —
    // a known approximation, not a true probe.
    let fallback = match &request.timestamps {
        TimestampSpec::Explicit(requested) => {
            duration_fallback(requested, request.duration_hint)
        }
        TimestampSpec::Interval(_) => request.duration_hint,
    };

    let source = MediaSource::probe_with_fallback(&request.locator, fallback)?;
    config.emit(
        PipelinePhase::Probe,
        format!("video duration: {}", format_duration(source.duration)),
        10.0,
    );

    let requested = match &request.timestamps {
        TimestampSpec::Explicit(requested) => requested.clone(),
        TimestampSpec::Interval(interval) => {
            timestamps::interval_timestamps(source.duration_seconds(), *interval)?
        }
    };

    let plan = timestamps::validate(&requested, source.duration_seconds())?;
    if plan.dropped > 0 {
        log::warn!(
            "{} timestamp(s) outside video duration ({:.2}s) were dropped",
            plan.dropped,
            source.duration_seconds(),
        );
        config.emit(
            PipelinePhase::Validate,
            format!(
                "warning: {} timestamp(s) outside video duration ({:.2}s) were dropped",
                plan.dropped,
                source.duration_seconds(),
            ),
            15.0,
        );
    }
    config.emit(
        PipelinePhase::Validate,
        format!("{} screenshot(s) to capture", plan.timestamps.len()),
        20.0,
    );

    let orchestrator = CaptureOrchestrator::new(config);
    let summary = orchestrator.run(&source, &plan.timestamps, config)?;

    let assembly = assembler.assemble(&summary.images, &request.title, &request.output)?;
    config.emit(
        PipelinePhase::Assemble,
        format!("document written to {}", assembly.output_path.display()),
        100.0,
    );

    Ok(PipelineReport {
        duration: source.duration,
        requested: requested.len(),
        dropped: plan.dropped,
        captured: summary.captured(),
        failed_timestamps: summary.failed_timestamps(),
        assembly,
    })
}
