//! # framepress
//!
//! Capture still frames from a video at chosen timestamps and press them
//! into a paginated PDF.
//!
//! `framepress` takes a playable media locator (a local file or a direct
//! stream URL), a set of timestamps — explicit or generated at a regular
//! interval — and produces one document: a title page followed by one
//! full-page screenshot per timestamp, in timestamp order.
//!
//! Capture is dual-strategy with retry: the external `ffmpeg` binary is
//! tried first for its precise container-index seek (each invocation
//! time-bounded and killed on timeout), falling back to an in-process
//! decode-seek via [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next).
//! A timestamp that fails under both strategies is retried with backoff and
//! then skipped — one bad seek never aborts the run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//!
//! use framepress::{CaptureConfig, DocumentAssembler, PipelineRequest, TimestampSpec};
//!
//! let request = PipelineRequest {
//!     locator: "talk.mp4".to_string(),
//!     timestamps: TimestampSpec::Explicit(vec![10.0, 60.0, 125.5]),
//!     title: "Conference Talk".to_string(),
//!     output: PathBuf::from("talk_screenshots.pdf"),
//!     duration_hint: None,
//! };
//!
//! let report = framepress::pipeline::run(
//!     &request,
//!     &CaptureConfig::new(),
//!     &DocumentAssembler::new(),
//! )?;
//! println!("wrote {}", report.assembly.output_path.display());
//! # Ok::<(), framepress::FramepressError>(())
//! ```
//!
//! ## Using the components directly
//!
//! ```no_run
//! use std::path::Path;
//!
//! use framepress::{
//!     CaptureConfig, CaptureOrchestrator, DocumentAssembler, MediaSource, timestamps,
//! };
//!
//! let config = CaptureConfig::new().with_max_retries(2);
//! let source = MediaSource::probe("talk.mp4")?;
//! let plan = timestamps::validate(&[10.0, 60.0], source.duration_seconds())?;
//!
//! let summary = CaptureOrchestrator::new(&config).run(&source, &plan.timestamps, &config)?;
//! let report = DocumentAssembler::new().assemble(
//!     &summary.images,
//!     "Conference Talk",
//!     Path::new("talk.pdf"),
//! )?;
//! # Ok::<(), framepress::FramepressError>(())
//! ```
//!
//! ## Features
//!
//! - **Dual-strategy capture** — external `ffmpeg` seek with decode-seek
//!   fallback, behind a pluggable [`CaptureStrategy`] trait
//! - **Retry with backoff** — per-timestamp round budget; failures are
//!   skipped, reported, and never fatal
//! - **Timestamp validation** — out-of-range requests are dropped (not
//!   clamped) and surfaced as warnings
//! - **Deterministic assembly** — page order is timestamp order; the page
//!   count always equals successful captures plus the title page
//! - **Progress & cancellation** — structured [`ProgressEvent`]s and a
//!   [`CancellationToken`] for front-ends
//! - **Scratch hygiene** — intermediate images are deleted after a
//!   successful write, preserved after a failed one so assembly can be
//!   retried without re-capturing
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | [`CaptureOrchestrator::run_parallel`] captures timestamps on a worker pool |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed for the in-process
//! decoder. The external tool strategy additionally uses the `ffmpeg`
//! binary when present on PATH — without it every capture simply uses
//! decode-seek.

pub mod assembler;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod orchestrator;
#[cfg(feature = "rayon")]
mod parallel;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod strategy;
pub mod timestamps;
pub mod utilities;

pub use assembler::{AssemblyReport, DocumentAssembler, LayoutOptions};
pub use config::CaptureConfig;
pub use error::FramepressError;
pub use extractor::{CaptureResult, CaptureStatus, FrameExtractor};
pub use ffmpeg::{DecoderVerbosity, set_decoder_verbosity};
pub use orchestrator::{CaptureOrchestrator, CaptureSummary};
pub use pipeline::{PipelineReport, PipelineRequest, TimestampSpec};
pub use probe::MediaSource;
pub use progress::{CancellationToken, PipelinePhase, ProgressEvent, ProgressObserver};
pub use strategy::{CaptureStrategy, DecodeSeekStrategy, ExternalToolStrategy};
pub use timestamps::ValidatedTimestamps;
