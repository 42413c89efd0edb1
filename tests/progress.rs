//! Progress event and cancellation-token tests.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use framepress::{
    CancellationToken, CaptureConfig, CaptureOrchestrator, CaptureStrategy, FrameExtractor,
    FramepressError, MediaSource, PipelinePhase, ProgressEvent, ProgressObserver,
};

fn test_source() -> MediaSource {
    MediaSource {
        locator: "test.mp4".to_string(),
        is_local: true,
        duration: Duration::from_secs(120),
        frame_rate: 30.0,
        frame_count: 3600,
        width: 1280,
        height: 720,
    }
}

/// Succeeds always; used to drive the orchestrator without media files.
struct StubStrategy;

impl CaptureStrategy for StubStrategy {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn capture(
        &self,
        _source: &MediaSource,
        _timestamp: f64,
        output: &Path,
    ) -> Result<(), FramepressError> {
        fs::write(output, b"stub image data")?;
        Ok(())
    }
}

struct RecordingObserver {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingObserver {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_event(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── CancellationToken ──────────────────────────────────────────────

#[test]
fn cancellation_token_default_not_cancelled() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn cancellation_token_cancel() {
    let token = CancellationToken::new();
    token.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn cancellation_token_clone_shares_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!clone.is_cancelled());

    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn cancellation_token_default_trait() {
    let token = CancellationToken::default();
    assert!(!token.is_cancelled());
}

// ── Capture events ─────────────────────────────────────────────────

#[test]
fn capture_emits_one_event_per_timestamp_plus_summary() {
    let scratch = tempfile::tempdir().unwrap();
    let recorder = Arc::new(RecordingObserver::new());
    let config = CaptureConfig::new()
        .with_scratch_dir(scratch.path())
        .with_retry_backoff(Duration::ZERO)
        .with_observer(recorder.clone());

    let orchestrator =
        CaptureOrchestrator::with_extractor(FrameExtractor::with_strategies(vec![Box::new(
            StubStrategy,
        )]));
    orchestrator
        .run(&test_source(), &[10.0, 60.0], &config)
        .unwrap();

    let events = recorder.events.lock().unwrap();
    assert!(!events.is_empty(), "expected progress events");

    for event in events.iter() {
        assert_eq!(event.phase, PipelinePhase::Capture);
        assert!(
            (0.0..=100.0).contains(&event.percent),
            "percent out of range: {}",
            event.percent,
        );
    }

    let summary = events.last().unwrap();
    assert!(
        summary.detail.contains("captured 2/2"),
        "unexpected summary detail: {}",
        summary.detail,
    );
}

#[test]
fn capture_percent_is_monotonic() {
    let scratch = tempfile::tempdir().unwrap();
    let recorder = Arc::new(RecordingObserver::new());
    let config = CaptureConfig::new()
        .with_scratch_dir(scratch.path())
        .with_retry_backoff(Duration::ZERO)
        .with_observer(recorder.clone());

    let orchestrator =
        CaptureOrchestrator::with_extractor(FrameExtractor::with_strategies(vec![Box::new(
            StubStrategy,
        )]));
    orchestrator
        .run(&test_source(), &[5.0, 15.0, 25.0, 35.0, 45.0], &config)
        .unwrap();

    let events = recorder.events.lock().unwrap();
    for window in events.windows(2) {
        assert!(
            window[1].percent >= window[0].percent,
            "percent should be non-decreasing: {} then {}",
            window[0].percent,
            window[1].percent,
        );
    }
}

#[test]
fn failed_attempts_surface_in_event_stream() {
    struct AlwaysFailing;

    impl CaptureStrategy for AlwaysFailing {
        fn name(&self) -> &'static str {
            "doomed"
        }

        fn capture(
            &self,
            _source: &MediaSource,
            timestamp: f64,
            _output: &Path,
        ) -> Result<(), FramepressError> {
            Err(FramepressError::ToolError(format!("no luck at {timestamp}")))
        }
    }

    let scratch = tempfile::tempdir().unwrap();
    let recorder = Arc::new(RecordingObserver::new());
    let config = CaptureConfig::new()
        .with_scratch_dir(scratch.path())
        .with_retry_backoff(Duration::ZERO)
        .with_max_retries(2)
        .with_observer(recorder.clone());

    let orchestrator = CaptureOrchestrator::with_extractor(FrameExtractor::with_strategies(
        vec![Box::new(AlwaysFailing)],
    ));
    let result = orchestrator.run(&test_source(), &[10.0], &config);
    assert!(result.is_err());

    let events = recorder.events.lock().unwrap();
    let failures = events
        .iter()
        .filter(|event| event.detail.contains("doomed failed"))
        .count();
    assert_eq!(failures, 2, "one failure event per retry round");
}
