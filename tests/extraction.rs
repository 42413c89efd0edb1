//! Frame extractor retry/fallback tests.
//!
//! These run against scripted [`CaptureStrategy`] implementations, so they
//! need neither media fixtures nor an ffmpeg install.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use framepress::{
    CaptureConfig, CaptureStatus, CaptureStrategy, FrameExtractor, FramepressError, MediaSource,
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

fn fast_config(scratch: &Path) -> CaptureConfig {
    CaptureConfig::new()
        .with_scratch_dir(scratch)
        .with_retry_backoff(Duration::ZERO)
}

/// Fails a scripted number of times, then writes a stub image file.
struct ScriptedStrategy {
    name: &'static str,
    available: bool,
    failures_left: AtomicU32,
}

impl ScriptedStrategy {
    fn succeeding(name: &'static str) -> Self {
        Self {
            name,
            available: true,
            failures_left: AtomicU32::new(0),
        }
    }

    fn failing(name: &'static str) -> Self {
        Self {
            name,
            available: true,
            failures_left: AtomicU32::new(u32::MAX),
        }
    }

    fn failing_times(name: &'static str, failures: u32) -> Self {
        Self {
            name,
            available: true,
            failures_left: AtomicU32::new(failures),
        }
    }

    fn unavailable(name: &'static str) -> Self {
        Self {
            name,
            available: false,
            failures_left: AtomicU32::new(0),
        }
    }
}

impl CaptureStrategy for ScriptedStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn capture(
        &self,
        _source: &MediaSource,
        timestamp: f64,
        output: &Path,
    ) -> Result<(), FramepressError> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            if left != u32::MAX {
                self.failures_left.store(left - 1, Ordering::SeqCst);
            }
            return Err(FramepressError::ToolError(format!(
                "scripted failure at {timestamp}"
            )));
        }
        fs::write(output, b"stub image data")?;
        Ok(())
    }
}

// ── Fallback ───────────────────────────────────────────────────────

#[test]
fn unavailable_tool_falls_back_to_second_strategy() {
    let scratch = tempfile::tempdir().unwrap();
    let config = fast_config(scratch.path());

    let extractor = FrameExtractor::with_strategies(vec![
        Box::new(ScriptedStrategy::unavailable("tool")),
        Box::new(ScriptedStrategy::succeeding("fallback")),
    ]);

    let result = extractor.capture(&test_source(), 10.0, 1, &config, 0.0);
    assert_eq!(result.status, CaptureStatus::Success);
    assert!(result.attempts_used >= 1);
    let path = result.image_path.expect("expected an image path");
    assert!(path.exists());
}

#[test]
fn failing_tool_falls_back_within_the_same_round() {
    let scratch = tempfile::tempdir().unwrap();
    let config = fast_config(scratch.path());

    let extractor = FrameExtractor::with_strategies(vec![
        Box::new(ScriptedStrategy::failing("tool")),
        Box::new(ScriptedStrategy::succeeding("fallback")),
    ]);

    let result = extractor.capture(&test_source(), 10.0, 1, &config, 0.0);
    assert_eq!(result.status, CaptureStatus::Success);
    assert_eq!(result.attempts_used, 1, "fallback should win in round 1");
}

#[test]
fn success_on_final_round() {
    let scratch = tempfile::tempdir().unwrap();
    let config = fast_config(scratch.path()).with_max_retries(3);

    let extractor = FrameExtractor::with_strategies(vec![Box::new(
        ScriptedStrategy::failing_times("flaky", 2),
    )]);

    let result = extractor.capture(&test_source(), 45.0, 1, &config, 0.0);
    assert_eq!(result.status, CaptureStatus::Success);
    assert_eq!(result.attempts_used, 3);
}

// ── Retry exhaustion ───────────────────────────────────────────────

#[test]
fn exhaustion_yields_failed_after_configured_rounds() {
    let scratch = tempfile::tempdir().unwrap();
    let config = fast_config(scratch.path()).with_max_retries(3);

    let extractor = FrameExtractor::with_strategies(vec![
        Box::new(ScriptedStrategy::failing("tool")),
        Box::new(ScriptedStrategy::failing("fallback")),
    ]);

    let result = extractor.capture(&test_source(), 10.0, 1, &config, 0.0);
    assert_eq!(result.status, CaptureStatus::Failed);
    assert_eq!(result.attempts_used, 3);
    assert!(result.image_path.is_none());
}

#[test]
fn no_available_strategy_yields_failed() {
    let scratch = tempfile::tempdir().unwrap();
    let config = fast_config(scratch.path()).with_max_retries(2);

    let extractor = FrameExtractor::with_strategies(vec![Box::new(
        ScriptedStrategy::unavailable("tool"),
    )]);

    let result = extractor.capture(&test_source(), 10.0, 1, &config, 0.0);
    assert_eq!(result.status, CaptureStatus::Failed);
}

// ── Output naming ──────────────────────────────────────────────────

#[test]
fn filename_encodes_index_and_truncated_timestamp() {
    assert_eq!(FrameExtractor::image_filename(7, 93.8), "screenshot_007_93s.jpg");
    assert_eq!(FrameExtractor::image_filename(1, 0.0), "screenshot_001_0s.jpg");
    assert_eq!(
        FrameExtractor::image_filename(120, 3671.2),
        "screenshot_120_3671s.jpg"
    );
}

#[test]
fn filenames_sort_lexically_in_timestamp_order() {
    let stamps = [0.0, 9.5, 30.0, 65.2, 125.0];
    let names: Vec<String> = stamps
        .iter()
        .enumerate()
        .map(|(index, &timestamp)| FrameExtractor::image_filename(index + 1, timestamp))
        .collect();

    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn duplicate_timestamps_do_not_collide() {
    let first = FrameExtractor::image_filename(1, 10.0);
    let second = FrameExtractor::image_filename(2, 10.0);
    assert_ne!(first, second);
}
