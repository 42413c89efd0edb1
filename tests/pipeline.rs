//! End-to-end pipeline tests.
//!
//! The validator → orchestrator → assembler chain is exercised without
//! media fixtures by using a scripted strategy that writes real JPEGs. The
//! full `pipeline::run` test needs `tests/fixtures/sample_video.mp4` and is
//! skipped when the fixture is absent.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use framepress::{
    CaptureConfig, CaptureOrchestrator, CaptureStrategy, DocumentAssembler, FrameExtractor,
    FramepressError, LayoutOptions, MediaSource, PipelineRequest, TimestampSpec, pipeline,
    timestamps,
};
use image::{Rgb, RgbImage};

/// Writes a real (tiny) JPEG so the assembler can embed it.
struct JpegStubStrategy;

impl CaptureStrategy for JpegStubStrategy {
    fn name(&self) -> &'static str {
        "jpeg-stub"
    }

    fn capture(
        &self,
        _source: &MediaSource,
        timestamp: f64,
        output: &Path,
    ) -> Result<(), FramepressError> {
        let shade = (timestamp as u8).wrapping_mul(7);
        let mut img = RgbImage::new(96, 54);
        for pixel in img.pixels_mut() {
            *pixel = Rgb([shade, 90, 160]);
        }
        img.save(output)?;
        Ok(())
    }
}

fn test_source(duration_seconds: u64) -> MediaSource {
    MediaSource {
        locator: "test.mp4".to_string(),
        is_local: true,
        duration: Duration::from_secs(duration_seconds),
        frame_rate: 30.0,
        frame_count: duration_seconds * 30,
        width: 1280,
        height: 720,
    }
}

#[test]
fn validator_capture_assembly_scenario() {
    // duration=120s, requested=[10,130,60]: 130 is dropped, capture runs
    // for [10,60] in that order, and the document has 3 pages.
    let root = tempfile::tempdir().unwrap();
    let scratch = root.path().join("scratch");
    let config = CaptureConfig::new()
        .with_scratch_dir(&scratch)
        .with_retry_backoff(Duration::ZERO);

    let source = test_source(120);
    let plan = timestamps::validate(&[10.0, 130.0, 60.0], source.duration_seconds()).unwrap();
    assert_eq!(plan.timestamps, vec![10.0, 60.0]);
    assert_eq!(plan.dropped, 1);

    let orchestrator = CaptureOrchestrator::with_extractor(FrameExtractor::with_strategies(
        vec![Box::new(JpegStubStrategy)],
    ));
    let summary = orchestrator.run(&source, &plan.timestamps, &config).unwrap();
    assert_eq!(summary.captured(), 2);

    let names: Vec<String> = summary
        .images
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["screenshot_001_10s.jpg", "screenshot_002_60s.jpg"]);

    let report = DocumentAssembler::new()
        .assemble(&summary.images, "Scenario", &root.path().join("scenario.pdf"))
        .unwrap();
    assert_eq!(report.page_count, 3);
    assert!(report.output_path.exists());
    assert!(!scratch.exists(), "scratch should be cleaned after assembly");
}

#[test]
fn full_pipeline_with_decode_seek_only() {
    let fixture = "tests/fixtures/sample_video.mp4";
    if !Path::new(fixture).exists() {
        return;
    }

    let root = tempfile::tempdir().unwrap();
    // Simulate an absent external tool: every capture must fall back to
    // the in-process decode-seek path.
    let config = CaptureConfig::new()
        .with_external_tool(false)
        .with_scratch_dir(root.path().join("scratch"))
        .with_retry_backoff(Duration::ZERO);
    let assembler = DocumentAssembler::new()
        .with_layout(LayoutOptions::new().with_output_dir(root.path().join("PDF")));

    let request = PipelineRequest {
        locator: fixture.to_string(),
        timestamps: TimestampSpec::Interval(2.0),
        title: "Fixture Video".to_string(),
        output: PathBuf::from("fixture.pdf"),
        duration_hint: None,
    };

    let report = pipeline::run(&request, &config, &assembler).expect("pipeline should succeed");
    assert!(report.captured > 0);
    assert_eq!(report.assembly.page_count, report.captured + 1);
    assert!(report.assembly.output_path.exists());

    let bytes = fs::read(&report.assembly.output_path).unwrap();
    assert_eq!(&bytes[..4], b"%PDF");
}
