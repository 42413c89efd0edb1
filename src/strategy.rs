//! Frame capture strategies.
//!
//! A capture strategy produces one image file for exactly one timestamp.
//! Strategies are capability-tagged and tried in order by the
//! [`FrameExtractor`](crate::FrameExtractor) retry loop, so a new seek
//! mechanism (hardware decode, a different tool) plugs in without touching
//! retry or orchestration logic.
//!
//! Two strategies ship with the crate:
//! - [`ExternalToolStrategy`] shells out to the `ffmpeg` binary for a
//!   container-index seek — the most precise and the fastest when the tool
//!   is installed, but each invocation is a subprocess that must be
//!   time-bounded.
//! - [`DecodeSeekStrategy`] decodes in-process via `ffmpeg-next`, seeking by
//!   computed frame index. Always available; used when the tool is missing,
//!   fails, or times out.

use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;

use crate::config::CaptureConfig;
use crate::error::FramepressError;
use crate::probe::MediaSource;
use crate::utilities;

/// Interval at which a running external tool process is polled for exit.
const TOOL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A mechanism that captures a single frame at a timestamp into a file.
///
/// Implementations must be cheap to probe via
/// [`is_available`](CaptureStrategy::is_available) — the retry loop checks
/// availability on every round. `capture` must either leave a non-empty
/// image file at `output` and return `Ok`, or return `Err` and leave no
/// partial output behind.
pub trait CaptureStrategy: Send + Sync {
    /// Short identifier used in progress events and logs.
    fn name(&self) -> &'static str;

    /// Whether this strategy can run on the current host.
    fn is_available(&self) -> bool {
        true
    }

    /// Capture one frame of `source` at `timestamp` (seconds) into `output`.
    fn capture(
        &self,
        source: &MediaSource,
        timestamp: f64,
        output: &Path,
    ) -> Result<(), FramepressError>;
}

/// Search PATH for an executable.
fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        let candidate = dir.join(binary);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let candidate = dir.join(format!("{binary}.exe"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Precise single-frame capture via the external `ffmpeg` binary.
///
/// Invokes `ffmpeg -ss <t> -i <locator> -frames:v 1 -q:v 1 <output>` under a
/// wall-clock timeout; the process is killed (and reaped) when the timeout
/// elapses so one stuck call cannot stall the run. Success requires a clean
/// exit AND a non-empty output file.
pub struct ExternalToolStrategy {
    binary: Option<PathBuf>,
    timeout: Duration,
}

impl ExternalToolStrategy {
    /// Resolve the tool from the configuration: an explicit path if one was
    /// set, otherwise the first `ffmpeg` found on PATH.
    pub fn discover(config: &CaptureConfig) -> Self {
        let binary = config
            .tool_path
            .clone()
            .or_else(|| find_in_path("ffmpeg"));
        Self {
            binary,
            timeout: config.tool_timeout,
        }
    }

    /// Build a strategy around a known binary path (mainly for tests and
    /// embedders that bundle their own ffmpeg).
    pub fn with_binary<P: AsRef<Path>>(binary: P, timeout: Duration) -> Self {
        Self {
            binary: Some(binary.as_ref().to_path_buf()),
            timeout,
        }
    }
}

impl CaptureStrategy for ExternalToolStrategy {
    fn name(&self) -> &'static str {
        "ffmpeg-tool"
    }

    fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    fn capture(
        &self,
        source: &MediaSource,
        timestamp: f64,
        output: &Path,
    ) -> Result<(), FramepressError> {
        let binary = self
            .binary
            .as_ref()
            .ok_or_else(|| FramepressError::ToolError("ffmpeg not found on PATH".to_string()))?;

        let mut child = Command::new(binary)
            .arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-ss")
            .arg(format!("{timestamp:.3}"))
            .arg("-i")
            .arg(&source.locator)
            .arg("-frames:v")
            .arg("1")
            .arg("-q:v")
            .arg("1")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| FramepressError::ToolError(format!("failed to spawn ffmpeg: {error}")))?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(FramepressError::ToolError(format!(
                            "ffmpeg timed out after {:.0}s seeking to {timestamp:.2}s",
                            self.timeout.as_secs_f64(),
                        )));
                    }
                    thread::sleep(TOOL_POLL_INTERVAL);
                }
                Err(error) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(FramepressError::ToolError(format!(
                        "failed to wait for ffmpeg: {error}"
                    )));
                }
            }
        };

        if !status.success() {
            let mut stderr = String::new();
            if let Some(mut pipe) = child.stderr.take() {
                let _ = pipe.read_to_string(&mut stderr);
            }
            let stderr = stderr.trim();
            return Err(FramepressError::ToolError(format!(
                "ffmpeg exited with {status}: {stderr}"
            )));
        }

        match fs::metadata(output) {
            Ok(metadata) if metadata.len() > 0 => Ok(()),
            _ => {
                // Remove a zero-byte leftover so a later strategy starts clean.
                let _ = fs::remove_file(output);
                Err(FramepressError::ToolError(format!(
                    "ffmpeg produced no output for {timestamp:.2}s"
                )))
            }
        }
    }
}

/// In-process decode-seek capture via `ffmpeg-next`.
///
/// Opens its own demuxer and decoder per call, so concurrent captures never
/// share a decoder handle. Seeks to the nearest keyframe before the target
/// frame index (`timestamp × frame_rate`), decodes forward to the target,
/// and persists the frame as a high-quality JPEG.
pub struct DecodeSeekStrategy {
    jpeg_quality: u8,
}

impl DecodeSeekStrategy {
    /// Create a strategy that saves JPEGs at the configured quality.
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
        }
    }
}

impl CaptureStrategy for DecodeSeekStrategy {
    fn name(&self) -> &'static str {
        "decode-seek"
    }

    fn capture(
        &self,
        source: &MediaSource,
        timestamp: f64,
        output: &Path,
    ) -> Result<(), FramepressError> {
        ffmpeg_next::init()?;

        let mut input_context = ffmpeg_next::format::input(&source.locator).map_err(|error| {
            FramepressError::DecodeError(format!(
                "cannot reopen {} for decoding: {error}",
                source.locator
            ))
        })?;

        let (stream_index, time_base, parameters) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(FramepressError::NoVideoStream)?;
            (stream.index(), stream.time_base(), stream.parameters())
        };

        let decoder_context = CodecContext::from_parameters(parameters)?;
        let mut decoder = decoder_context.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        let mut scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let frame_rate = if source.frame_rate > 0.0 {
            source.frame_rate
        } else {
            return Err(FramepressError::DecodeError(
                "source reports no frame rate; cannot compute seek target".to_string(),
            ));
        };
        let target_frame = ((timestamp * frame_rate) as i64).max(0) as u64;

        // Demuxer-level seek takes microseconds when no stream is selected.
        let seek_target = (timestamp.max(0.0) * 1_000_000.0) as i64;
        input_context.seek(seek_target, ..seek_target)?;

        let mut decoded_frame = VideoFrame::empty();
        let mut rgb_frame = VideoFrame::empty();

        for (stream, packet) in input_context.packets() {
            if stream.index() != stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.pts().unwrap_or(0);
                let frame_number = utilities::pts_to_frame_number(pts, time_base, frame_rate);

                if frame_number >= target_frame {
                    scaler.run(&decoded_frame, &mut rgb_frame)?;
                    return self.persist(&rgb_frame, width, height, timestamp, output);
                }
            }
        }

        // Flush: the target may sit in the decoder's delay queue.
        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            let pts = decoded_frame.pts().unwrap_or(0);
            let frame_number = utilities::pts_to_frame_number(pts, time_base, frame_rate);

            if frame_number >= target_frame {
                scaler.run(&decoded_frame, &mut rgb_frame)?;
                return self.persist(&rgb_frame, width, height, timestamp, output);
            }
        }

        Err(FramepressError::DecodeError(format!(
            "no frame returned at {timestamp:.2}s (target frame {target_frame})"
        )))
    }
}

impl DecodeSeekStrategy {
    /// Write an RGB24 frame to `output` as JPEG at the configured quality.
    fn persist(
        &self,
        rgb_frame: &VideoFrame,
        width: u32,
        height: u32,
        timestamp: f64,
        output: &Path,
    ) -> Result<(), FramepressError> {
        let buffer = utilities::frame_to_rgb_buffer(rgb_frame, width, height);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FramepressError::DecodeError(format!(
                "frame buffer size mismatch for {width}x{height} at {timestamp:.2}s"
            ))
        })?;

        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality);
        encoder.encode_image(&image)?;
        Ok(())
    }
}

/// Build the default ordered strategy list for a configuration: the external
/// tool first (when enabled and found), then the decode-seek fallback.
pub fn default_strategies(config: &CaptureConfig) -> Vec<Box<dyn CaptureStrategy>> {
    let mut strategies: Vec<Box<dyn CaptureStrategy>> = Vec::with_capacity(2);
    if config.use_external_tool {
        let tool = ExternalToolStrategy::discover(config);
        if tool.is_available() {
            strategies.push(Box::new(tool));
        } else {
            log::debug!("ffmpeg binary not found; relying on decode-seek only");
        }
    }
    strategies.push(Box::new(DecodeSeekStrategy::new(config)));
    strategies
}
