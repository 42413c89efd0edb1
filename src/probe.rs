//! Media source probing.
//!
//! [`MediaSource`] describes one playable input for the lifetime of a run:
//! its locator, whether it is a local random-access file or a sequential
//! stream, and the duration every requested timestamp is checked against.
//! It is created once by [`MediaSource::probe`] and immutable afterward.
//!
//! Duration resolution, in order of trust:
//! 1. For local files with a positive frame rate and frame count,
//!    `frame_count / frame_rate`.
//! 2. The container-reported duration.
//! 3. A caller-supplied fallback (typically `max(requested timestamps) +
//!    60 s`). This is a policy guess, not a probe — treat it as a lower
//!    bound on the true duration.

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::media::Type;

use crate::error::FramepressError;

/// Safety margin added on top of the highest requested timestamp when
/// neither the stream nor the container reports a usable duration.
pub const DURATION_FALLBACK_MARGIN: Duration = Duration::from_secs(60);

/// An opened-and-probed media input.
///
/// # Example
///
/// ```no_run
/// use framepress::MediaSource;
///
/// let source = MediaSource::probe("input.mp4")?;
/// println!(
///     "{}: {:.1}s, {}x{} @ {:.2} fps",
///     source.locator,
///     source.duration.as_secs_f64(),
///     source.width,
///     source.height,
///     source.frame_rate,
/// );
/// # Ok::<(), framepress::FramepressError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MediaSource {
    /// The path or URL this source was opened from.
    pub locator: String,
    /// `true` when the locator is an existing local file (random access),
    /// `false` for stream URLs.
    pub is_local: bool,
    /// Total duration used for timestamp validation.
    pub duration: Duration,
    /// Native frame rate, frames per second. Zero when unknown.
    pub frame_rate: f64,
    /// Total frame count. Zero when unknown.
    pub frame_count: u64,
    /// Video width in pixels.
    pub width: u32,
    /// Video height in pixels.
    pub height: u32,
}

impl MediaSource {
    /// Probe a media locator with no duration fallback.
    ///
    /// Equivalent to [`probe_with_fallback`](MediaSource::probe_with_fallback)
    /// with `None`; sources that report no usable duration end up with
    /// [`Duration::ZERO`] and every positive timestamp is dropped by the
    /// validator.
    ///
    /// # Errors
    ///
    /// Returns [`FramepressError::SourceUnreadable`] if the locator cannot
    /// be opened, or [`FramepressError::NoVideoStream`] if it carries no
    /// video.
    pub fn probe(locator: &str) -> Result<Self, FramepressError> {
        Self::probe_with_fallback(locator, None)
    }

    /// Probe a media locator, with a fallback duration for sources that
    /// report none.
    ///
    /// `fallback` is used only when both the frame-count computation and the
    /// container-reported duration come up empty — typical for live-ish
    /// stream URLs. Pass `max(requested timestamps) + margin` or a duration
    /// hint from the fetch layer.
    ///
    /// # Errors
    ///
    /// Same as [`probe`](MediaSource::probe).
    pub fn probe_with_fallback(
        locator: &str,
        fallback: Option<Duration>,
    ) -> Result<Self, FramepressError> {
        let is_local = Path::new(locator).is_file();

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| FramepressError::SourceUnreadable {
            locator: locator.to_string(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context = ffmpeg_next::format::input(&locator).map_err(|error| {
            FramepressError::SourceUnreadable {
                locator: locator.to_string(),
                reason: error.to_string(),
            }
        })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FramepressError::NoVideoStream)?;

        // Frame rate from the stream's average rate, falling back to the
        // real base rate.
        let average = stream.avg_frame_rate();
        let frame_rate = if average.denominator() != 0 && average.numerator() > 0 {
            average.numerator() as f64 / average.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let container_duration_us = input_context.duration();
        let container_duration = if container_duration_us > 0 {
            Duration::from_micros(container_duration_us as u64)
        } else {
            Duration::ZERO
        };

        // Frame count: prefer the demuxer's own count, else derive it from
        // the container duration.
        let reported_frames = stream.frames();
        let frame_count = if reported_frames > 0 {
            reported_frames as u64
        } else if frame_rate > 0.0 {
            (container_duration.as_secs_f64() * frame_rate) as u64
        } else {
            0
        };

        let (width, height) = {
            let parameters = stream.parameters();
            let decoder_context =
                ffmpeg_next::codec::context::Context::from_parameters(parameters).map_err(
                    |error| FramepressError::SourceUnreadable {
                        locator: locator.to_string(),
                        reason: format!("Failed to read video codec parameters: {error}"),
                    },
                )?;
            let decoder = decoder_context.decoder().video().map_err(|error| {
                FramepressError::SourceUnreadable {
                    locator: locator.to_string(),
                    reason: format!("Failed to create video decoder: {error}"),
                }
            })?;
            (decoder.width(), decoder.height())
        };

        let duration = if is_local && frame_rate > 0.0 && frame_count > 0 {
            Duration::from_secs_f64(frame_count as f64 / frame_rate)
        } else if container_duration > Duration::ZERO {
            container_duration
        } else {
            let fallback = fallback.unwrap_or(Duration::ZERO);
            log::warn!(
                "Source {locator} reports no duration; assuming {:.2}s",
                fallback.as_secs_f64(),
            );
            fallback
        };

        log::debug!(
            "Probed {locator}: local={is_local} duration={:.2}s fps={frame_rate:.3} frames={frame_count} {width}x{height}",
            duration.as_secs_f64(),
        );

        Ok(Self {
            locator: locator.to_string(),
            is_local,
            duration,
            frame_rate,
            frame_count,
            width,
            height,
        })
    }

    /// Duration in floating-point seconds, as consumed by the validator.
    pub fn duration_seconds(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Compute the probe fallback for a timestamp request: the highest requested
/// timestamp plus [`DURATION_FALLBACK_MARGIN`], or the caller's duration
/// hint when one is provided (the hint wins — it comes from the fetch layer
/// and is usually exact).
pub fn duration_fallback(requested: &[f64], hint: Option<Duration>) -> Option<Duration> {
    if let Some(hint) = hint {
        return Some(hint);
    }

    requested
        .iter()
        .copied()
        .filter(|t| t.is_finite() && *t > 0.0)
        .fold(None, |max: Option<f64>, t| Some(max.map_or(t, |m| m.max(t))))
        .map(|max| Duration::from_secs_f64(max) + DURATION_FALLBACK_MARGIN)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::duration_fallback;

    #[test]
    fn fallback_prefers_hint() {
        let hint = Some(Duration::from_secs(300));
        assert_eq!(duration_fallback(&[10.0, 20.0], hint), hint);
    }

    #[test]
    fn fallback_adds_margin_to_highest_timestamp() {
        let fallback = duration_fallback(&[10.0, 250.0, 60.0], None).unwrap();
        assert_eq!(fallback, Duration::from_secs_f64(250.0) + Duration::from_secs(60));
    }

    #[test]
    fn fallback_none_without_hint_or_timestamps() {
        assert_eq!(duration_fallback(&[], None), None);
        assert_eq!(duration_fallback(&[0.0], None), None);
    }
}
