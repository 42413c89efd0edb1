//! Timestamp parsing, generation, and validation.
//!
//! Requested timestamps arrive either as an explicit list (parsed from
//! `HH:MM:SS`, `MM:SS`, or plain seconds) or as a regular interval expanded
//! against the probed duration. Before capture, the set is sorted ascending
//! and filtered so that every timestamp `t` satisfies `0 ≤ t ≤ duration`;
//! out-of-range entries are dropped, never clamped.

use crate::error::FramepressError;

/// The outcome of validating a timestamp request against a probed duration.
///
/// `timestamps` is an ascending subset of the request; `dropped` counts the
/// entries that fell outside the duration. A non-zero drop count must be
/// surfaced as a warning by the caller — dropped timestamps are never
/// silently discarded from the run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTimestamps {
    /// Timestamps to capture, ascending.
    pub timestamps: Vec<f64>,
    /// How many requested entries were outside `0..=duration`.
    pub dropped: usize,
}

/// Parse a timecode string into seconds.
///
/// Accepts plain seconds (`90`, `12.5`), `MM:SS`, and `HH:MM:SS`, with an
/// optional fractional seconds part. Negative values are rejected.
///
/// # Errors
///
/// Returns [`FramepressError::InvalidTimecode`] when the string matches none
/// of the accepted shapes.
///
/// # Example
///
/// ```
/// use framepress::timestamps::parse_timecode;
///
/// assert_eq!(parse_timecode("75").unwrap(), 75.0);
/// assert_eq!(parse_timecode("1:15").unwrap(), 75.0);
/// assert_eq!(parse_timecode("0:01:15").unwrap(), 75.0);
/// ```
pub fn parse_timecode(value: &str) -> Result<f64, FramepressError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FramepressError::InvalidTimecode(value.to_string()));
    }

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if seconds < 0.0 || !seconds.is_finite() {
            return Err(FramepressError::InvalidTimecode(value.to_string()));
        }
        return Ok(seconds);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds_str) = match parts.as_slice() {
        [minutes, seconds] => (0u64, minutes.parse::<u64>(), *seconds),
        [hours, minutes, seconds] => match hours.parse::<u64>() {
            Ok(h) => (h, minutes.parse::<u64>(), *seconds),
            Err(_) => return Err(FramepressError::InvalidTimecode(value.to_string())),
        },
        _ => return Err(FramepressError::InvalidTimecode(value.to_string())),
    };

    let minutes = minutes.map_err(|_| FramepressError::InvalidTimecode(value.to_string()))?;
    let seconds = seconds_str
        .parse::<f64>()
        .map_err(|_| FramepressError::InvalidTimecode(value.to_string()))?;
    if seconds < 0.0 || !seconds.is_finite() {
        return Err(FramepressError::InvalidTimecode(value.to_string()));
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Parse a comma-separated list of timecodes.
///
/// # Errors
///
/// Returns [`FramepressError::InvalidTimecode`] on the first entry that
/// fails to parse.
pub fn parse_timecode_list(value: &str) -> Result<Vec<f64>, FramepressError> {
    value.split(',').map(parse_timecode).collect()
}

/// Generate timestamps at regular intervals: `{0, i, 2i, …} ≤ duration`.
///
/// # Errors
///
/// Returns [`FramepressError::InvalidInterval`] when `interval ≤ 0`.
///
/// # Example
///
/// ```
/// use framepress::timestamps::interval_timestamps;
///
/// let stamps = interval_timestamps(95.0, 30.0).unwrap();
/// assert_eq!(stamps, vec![0.0, 30.0, 60.0, 90.0]);
/// ```
pub fn interval_timestamps(duration: f64, interval: f64) -> Result<Vec<f64>, FramepressError> {
    if interval <= 0.0 || !interval.is_finite() {
        return Err(FramepressError::InvalidInterval);
    }

    let mut stamps = Vec::new();
    let mut current = 0.0;
    while current <= duration {
        stamps.push(current);
        current += interval;
    }
    Ok(stamps)
}

/// Validate a timestamp request against the probed duration.
///
/// The request is sorted ascending, then filtered to `0 ≤ t ≤ duration`.
/// Order among survivors is preserved; duplicates are allowed.
///
/// # Errors
///
/// Returns [`FramepressError::NoValidTimestamps`] when the filtered set is
/// empty — the capture phase must not run in that case.
pub fn validate(
    requested: &[f64],
    duration_seconds: f64,
) -> Result<ValidatedTimestamps, FramepressError> {
    let mut sorted: Vec<f64> = requested.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let timestamps: Vec<f64> = sorted
        .iter()
        .copied()
        .filter(|&t| t >= 0.0 && t <= duration_seconds)
        .collect();

    if timestamps.is_empty() {
        return Err(FramepressError::NoValidTimestamps {
            requested: requested.len(),
            duration_seconds,
        });
    }

    let dropped = sorted.len() - timestamps.len();
    Ok(ValidatedTimestamps { timestamps, dropped })
}
