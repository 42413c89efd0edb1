//! Parallel frame capture.
//!
//! This module provides [`capture_parallel`] which distributes per-timestamp
//! captures across rayon threads. Each worker runs the full strategy
//! sequence for its timestamp; the decode-seek fallback opens its own
//! demuxer and decoder, so there is no shared mutable state beyond distinct
//! output paths.
//!
//! The public API is exposed through
//! [`CaptureOrchestrator::run_parallel`](crate::CaptureOrchestrator) — this
//! module contains only the internal implementation.

use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::config::CaptureConfig;
use crate::error::FramepressError;
use crate::extractor::{CaptureResult, FrameExtractor};
use crate::probe::MediaSource;

/// Capture all timestamps on the rayon pool and return the results in
/// ascending-timestamp order.
///
/// Cancellation is checked at the start of each unit of work; a cancelled
/// worker aborts the whole batch with
/// [`FramepressError::Cancelled`].
pub(crate) fn capture_parallel(
    extractor: &FrameExtractor,
    source: &MediaSource,
    timestamps: &[f64],
    config: &CaptureConfig,
) -> Result<Vec<CaptureResult>, FramepressError> {
    if timestamps.is_empty() {
        return Ok(Vec::new());
    }

    let total = timestamps.len();

    let indexed: Result<Vec<(usize, CaptureResult)>, FramepressError> = timestamps
        .par_iter()
        .enumerate()
        .map(|(index, &timestamp)| {
            if config.is_cancelled() {
                return Err(FramepressError::Cancelled);
            }

            let percent = 30.0 + (index as f32 / total as f32) * 40.0;
            let result = extractor.capture(source, timestamp, index + 1, config, percent);
            Ok((index, result))
        })
        .collect();

    // Completion order is arbitrary; page order is timestamp order.
    let mut indexed = indexed?;
    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, result)| result).collect())
}
