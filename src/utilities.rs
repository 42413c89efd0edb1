//! Internal utility functions.
//!
//! Helpers for pixel-data copying, timestamp conversion, and the text
//! sanitization shared by the assembler and the CLI.

use std::time::Duration;

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy pixel data from an FFmpeg video frame into a tightly-packed RGB buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3); this
/// strips it so the result can be handed to [`image::RgbImage::from_raw`].
pub(crate) fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        // Stride includes padding bytes — copy row by row.
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Rescale a PTS value from stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Rescale a PTS value to a frame number.
pub(crate) fn pts_to_frame_number(pts: i64, time_base: Rational, frame_rate: f64) -> u64 {
    (pts_to_seconds(pts, time_base) * frame_rate) as u64
}

/// Replace every non-ASCII or control character in a title with `_`.
///
/// The assembled document uses built-in PDF fonts with Latin-1 coverage, so
/// anything outside printable ASCII gets a placeholder glyph.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect()
}

/// Sanitize a string for use as a file name, capped at 50 characters.
///
/// Keeps ASCII alphanumerics, spaces, and `-_.`; everything else becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii() && (c.is_ascii_alphanumeric() || " -_.".contains(c)) {
                c
            } else {
                '_'
            }
        })
        .take(50)
        .collect()
}

/// Hard-wrap text into lines of at most `width` characters.
///
/// Wrapping is positional, not word-aware — titles are display-only and the
/// fixed column width keeps every line inside the page.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Format seconds as `H:MM:SS` for progress output.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Format a [`Duration`] as `H:MM:SS`.
pub fn format_duration(duration: Duration) -> String {
    format_timestamp(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, sanitize_filename, sanitize_title, wrap_text};

    #[test]
    fn sanitize_title_replaces_non_ascii() {
        assert_eq!(sanitize_title("Caf\u{e9} \u{1F3AC} Video"), "Caf_ _ Video");
        assert_eq!(sanitize_title("plain title"), "plain title");
    }

    #[test]
    fn sanitize_filename_keeps_safe_characters() {
        assert_eq!(sanitize_filename("My Video - part.1"), "My Video - part.1");
        assert_eq!(sanitize_filename("a/b\\c:d"), "a_b_c_d");
    }

    #[test]
    fn sanitize_filename_caps_length() {
        let long = "x".repeat(80);
        assert_eq!(sanitize_filename(&long).len(), 50);
    }

    #[test]
    fn wrap_text_fixed_columns() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_text_short_input_single_line() {
        assert_eq!(wrap_text("abc", 45), vec!["abc"]);
    }

    #[test]
    fn format_timestamp_rolls_over_units() {
        assert_eq!(format_timestamp(0.0), "0:00:00");
        assert_eq!(format_timestamp(75.4), "0:01:15");
        assert_eq!(format_timestamp(3671.0), "1:01:11");
    }
}
