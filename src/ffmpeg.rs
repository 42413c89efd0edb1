//! Decoder log verbosity.
//!
//! The in-process decode-seek strategy links FFmpeg, whose internal logging
//! prints to stderr independently of the Rust [`log`] facade. This wrapper
//! lets front-ends tune that output without importing `ffmpeg-next`. It has
//! no effect on the external tool strategy, which runs with
//! `-loglevel error` already.

use ffmpeg_next::util::log::Level;

/// Verbosity of FFmpeg's own stderr output during in-process decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderVerbosity {
    /// Print nothing.
    Quiet,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Debugging output.
    Debug,
}

impl DecoderVerbosity {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            DecoderVerbosity::Quiet => Level::Quiet,
            DecoderVerbosity::Fatal => Level::Fatal,
            DecoderVerbosity::Error => Level::Error,
            DecoderVerbosity::Warning => Level::Warning,
            DecoderVerbosity::Info => Level::Info,
            DecoderVerbosity::Debug => Level::Debug,
        }
    }
}

/// Set the verbosity of FFmpeg's internal stderr output.
///
/// # Example
///
/// ```no_run
/// use framepress::DecoderVerbosity;
///
/// // Keep decoder chatter out of the progress display.
/// framepress::set_decoder_verbosity(DecoderVerbosity::Error);
/// ```
pub fn set_decoder_verbosity(verbosity: DecoderVerbosity) {
    ffmpeg_next::util::log::set_level(verbosity.to_ffmpeg_level());
}
