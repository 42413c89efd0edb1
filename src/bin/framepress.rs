use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framepress::{
    CaptureConfig, DecoderVerbosity, DocumentAssembler, MediaSource, PipelineRequest,
    ProgressEvent, ProgressObserver, TimestampSpec, timestamps,
    utilities::{format_duration, sanitize_filename},
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framepress capture input.mp4 --timestamps 0:30,1:15,2:45\n  framepress capture input.mp4 --interval 30 --out lecture.pdf --progress\n  framepress capture https://cdn.example/stream.m3u8 --timestamps 10,60 --duration-hint 0:05:00\n  framepress probe input.mp4 --json\n  framepress completions zsh > _framepress";

#[derive(Debug, Parser)]
#[command(
    name = "framepress",
    version,
    about = "Capture video screenshots at chosen timestamps and press them into a PDF",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show each progress event on stderr.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting an existing output document.
    #[arg(long)]
    overwrite: bool,

    /// Decoder log verbosity (quiet, fatal, error, warning, info, debug).
    #[arg(long)]
    decoder_log: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Capture screenshots and assemble the PDF.
    #[command(
        about = "Capture screenshots into a PDF",
        after_help = "Examples:\n  framepress capture input.mp4 --timestamps 0:30,1:15,2:45\n  framepress capture input.mp4 --interval 30 --title \"Lecture 4\" --progress"
    )]
    Capture {
        /// Input media path or URL.
        input: String,

        /// Comma-separated timestamps (seconds, MM:SS, or HH:MM:SS).
        #[arg(long, conflicts_with = "interval")]
        timestamps: Option<String>,

        /// Capture at regular intervals (seconds).
        #[arg(long)]
        interval: Option<f64>,

        /// Document title. Defaults to the input file name.
        #[arg(long)]
        title: Option<String>,

        /// Output PDF path. A bare file name lands in the PDF/ directory.
        /// Defaults to "<title>_screenshots.pdf".
        #[arg(long)]
        out: Option<PathBuf>,

        /// Directory for intermediate screenshots.
        #[arg(long)]
        scratch_dir: Option<PathBuf>,

        /// Retry rounds per timestamp.
        #[arg(long, default_value_t = 3)]
        retries: u32,

        /// Timeout for one external ffmpeg invocation, in seconds.
        #[arg(long, default_value_t = 15)]
        tool_timeout: u64,

        /// Skip the external ffmpeg tool and decode in-process only.
        #[arg(long)]
        no_tool: bool,

        /// Explicit path to the ffmpeg binary.
        #[arg(long)]
        ffmpeg: Option<PathBuf>,

        /// JPEG quality for decoded frames (1-100).
        #[arg(long, default_value_t = 95)]
        quality: u8,

        /// Duration hint for sources that report none (timecode).
        #[arg(long)]
        duration_hint: Option<String>,

        /// Print the run summary as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print media information (alias: info).
    #[command(
        about = "Probe a media source",
        visible_alias = "info",
        after_help = "Examples:\n  framepress probe input.mp4\n  framepress probe input.mp4 --json"
    )]
    Probe {
        /// Input media path or URL.
        input: String,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_decoder_verbosity(value: &str) -> Option<DecoderVerbosity> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(DecoderVerbosity::Quiet),
        "fatal" => Some(DecoderVerbosity::Fatal),
        "error" => Some(DecoderVerbosity::Error),
        "warning" | "warn" => Some(DecoderVerbosity::Warning),
        "info" => Some(DecoderVerbosity::Info),
        "debug" => Some(DecoderVerbosity::Debug),
        _ => None,
    }
}

/// Default document title: the sanitized input file name without extension.
fn default_title(input: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Video");
    sanitize_filename(stem)
}

fn default_output(title: &str) -> PathBuf {
    PathBuf::from(format!("{}_screenshots.pdf", sanitize_filename(title)))
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

struct BarProgress {
    bar: ProgressBar,
}

impl ProgressObserver for BarProgress {
    fn on_event(&self, event: &ProgressEvent) {
        self.bar.set_position(event.percent.round() as u64);
        self.bar.set_message(event.detail.clone());
    }
}

struct VerboseProgress;

impl ProgressObserver for VerboseProgress {
    fn on_event(&self, event: &ProgressEvent) {
        let line = format!("[{:?}] {}", event.phase, event.detail);
        if event.detail.starts_with("warning") || event.detail.contains("failed") {
            eprintln!("{}", line.yellow());
        } else {
            eprintln!("{}", line.dimmed());
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(level) = &cli.global.decoder_log {
        let parsed = parse_decoder_verbosity(level)
            .ok_or(format!("unsupported --decoder-log: {level}"))?;
        framepress::set_decoder_verbosity(parsed);
    }

    match cli.command {
        Commands::Capture {
            input,
            timestamps: timestamp_list,
            interval,
            title,
            out,
            scratch_dir,
            retries,
            tool_timeout,
            no_tool,
            ffmpeg,
            quality,
            duration_hint,
            json,
        } => {
            let spec = match (timestamp_list, interval) {
                (Some(list), None) => {
                    TimestampSpec::Explicit(timestamps::parse_timecode_list(&list)?)
                }
                (None, Some(interval)) => TimestampSpec::Interval(interval),
                (None, None) => {
                    return Err("provide --timestamps or --interval".into());
                }
                (Some(_), Some(_)) => unreachable!("clap rejects conflicting flags"),
            };

            let title = title.unwrap_or_else(|| default_title(&input));
            let output = out.unwrap_or_else(|| default_output(&title));

            let duration_hint = duration_hint
                .map(|value| timestamps::parse_timecode(&value).map(Duration::from_secs_f64))
                .transpose()?;

            let mut config = CaptureConfig::new()
                .with_max_retries(retries)
                .with_tool_timeout(Duration::from_secs(tool_timeout))
                .with_jpeg_quality(quality)
                .with_external_tool(!no_tool);
            if let Some(dir) = scratch_dir {
                config = config.with_scratch_dir(dir);
            }
            if let Some(binary) = ffmpeg {
                config = config.with_tool_path(binary);
            }

            let progress_bar = if cli.global.progress {
                let bar = ProgressBar::new(100);
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos:>3}% {wide_msg}",
                )?;
                bar.set_style(style.progress_chars("##-"));
                config = config.with_observer(Arc::new(BarProgress { bar: bar.clone() }));
                Some(bar)
            } else {
                if cli.global.verbose {
                    config = config.with_observer(Arc::new(VerboseProgress));
                }
                None
            };

            let assembler = DocumentAssembler::new();
            let resolved_output = assembler.resolve_output_path(&output);
            ensure_writable_path(&resolved_output, cli.global.overwrite)?;

            let request = PipelineRequest {
                locator: input,
                timestamps: spec,
                title,
                output,
                duration_hint,
            };

            let report = framepress::pipeline::run(&request, &config, &assembler)?;

            if let Some(bar) = progress_bar {
                bar.finish_with_message("done");
            }

            if json {
                let payload = json!({
                    "output": report.assembly.output_path,
                    "pages": report.assembly.page_count,
                    "duration_seconds": report.duration.as_secs_f64(),
                    "requested": report.requested,
                    "captured": report.captured,
                    "dropped": report.dropped,
                    "failed_timestamps": report.failed_timestamps,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                if report.dropped > 0 {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!(
                            "{} timestamp(s) outside the video duration were dropped",
                            report.dropped
                        )
                        .yellow()
                    );
                }
                for timestamp in &report.failed_timestamps {
                    eprintln!(
                        "{} {}",
                        "warning:".yellow().bold(),
                        format!("no screenshot captured at {timestamp:.2}s").yellow()
                    );
                }
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "{} screenshot(s) on {} page(s) -> {}",
                        report.captured,
                        report.assembly.page_count,
                        report.assembly.output_path.display(),
                    )
                    .green()
                );
            }
        }
        Commands::Probe { input, json } => {
            let source = MediaSource::probe(&input)?;
            if json {
                let payload = json!({
                    "locator": source.locator,
                    "is_local": source.is_local,
                    "duration_seconds": source.duration.as_secs_f64(),
                    "frame_rate": source.frame_rate,
                    "frame_count": source.frame_count,
                    "width": source.width,
                    "height": source.height,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Locator: {}", source.locator);
                println!(
                    "Source: {}",
                    if source.is_local { "local file" } else { "stream" }
                );
                println!("Duration: {}", format_duration(source.duration));
                println!(
                    "Video: {}x{} @ {:.2} fps, {} frame(s)",
                    source.width, source.height, source.frame_rate, source.frame_count,
                );
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framepress", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{default_output, default_title, parse_decoder_verbosity};

    #[test]
    fn decoder_verbosity_aliases() {
        assert!(parse_decoder_verbosity("quiet").is_some());
        assert!(parse_decoder_verbosity("WARN").is_some());
        assert!(parse_decoder_verbosity("warning").is_some());
        assert!(parse_decoder_verbosity("trace").is_none());
    }

    #[test]
    fn default_title_uses_file_stem() {
        assert_eq!(default_title("clips/My Talk.mp4"), "My Talk");
        assert_eq!(default_title("caf\u{e9}.mkv"), "caf_");
    }

    #[test]
    fn default_output_appends_suffix() {
        assert_eq!(
            default_output("My Talk"),
            PathBuf::from("My Talk_screenshots.pdf")
        );
    }
}
