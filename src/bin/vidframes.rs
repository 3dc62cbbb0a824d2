use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use vidframes::{
    BatchProcessor, BatchSummary, CancellationToken, DEFAULT_EXTENSIONS, ExtensionFilter,
    ExtractOptions, FfmpegLogLevel, ImageFormat, PixelFormat, ProgressCallback, ProgressInfo,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidframes videos/ frames/\n  vidframes videos/ frames/ --extensions .mp4 .webm --format png\n  vidframes videos/ frames/ --width 640 --gray --progress --verbose";

#[derive(Debug, Parser)]
#[command(
    name = "vidframes",
    version,
    about = "Extract frames from videos in a folder",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Folder containing video files.
    input_folder: PathBuf,

    /// Folder to save extracted frames.
    output_folder: PathBuf,

    /// Video file extensions to process.
    #[arg(long, num_args = 1.., default_values = DEFAULT_EXTENSIONS)]
    extensions: Vec<String>,

    /// Output image format (jpg, png, bmp, tiff, webp).
    #[arg(long, default_value = "jpg")]
    format: String,

    /// Write grayscale frames.
    #[arg(long)]
    gray: bool,

    /// Output width in pixels; height follows the aspect ratio unless given.
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels; width follows the aspect ratio unless given.
    #[arg(long)]
    height: Option<u32>,

    /// Fail instead of overwriting existing frame files.
    #[arg(long)]
    no_clobber: bool,

    /// Process videos in directory listing order instead of sorted order.
    #[arg(long)]
    unsorted: bool,

    /// Process several videos at once.
    #[cfg(feature = "rayon")]
    #[arg(long)]
    parallel: bool,

    /// Show a progress spinner.
    #[arg(long)]
    progress: bool,

    /// Show debug logging output.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {msg}",
        )?);
        bar.enable_steady_tick(Duration::from_millis(120));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let name = info
            .source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let message = match (info.finished, info.total) {
            (true, _) => format!("{name}: done, {} frames", info.current),
            (false, Some(total)) => format!("{name}: {}/{total} frames", info.current),
            (false, None) => format!("{name}: {} frames", info.current),
        };
        self.bar.set_message(message);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn build_options(
    cli: &Cli,
    cancellation: CancellationToken,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let image_format: ImageFormat = cli.format.parse()?;
    let pixel_format = if cli.gray {
        PixelFormat::Gray8
    } else {
        PixelFormat::Rgb8
    };

    if cli.width == Some(0) || cli.height == Some(0) {
        return Err("--width and --height must be greater than 0".into());
    }

    Ok(ExtractOptions::new()
        .with_image_format(image_format)
        .with_pixel_format(pixel_format)
        .with_resolution(cli.width, cli.height)
        .with_overwrite(!cli.no_clobber)
        .with_sorted_discovery(!cli.unsorted)
        .with_cancellation(cancellation))
}

fn print_summary(summary: &BatchSummary, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        let payload = json!({
            "candidates": summary.candidates,
            "videos_processed": summary.videos_processed,
            "total_frames": summary.total_frames,
            "failed_to_open": summary.failed_to_open,
            "output_directory": summary.output_directory.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("\n{}", "Summary:".bold());
    println!("  - Total videos processed: {}", summary.videos_processed);
    println!("  - Total frames extracted: {}", summary.total_frames);
    if summary.failed_to_open > 0 {
        println!(
            "  - {}",
            format!("Could not open: {}", summary.failed_to_open).yellow()
        );
    }
    println!("  - Output directory: {}", summary.output_directory.display());
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(level) = &cli.log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        vidframes::set_ffmpeg_log_level(parsed);
    }

    let cancellation = CancellationToken::new();
    let interrupt = cancellation.clone();
    ctrlc::set_handler(move || interrupt.cancel())?;

    let mut options = build_options(&cli, cancellation)?;
    let terminal_progress = if cli.progress {
        let progress = Arc::new(TerminalProgress::new()?);
        options = options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    let processor =
        BatchProcessor::ffmpeg(options).with_filter(ExtensionFilter::new(&cli.extensions));

    #[cfg(feature = "rayon")]
    let summary = if cli.parallel {
        processor.process_parallel(&cli.input_folder, &cli.output_folder)
    } else {
        processor.process(&cli.input_folder, &cli.output_folder)
    };
    #[cfg(not(feature = "rayon"))]
    let summary = processor.process(&cli.input_folder, &cli.output_folder);

    if let Some(progress) = terminal_progress {
        progress.bar.finish_and_clear();
    }

    let summary = summary?;
    if summary.candidates == 0 && !cli.json {
        println!(
            "{} {}",
            "warning:".yellow().bold(),
            format!(
                "no video files with extensions {} found in {}",
                processor.filter(),
                cli.input_folder.display()
            )
            .yellow()
        );
        return Ok(());
    }

    print_summary(&summary, cli.json)
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use vidframes::{ImageFormat, PixelFormat};

    use super::{CancellationToken, Cli, build_options};

    #[test]
    fn defaults_match_the_plain_invocation() {
        let cli = Cli::try_parse_from(["vidframes", "in", "out"]).unwrap();
        assert_eq!(cli.extensions, [".mp4", ".avi", ".mkv", ".mov"]);
        assert_eq!(cli.format, "jpg");
        assert!(!cli.no_clobber);

        let options = build_options(&cli, CancellationToken::new()).unwrap();
        assert_eq!(options.image_format(), ImageFormat::Jpeg);
        assert_eq!(options.frame_output().pixel_format, PixelFormat::Rgb8);
    }

    #[test]
    fn extensions_take_several_values() {
        let cli = Cli::try_parse_from([
            "vidframes",
            "in",
            "out",
            "--extensions",
            ".webm",
            "MP4",
            "--format",
            "png",
            "--gray",
        ])
        .unwrap();
        assert_eq!(cli.extensions, [".webm", "MP4"]);

        let options = build_options(&cli, CancellationToken::new()).unwrap();
        assert_eq!(options.image_format(), ImageFormat::Png);
        assert_eq!(options.frame_output().pixel_format, PixelFormat::Gray8);
    }

    #[test]
    fn interrupt_token_reaches_the_options() {
        let cli = Cli::try_parse_from(["vidframes", "in", "out"]).unwrap();
        let token = CancellationToken::new();
        let options = build_options(&cli, token.clone()).unwrap();

        let attached = options.cancellation().expect("No cancellation token attached");
        assert!(!attached.is_cancelled());
        token.cancel();
        assert!(attached.is_cancelled());
    }

    #[test]
    fn rejects_missing_output_folder() {
        assert!(Cli::try_parse_from(["vidframes", "in"]).is_err());
    }

    #[test]
    fn rejects_unknown_format_and_zero_width() {
        let cli = Cli::try_parse_from(["vidframes", "in", "out", "--format", "gif"]).unwrap();
        assert!(build_options(&cli, CancellationToken::new()).is_err());

        let cli = Cli::try_parse_from(["vidframes", "in", "out", "--width", "0"]).unwrap();
        assert!(build_options(&cli, CancellationToken::new()).is_err());
    }
}
