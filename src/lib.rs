//! # vidframes
//!
//! Turn folders of video files into numbered still-image datasets.
//!
//! Every video is decoded frame by frame with FFmpeg (through
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)) and each frame is
//! written with the [`image`] crate as `{prefix}_frame_{index:06}.jpg`,
//! where the prefix defaults to the video's file stem.
//!
//! ## Quick Start
//!
//! ### One video
//!
//! ```no_run
//! use vidframes::ExtractOptions;
//!
//! let outcome = vidframes::extract_frames("input.mp4", "frames", None, &ExtractOptions::new())?;
//! println!("wrote {} frames", outcome.frame_count());
//! # Ok::<(), vidframes::VidframesError>(())
//! ```
//!
//! ### A whole directory
//!
//! ```no_run
//! use vidframes::ExtractOptions;
//!
//! let summary = vidframes::process_directory("videos", "frames", None, &ExtractOptions::new())?;
//! println!(
//!     "{} videos processed, {} frames extracted",
//!     summary.videos_processed, summary.total_frames,
//! );
//! # Ok::<(), vidframes::VidframesError>(())
//! ```
//!
//! ## Failure model
//!
//! A video the decoder cannot open, or one that stops decoding part way,
//! never aborts a batch: it contributes whatever frames it produced. Failing
//! to *write* a frame aborts the run with a [`VidframesError`].
//!
//! ## Decoder seam
//!
//! Extraction is written against the [`FrameSource`] and [`SourceOpener`]
//! traits. [`FfmpegOpener`] is the production implementation; any other
//! decoder can be plugged into [`FrameExtractor::new`].
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `process_parallel()` runs one video per rayon worker |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod batch;
pub mod configuration;
mod conversion;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod metadata;
#[cfg(feature = "rayon")]
mod parallel;
pub mod progress;
pub mod source;
#[cfg(test)]
mod testing;
pub mod video_file;

pub use batch::{BatchProcessor, BatchSummary, process_directory};
pub use configuration::{
    DEFAULT_PROGRESS_INTERVAL, ExtractOptions, FrameOutputOptions, ImageFormat, PixelFormat,
};
pub use discovery::{DEFAULT_EXTENSIONS, ExtensionFilter, discover_candidates};
pub use error::VidframesError;
pub use extract::{ExtractOutcome, FrameExtractor, default_prefix, extract_frames, frame_file_name};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
#[cfg(feature = "rayon")]
pub use parallel::process_directory_parallel;
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use source::{FfmpegOpener, FrameSource, SourceOpener};
pub use video_file::VideoFile;
