//! Frame extraction for a single video.
//!
//! [`FrameExtractor`] opens one video through a [`SourceOpener`], pulls every
//! frame in decode order and writes it as
//! `{prefix}_frame_{index:06}.{extension}` into the output directory.
//!
//! A video that cannot be opened is not an error: it comes back as
//! [`ExtractOutcome::OpenFailed`] so a batch can move on. Decode errors end
//! the stream early in the same way the end of the file does. Only failures
//! to write a frame (and cancellation) are returned as `Err`.
//!
//! # Example
//!
//! ```no_run
//! use vidframes::ExtractOptions;
//!
//! let outcome = vidframes::extract_frames("input.mp4", "frames", None, &ExtractOptions::new())?;
//! println!("{} frames written", outcome.frame_count());
//! # Ok::<(), vidframes::VidframesError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::DynamicImage;

use crate::{
    configuration::ExtractOptions,
    error::VidframesError,
    progress::ProgressTracker,
    source::{FfmpegOpener, FrameSource, SourceOpener},
};

/// Result of extracting one video.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ExtractOutcome {
    /// The video opened and `frames` frames were written. Zero is possible
    /// for empty or corrupt streams.
    Opened {
        /// Number of frame files written.
        frames: u64,
    },
    /// The decoder could not open the video. Nothing was written.
    OpenFailed {
        /// Why the open failed.
        reason: String,
    },
}

impl ExtractOutcome {
    /// Frames written; zero for [`OpenFailed`](ExtractOutcome::OpenFailed).
    pub fn frame_count(&self) -> u64 {
        match self {
            ExtractOutcome::Opened { frames } => *frames,
            ExtractOutcome::OpenFailed { .. } => 0,
        }
    }

    /// Whether the video could not be opened.
    pub fn is_open_failure(&self) -> bool {
        matches!(self, ExtractOutcome::OpenFailed { .. })
    }
}

/// File name of frame `index` for `prefix`, e.g. `clip_frame_000042.jpg`.
pub fn frame_file_name(prefix: &str, index: u64, extension: &str) -> String {
    format!("{prefix}_frame_{index:06}.{extension}")
}

/// The prefix used when none is given: the file name without its extension.
pub fn default_prefix(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extracts every frame of a video to numbered image files.
#[derive(Debug, Clone)]
pub struct FrameExtractor<O> {
    pub(crate) opener: O,
    pub(crate) options: ExtractOptions,
}

impl FrameExtractor<FfmpegOpener> {
    /// An extractor decoding with FFmpeg, shaped by `options`.
    pub fn ffmpeg(options: ExtractOptions) -> Self {
        Self::new(FfmpegOpener::from_options(&options), options)
    }
}

impl<O: SourceOpener> FrameExtractor<O> {
    /// Create an extractor using `opener` to decode videos.
    pub fn new(opener: O, options: ExtractOptions) -> Self {
        Self { opener, options }
    }

    /// The options this extractor writes with.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract all frames of `video_path` into `output_dir`.
    ///
    /// `output_dir` and its parents are created if missing. `prefix`
    /// defaults to [`default_prefix`].
    ///
    /// # Errors
    ///
    /// - [`VidframesError::IoError`] if the output directory cannot be
    ///   created or a frame cannot be written.
    /// - [`VidframesError::ImageError`] if a frame cannot be encoded.
    /// - [`VidframesError::OutputExists`] if overwriting is disabled and a
    ///   frame file already exists.
    /// - [`VidframesError::Cancelled`] if the cancellation token fired.
    pub fn extract(
        &self,
        video_path: &Path,
        output_dir: &Path,
        prefix: Option<&str>,
    ) -> Result<ExtractOutcome, VidframesError> {
        fs::create_dir_all(output_dir)?;

        let prefix = prefix.map_or_else(|| default_prefix(video_path), str::to_owned);

        let mut source = match self.opener.open(video_path) {
            Ok(source) => source,
            Err(error) => {
                log::warn!("Could not open video {}: {error}", video_path.display());
                return Ok(ExtractOutcome::OpenFailed {
                    reason: error.to_string(),
                });
            }
        };

        let metadata = source.metadata();
        log::info!(
            "Processing {}: fps={:.2}, total_frames={}, duration={:.2}s",
            video_path.display(),
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.duration_seconds(),
        );

        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            video_path,
            Some(metadata.frame_count),
            self.options.progress_interval,
        );
        let extension = self.options.image_format.extension();
        let mut frames = 0_u64;

        loop {
            if self.options.is_cancelled() {
                return Err(VidframesError::Cancelled);
            }

            let image = match source.next_frame() {
                Some(Ok(image)) => image,
                Some(Err(error)) => {
                    log::debug!(
                        "Stopping {} at frame {frames}: {error}",
                        video_path.display()
                    );
                    break;
                }
                None => break,
            };

            let frame_path = output_dir.join(frame_file_name(&prefix, frames, extension));
            self.write_frame(&image, &frame_path)?;
            frames += 1;

            if tracker.advance() {
                log::info!("Extracted {frames} frames so far from {}", video_path.display());
            }
        }

        drop(source);
        tracker.finish();

        log::info!(
            "Completed: {frames} frames extracted from {} to {}",
            video_path.display(),
            output_dir.display(),
        );

        Ok(ExtractOutcome::Opened { frames })
    }

    fn write_frame(&self, image: &DynamicImage, path: &Path) -> Result<(), VidframesError> {
        if !self.options.overwrite && path.exists() {
            return Err(VidframesError::OutputExists {
                path: PathBuf::from(path),
            });
        }
        image.save_with_format(path, self.options.image_format.to_image_format())?;
        Ok(())
    }
}

/// Extract every frame of `video_path` into `output_dir` using FFmpeg.
///
/// Shorthand for [`FrameExtractor::ffmpeg`] followed by
/// [`FrameExtractor::extract`].
pub fn extract_frames<P, Q>(
    video_path: P,
    output_dir: Q,
    prefix: Option<&str>,
    options: &ExtractOptions,
) -> Result<ExtractOutcome, VidframesError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    FrameExtractor::ffmpeg(options.clone()).extract(
        video_path.as_ref(),
        output_dir.as_ref(),
        prefix,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        configuration::ImageFormat,
        progress::{CancellationToken, ProgressCallback, ProgressInfo},
        testing::{FakeVideo, MemoryOpener},
    };

    fn listing(directory: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(directory)
            .expect("Failed to read output dir")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn frame_names_are_zero_padded() {
        assert_eq!(frame_file_name("a", 0, "jpg"), "a_frame_000000.jpg");
        assert_eq!(frame_file_name("clip", 1234, "png"), "clip_frame_001234.png");
        assert_eq!(frame_file_name("x", 1_234_567, "jpg"), "x_frame_1234567.jpg");
    }

    #[test]
    fn default_prefix_strips_directory_and_extension() {
        assert_eq!(default_prefix(Path::new("/videos/My Clip.MP4")), "My Clip");
        assert_eq!(default_prefix(Path::new("archive.tar.mkv")), "archive.tar");
    }

    #[test]
    fn writes_one_file_per_frame_without_gaps() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let output = directory.path().join("nested").join("out");
        let extractor = FrameExtractor::new(
            MemoryOpener::default().with("a.mp4", FakeVideo::Frames(3)),
            ExtractOptions::new(),
        );

        let outcome = extractor
            .extract(Path::new("in/a.mp4"), &output, None)
            .expect("Extraction failed");

        assert_eq!(outcome, ExtractOutcome::Opened { frames: 3 });
        assert_eq!(
            listing(&output),
            ["a_frame_000000.jpg", "a_frame_000001.jpg", "a_frame_000002.jpg"]
        );
        let decoded = image::open(output.join("a_frame_000002.jpg")).expect("Unreadable frame");
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
    }

    #[test]
    fn explicit_prefix_and_format_are_used() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let extractor = FrameExtractor::new(
            MemoryOpener::default().with("a.mp4", FakeVideo::Frames(2)),
            ExtractOptions::new().with_image_format(ImageFormat::Png),
        );

        extractor
            .extract(Path::new("a.mp4"), directory.path(), Some("take1"))
            .expect("Extraction failed");

        assert_eq!(
            listing(directory.path()),
            ["take1_frame_000000.png", "take1_frame_000001.png"]
        );
    }

    #[test]
    fn unopenable_video_returns_open_failure_and_writes_nothing() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let extractor = FrameExtractor::new(MemoryOpener::default(), ExtractOptions::new());

        let outcome = extractor
            .extract(Path::new("missing.mp4"), directory.path(), None)
            .expect("Open failure must not be an error");

        assert!(outcome.is_open_failure());
        assert_eq!(outcome.frame_count(), 0);
        assert!(listing(directory.path()).is_empty());
    }

    #[test]
    fn empty_stream_opens_with_zero_frames() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let extractor = FrameExtractor::new(
            MemoryOpener::default().with("b.mov", FakeVideo::Frames(0)),
            ExtractOptions::new(),
        );

        let outcome = extractor
            .extract(Path::new("b.mov"), directory.path(), None)
            .expect("Extraction failed");

        assert_eq!(outcome, ExtractOutcome::Opened { frames: 0 });
        assert_eq!(outcome.frame_count(), 0);
        assert!(!outcome.is_open_failure());
    }

    #[test]
    fn decode_error_ends_the_stream() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let extractor = FrameExtractor::new(
            MemoryOpener::default().with("c.avi", FakeVideo::BreaksAfter(2)),
            ExtractOptions::new(),
        );

        let outcome = extractor
            .extract(Path::new("c.avi"), directory.path(), None)
            .expect("Decode errors must not be fatal");

        assert_eq!(outcome.frame_count(), 2);
        assert_eq!(listing(directory.path()).len(), 2);
    }

    #[test]
    fn rerun_overwrites_by_default() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let extractor = FrameExtractor::new(
            MemoryOpener::default().with("a.mp4", FakeVideo::Frames(2)),
            ExtractOptions::new(),
        );

        for _ in 0..2 {
            let outcome = extractor
                .extract(Path::new("a.mp4"), directory.path(), None)
                .expect("Extraction failed");
            assert_eq!(outcome.frame_count(), 2);
        }
        assert_eq!(listing(directory.path()).len(), 2);
    }

    #[test]
    fn overwrite_guard_rejects_existing_files() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(directory.path().join("a_frame_000001.jpg"), b"old").unwrap();
        let extractor = FrameExtractor::new(
            MemoryOpener::default().with("a.mp4", FakeVideo::Frames(3)),
            ExtractOptions::new().with_overwrite(false),
        );

        let result = extractor.extract(Path::new("a.mp4"), directory.path(), None);

        match result {
            Err(VidframesError::OutputExists { path }) => {
                assert!(path.ends_with("a_frame_000001.jpg"));
            }
            other => panic!("Expected OutputExists, got: {other:?}"),
        }
        assert_eq!(fs::read(directory.path().join("a_frame_000001.jpg")).unwrap(), b"old");
    }

    #[test]
    fn unwritable_output_is_fatal() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let blocker = directory.path().join("not_a_dir");
        fs::write(&blocker, b"file").unwrap();
        let extractor = FrameExtractor::new(
            MemoryOpener::default().with("a.mp4", FakeVideo::Frames(1)),
            ExtractOptions::new(),
        );

        let result = extractor.extract(Path::new("a.mp4"), &blocker, None);
        assert!(matches!(result, Err(VidframesError::IoError(_))));
    }

    #[test]
    fn cancelled_token_stops_extraction() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let token = CancellationToken::new();
        token.cancel();
        let extractor = FrameExtractor::new(
            MemoryOpener::default().with("a.mp4", FakeVideo::Frames(5)),
            ExtractOptions::new().with_cancellation(token),
        );

        let result = extractor.extract(Path::new("a.mp4"), directory.path(), None);
        assert!(matches!(result, Err(VidframesError::Cancelled)));
        assert!(listing(directory.path()).is_empty());
    }

    #[derive(Default)]
    struct Recorder {
        counts: Mutex<Vec<(u64, bool)>>,
    }

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.counts
                .lock()
                .unwrap()
                .push((info.current, info.finished));
        }
    }

    #[test]
    fn progress_fires_every_interval_and_on_completion() {
        let directory = tempfile::tempdir().expect("Failed to create temp dir");
        let recorder = Arc::new(Recorder::default());
        let extractor = FrameExtractor::new(
            MemoryOpener::default().with("a.mp4", FakeVideo::Frames(7)),
            ExtractOptions::new()
                .with_progress(recorder.clone())
                .with_progress_interval(3),
        );

        extractor
            .extract(Path::new("a.mp4"), directory.path(), None)
            .expect("Extraction failed");

        assert_eq!(
            *recorder.counts.lock().unwrap(),
            vec![(3, false), (6, false), (7, true)]
        );
    }
}
