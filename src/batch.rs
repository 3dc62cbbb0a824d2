//! Batch processing of a directory of videos.
//!
//! [`BatchProcessor`] discovers the candidates in an input directory, runs a
//! [`FrameExtractor`] on each one with the file stem as prefix, and totals
//! the results into a [`BatchSummary`].
//!
//! # Example
//!
//! ```no_run
//! use vidframes::{ExtensionFilter, ExtractOptions};
//!
//! let filter = ExtensionFilter::new([".mp4", ".webm"]);
//! let summary = vidframes::process_directory("videos", "frames", Some(&filter), &ExtractOptions::new())?;
//! println!("{} videos, {} frames", summary.videos_processed, summary.total_frames);
//! # Ok::<(), vidframes::VidframesError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    configuration::ExtractOptions,
    discovery::{ExtensionFilter, discover_candidates},
    error::VidframesError,
    extract::{ExtractOutcome, FrameExtractor, default_prefix},
    source::{FfmpegOpener, SourceOpener},
};

/// Totals of one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct BatchSummary {
    /// Files that matched the extension filter.
    pub candidates: usize,
    /// Videos that produced at least one frame.
    pub videos_processed: usize,
    /// Frames written across all videos.
    pub total_frames: u64,
    /// Candidates the decoder could not open.
    pub failed_to_open: usize,
    /// Where the frames were written.
    pub output_directory: PathBuf,
}

impl BatchSummary {
    pub(crate) fn new(output_directory: &Path) -> Self {
        Self {
            candidates: 0,
            videos_processed: 0,
            total_frames: 0,
            failed_to_open: 0,
            output_directory: output_directory.to_path_buf(),
        }
    }

    /// Fold one video's outcome into the totals.
    ///
    /// A video counts as processed only when it produced frames; an opened
    /// but empty video is attempted without being counted.
    pub(crate) fn record(&mut self, outcome: &ExtractOutcome) {
        let frames = outcome.frame_count();
        if frames > 0 {
            self.videos_processed += 1;
        }
        if outcome.is_open_failure() {
            self.failed_to_open += 1;
        }
        self.total_frames += frames;
    }

    pub(crate) fn log(&self) {
        log::debug!(
            "Summary: videos_processed={}, total_frames={}, failed_to_open={}, output_directory={}",
            self.videos_processed,
            self.total_frames,
            self.failed_to_open,
            self.output_directory.display(),
        );
    }
}

/// Runs a [`FrameExtractor`] over every candidate in a directory.
#[derive(Debug, Clone)]
pub struct BatchProcessor<O> {
    pub(crate) extractor: FrameExtractor<O>,
    pub(crate) filter: ExtensionFilter,
}

impl BatchProcessor<FfmpegOpener> {
    /// A processor decoding with FFmpeg, shaped by `options`.
    pub fn ffmpeg(options: ExtractOptions) -> Self {
        Self::new(FrameExtractor::ffmpeg(options))
    }
}

impl<O: SourceOpener> BatchProcessor<O> {
    /// Create a processor matching [`ExtensionFilter::default`].
    pub fn new(extractor: FrameExtractor<O>) -> Self {
        Self {
            extractor,
            filter: ExtensionFilter::default(),
        }
    }

    /// Replace the extension filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ExtensionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// The active extension filter.
    pub fn filter(&self) -> &ExtensionFilter {
        &self.filter
    }

    /// Extract every candidate in `input_dir` into `output_dir`.
    ///
    /// Videos that fail to open or yield no frames do not stop the run.
    ///
    /// # Errors
    ///
    /// Listing `input_dir`, creating `output_dir`, and any write error from
    /// [`FrameExtractor::extract`] abort the run.
    pub fn process(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<BatchSummary, VidframesError> {
        let Some(candidates) = self.prepare(input_dir, output_dir)? else {
            return Ok(BatchSummary::new(output_dir));
        };

        let mut summary = BatchSummary::new(output_dir);
        summary.candidates = candidates.len();

        for video_path in &candidates {
            let prefix = default_prefix(video_path);
            let outcome = self
                .extractor
                .extract(video_path, output_dir, Some(&prefix))?;
            summary.record(&outcome);
        }

        summary.log();
        Ok(summary)
    }

    /// Create the output directory and list candidates. `None` when there
    /// is nothing to do.
    pub(crate) fn prepare(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<Option<Vec<PathBuf>>, VidframesError> {
        fs::create_dir_all(output_dir)?;

        let candidates = discover_candidates(
            input_dir,
            &self.filter,
            self.extractor.options.sorted_discovery,
        )?;

        if candidates.is_empty() {
            log::debug!(
                "No video files with extensions {} found in {}",
                self.filter,
                input_dir.display()
            );
            return Ok(None);
        }

        log::info!("Found {} video files to process.", candidates.len());
        Ok(Some(candidates))
    }
}

/// Extract every video in `input_dir` into `output_dir` using FFmpeg.
///
/// `extensions` defaults to [`ExtensionFilter::default`]. The number of
/// videos that produced frames is
/// [`summary.videos_processed`](BatchSummary::videos_processed).
pub fn process_directory<P, Q>(
    input_dir: P,
    output_dir: Q,
    extensions: Option<&ExtensionFilter>,
    options: &ExtractOptions,
) -> Result<BatchSummary, VidframesError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let mut processor = BatchProcessor::ffmpeg(options.clone());
    if let Some(filter) = extensions {
        processor = processor.with_filter(filter.clone());
    }
    processor.process(input_dir.as_ref(), output_dir.as_ref())
}
