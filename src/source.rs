//! The decoder seam.
//!
//! The extractor never talks to FFmpeg directly. It asks a [`SourceOpener`]
//! for a [`FrameSource`] and pulls frames from it until the source runs dry.
//! [`FfmpegOpener`] is the production opener; tests plug in openers that
//! synthesise frames in memory.

use std::path::Path;

use image::DynamicImage;

use crate::{
    configuration::{ExtractOptions, FrameOutputOptions},
    error::VidframesError,
    metadata::VideoMetadata,
    video_file::VideoFile,
};

/// An opened video that yields decoded frames in decode order.
///
/// Dropping the source releases the underlying decoder and file handle.
pub trait FrameSource {
    /// Metadata read when the source was opened.
    fn metadata(&self) -> &VideoMetadata;

    /// Decode the next frame.
    ///
    /// `None` marks the end of the stream. An `Err` reports a decode failure;
    /// callers treat it the same way as the end of the stream.
    fn next_frame(&mut self) -> Option<Result<DynamicImage, VidframesError>>;
}

/// Opens a [`FrameSource`] for a path.
pub trait SourceOpener {
    /// The source type this opener produces.
    type Source: FrameSource;

    /// Open `path`. Any error is treated as "could not open this video".
    fn open(&self, path: &Path) -> Result<Self::Source, VidframesError>;
}

/// Opens videos with FFmpeg, decoding into the configured pixel layout and
/// resolution.
#[derive(Debug, Clone, Default)]
pub struct FfmpegOpener {
    frame_output: FrameOutputOptions,
}

impl FfmpegOpener {
    /// Create an opener producing frames shaped by `frame_output`.
    pub fn new(frame_output: FrameOutputOptions) -> Self {
        Self { frame_output }
    }

    /// Create an opener matching the frame settings of `options`.
    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::new(options.frame_output.clone())
    }
}

impl SourceOpener for FfmpegOpener {
    type Source = VideoFile;

    fn open(&self, path: &Path) -> Result<VideoFile, VidframesError> {
        VideoFile::open(path, &self.frame_output)
    }
}
