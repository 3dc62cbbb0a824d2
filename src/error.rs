//! Error types for the `vidframes` crate.
//!
//! [`VidframesError`] is the single error type returned by fallible
//! operations. Only write-class failures (I/O, image encoding, collisions with
//! the overwrite guard) and cancellation ever reach a batch caller; a video
//! that cannot be opened is reported through
//! [`ExtractOutcome::OpenFailed`](crate::ExtractOutcome) instead.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `vidframes` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VidframesError {
    /// The video file could not be opened by the decoder.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was handed to the decoder.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened but holds no video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded or converted.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while listing directories or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// The `image` crate failed to encode a frame.
    #[error("Image encoding error: {0}")]
    ImageError(#[from] ImageError),

    /// A frame file already exists and overwriting is disabled.
    #[error("Output file already exists: {path}")]
    OutputExists {
        /// The colliding output path.
        path: PathBuf,
    },

    /// The requested output image format is not recognised.
    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,
}

impl From<FfmpegError> for VidframesError {
    fn from(error: FfmpegError) -> Self {
        VidframesError::FfmpegError(error.to_string())
    }
}
