//! Extraction options.
//!
//! [`ExtractOptions`] is a builder that threads the output codec, pixel
//! layout, progress reporting, cancellation, and the overwrite guard through
//! the extractor and batch driver without widening every signature.
//!
//! # Example
//!
//! ```no_run
//! use vidframes::{ExtractOptions, ImageFormat, PixelFormat};
//!
//! let options = ExtractOptions::new()
//!     .with_image_format(ImageFormat::Png)
//!     .with_pixel_format(PixelFormat::Gray8)
//!     .with_resolution(Some(640), None)
//!     .with_overwrite(false);
//! ```

use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str::FromStr,
    sync::Arc,
};

use ffmpeg_next::format::Pixel;

use crate::{
    error::VidframesError,
    progress::{CancellationToken, NoOpProgress, ProgressCallback},
};

/// How many frames pass between two progress reports, by default.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// Raster format used when writing frames to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// JPEG, written with the `jpg` extension. This is the default.
    #[default]
    Jpeg,
    /// Lossless PNG.
    Png,
    /// Uncompressed BMP.
    Bmp,
    /// TIFF.
    Tiff,
    /// Lossless WebP.
    WebP,
}

impl ImageFormat {
    /// File extension (without the dot) used for frame files.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::WebP => "webp",
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = VidframesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            "bmp" => Ok(ImageFormat::Bmp),
            "tif" | "tiff" => Ok(ImageFormat::Tiff),
            "webp" => Ok(ImageFormat::WebP),
            _ => Err(VidframesError::UnsupportedImageFormat(value.to_string())),
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.extension())
    }
}

/// Pixel layout of decoded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8-bit RGB (24 bpp). This is the default.
    #[default]
    Rgb8,
    /// 8-bit grayscale (8 bpp).
    Gray8,
}

impl PixelFormat {
    pub(crate) fn to_ffmpeg_pixel(self) -> Pixel {
        match self {
            PixelFormat::Rgb8 => Pixel::RGB24,
            PixelFormat::Gray8 => Pixel::GRAY8,
        }
    }

    pub(crate) fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Pixel layout and resolution of the frames handed to the encoder.
///
/// With no dimensions set the source resolution is kept. Setting a single
/// dimension while [`maintain_aspect_ratio`](FrameOutputOptions::maintain_aspect_ratio)
/// is on derives the other one from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutputOptions {
    /// Output pixel layout.
    pub pixel_format: PixelFormat,
    /// Target width. `None` keeps the source width.
    pub width: Option<u32>,
    /// Target height. `None` keeps the source height.
    pub height: Option<u32>,
    /// Derive the missing dimension from the source aspect ratio.
    pub maintain_aspect_ratio: bool,
}

impl Default for FrameOutputOptions {
    fn default() -> Self {
        Self {
            pixel_format: PixelFormat::Rgb8,
            width: None,
            height: None,
            maintain_aspect_ratio: true,
        }
    }
}

impl FrameOutputOptions {
    /// Resolve the final `(width, height)` for a source of the given size.
    pub(crate) fn resolve_dimensions(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) if self.maintain_aspect_ratio && source_width > 0 => {
                let ratio = w as f64 / source_width as f64;
                let h = (source_height as f64 * ratio).round() as u32;
                (w, h.max(1))
            }
            (Some(w), None) => (w, source_height),
            (None, Some(h)) if self.maintain_aspect_ratio && source_height > 0 => {
                let ratio = h as f64 / source_height as f64;
                let w = (source_width as f64 * ratio).round() as u32;
                (w.max(1), h)
            }
            (None, Some(h)) => (source_width, h),
            (None, None) => (source_width, source_height),
        }
    }
}

/// Settings for frame extraction and batch processing.
///
/// A default-constructed value reproduces the plain behavior: JPEG output,
/// RGB frames at source resolution, silent overwrite of same-named files,
/// progress every [`DEFAULT_PROGRESS_INTERVAL`] frames, and candidates
/// processed in sorted path order.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) image_format: ImageFormat,
    pub(crate) frame_output: FrameOutputOptions,
    pub(crate) overwrite: bool,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) progress_interval: u64,
    pub(crate) cancellation: Option<CancellationToken>,
    pub(crate) sorted_discovery: bool,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("image_format", &self.image_format)
            .field("frame_output", &self.frame_output)
            .field("overwrite", &self.overwrite)
            .field("progress_interval", &self.progress_interval)
            .field("has_cancellation", &self.cancellation.is_some())
            .field("sorted_discovery", &self.sorted_discovery)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            image_format: ImageFormat::default(),
            frame_output: FrameOutputOptions::default(),
            overwrite: true,
            progress: Arc::new(NoOpProgress),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            cancellation: None,
            sorted_discovery: true,
        }
    }

    /// Set the raster format frames are written in.
    #[must_use]
    pub fn with_image_format(mut self, format: ImageFormat) -> Self {
        self.image_format = format;
        self
    }

    /// Set the pixel layout of decoded frames.
    #[must_use]
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.frame_output.pixel_format = format;
        self
    }

    /// Rescale frames before writing. `None` keeps the source dimension.
    #[must_use]
    pub fn with_resolution(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.frame_output.width = width;
        self.frame_output.height = height;
        self
    }

    /// Control whether a single given dimension keeps the aspect ratio.
    /// Defaults to `true`.
    #[must_use]
    pub fn with_maintain_aspect_ratio(mut self, maintain: bool) -> Self {
        self.frame_output.maintain_aspect_ratio = maintain;
        self
    }

    /// Replace the whole frame output configuration.
    #[must_use]
    pub fn with_frame_output(mut self, output: FrameOutputOptions) -> Self {
        self.frame_output = output;
        self
    }

    /// Allow or forbid replacing existing frame files.
    ///
    /// When `false`, hitting an existing file fails the run with
    /// [`VidframesError::OutputExists`].
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how many frames pass between progress reports. Clamped to at
    /// least 1.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Attach a cancellation token, checked before every frame.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Process candidates in sorted path order (`true`, the default) or in
    /// whatever order the platform lists them.
    #[must_use]
    pub fn with_sorted_discovery(mut self, sorted: bool) -> Self {
        self.sorted_discovery = sorted;
        self
    }

    /// The configured output image format.
    pub fn image_format(&self) -> ImageFormat {
        self.image_format
    }

    /// The configured frame output settings.
    pub fn frame_output(&self) -> &FrameOutputOptions {
        &self.frame_output
    }

    /// The attached cancellation token, if any.
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}
