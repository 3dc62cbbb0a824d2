//! FFmpeg-backed [`FrameSource`].
//!
//! [`VideoFile`] owns the demuxer, a decoder for the best video stream and a
//! scaler to the requested pixel layout. Frames are produced lazily: each
//! [`next_frame`](FrameSource::next_frame) call reads just enough packets to
//! get the next decoded picture out of the decoder.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::context::Input,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, GrayImage, RgbImage};

use crate::{
    configuration::{FrameOutputOptions, PixelFormat},
    conversion::{frame_to_buffer, rational_to_fps},
    error::VidframesError,
    metadata::VideoMetadata,
    source::FrameSource,
};

/// Packet read failures in a row after which the file is treated as ended.
const MAX_CONSECUTIVE_READ_ERRORS: u32 = 32;

/// What a failed packet read means for the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadFailure {
    /// Skip the bad chunk and read on.
    Retry,
    /// Stop reading and drain the decoder.
    EndOfInput,
}

/// Counts consecutive non-EOF read errors so a damaged chunk is skipped but
/// a file that keeps failing still ends.
#[derive(Debug, Default)]
struct ReadErrors {
    consecutive: u32,
}

impl ReadErrors {
    fn on_error(&mut self, error: &FfmpegError) -> ReadFailure {
        if matches!(error, FfmpegError::Eof) {
            return ReadFailure::EndOfInput;
        }
        self.consecutive += 1;
        if self.consecutive >= MAX_CONSECUTIVE_READ_ERRORS {
            ReadFailure::EndOfInput
        } else {
            ReadFailure::Retry
        }
    }

    fn on_success(&mut self) {
        self.consecutive = 0;
    }
}

/// An opened video file decoded sequentially with FFmpeg.
pub struct VideoFile {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    metadata: VideoMetadata,
    pixel_format: PixelFormat,
    target_width: u32,
    target_height: u32,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    eof_sent: bool,
    done: bool,
    read_errors: ReadErrors,
    file_path: PathBuf,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("file_path", &self.file_path)
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("pixel_format", &self.pixel_format)
            .field("target_width", &self.target_width)
            .field("target_height", &self.target_height)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open `path` and prepare to decode its best video stream.
    ///
    /// # Errors
    ///
    /// [`VidframesError::FileOpen`] if FFmpeg cannot open the container or
    /// build a decoder, [`VidframesError::NoVideoStream`] if there is no video
    /// stream to decode.
    pub fn open<P: AsRef<Path>>(
        path: P,
        frame_output: &FrameOutputOptions,
    ) -> Result<Self, VidframesError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();
        let open_error = |reason: String| VidframesError::FileOpen {
            path: file_path.clone(),
            reason,
        };

        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(VidframesError::NoVideoStream)?;
        let video_stream_index = stream.index();

        let decoder_context = CodecContext::from_parameters(stream.parameters()).map_err(
            |error| open_error(format!("Failed to read video codec parameters: {error}")),
        )?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let frames_per_second = rational_to_fps(stream.avg_frame_rate())
            .or_else(|| rational_to_fps(stream.rate()))
            .unwrap_or(0.0);

        let container_duration = input_context.duration();
        let duration = if container_duration > 0 {
            Duration::from_micros(container_duration as u64)
        } else {
            Duration::ZERO
        };

        // Prefer the muxer's frame count, fall back to duration × rate.
        let frame_count = match stream.frames() {
            frames if frames > 0 => frames as u64,
            _ => (duration.as_secs_f64() * frames_per_second) as u64,
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
        };

        let (target_width, target_height) =
            frame_output.resolve_dimensions(metadata.width, metadata.height);
        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            frame_output.pixel_format.to_ffmpeg_pixel(),
            target_width,
            target_height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| open_error(format!("Failed to create scaler: {error}")))?;

        log::debug!(
            "Video stream {}: {}x{} -> {}x{}, {:.2} fps, codec={}, ~{} frames",
            video_stream_index,
            metadata.width,
            metadata.height,
            target_width,
            target_height,
            metadata.frames_per_second,
            metadata.codec,
            metadata.frame_count,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            metadata,
            pixel_format: frame_output.pixel_format,
            target_width,
            target_height,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            eof_sent: false,
            done: false,
            read_errors: ReadErrors::default(),
            file_path,
        })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn convert_current_frame(&mut self) -> Result<DynamicImage, VidframesError> {
        self.scaler.run(&self.decoded_frame, &mut self.scaled_frame)?;

        let width = self.target_width;
        let height = self.target_height;
        let buffer = frame_to_buffer(
            &self.scaled_frame,
            width,
            height,
            self.pixel_format.bytes_per_pixel(),
        );

        let image = match self.pixel_format {
            PixelFormat::Rgb8 => {
                RgbImage::from_raw(width, height, buffer).map(DynamicImage::ImageRgb8)
            }
            PixelFormat::Gray8 => {
                GrayImage::from_raw(width, height, buffer).map(DynamicImage::ImageLuma8)
            }
        };

        image.ok_or_else(|| {
            VidframesError::VideoDecodeError(format!(
                "Decoded frame data does not fit a {width}x{height} {:?} image",
                self.pixel_format
            ))
        })
    }
}

impl FrameSource for VideoFile {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn next_frame(&mut self) -> Option<Result<DynamicImage, VidframesError>> {
        if self.done {
            return None;
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let converted = self.convert_current_frame();
                if converted.is_err() {
                    self.done = true;
                }
                return Some(converted);
            }

            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    self.read_errors.on_success();
                    if packet.stream() != self.video_stream_index {
                        continue;
                    }
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        self.done = true;
                        return Some(Err(error.into()));
                    }
                }
                Err(error) => {
                    if self.read_errors.on_error(&error) == ReadFailure::Retry {
                        log::debug!(
                            "Skipping unreadable packet in {}: {error}",
                            self.file_path.display()
                        );
                        continue;
                    }
                    if !matches!(error, FfmpegError::Eof) {
                        log::debug!(
                            "Giving up on {} after {MAX_CONSECUTIVE_READ_ERRORS} read errors: {error}",
                            self.file_path.display()
                        );
                    }
                    // Drain whatever the decoder still buffers.
                    if let Err(error) = self.decoder.send_eof() {
                        self.done = true;
                        return Some(Err(error.into()));
                    }
                    self.eof_sent = true;
                }
            }
        }
    }
}
