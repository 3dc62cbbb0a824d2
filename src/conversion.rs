//! Pixel and rate conversions shared by the FFmpeg-backed source.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Copy plane 0 of a scaled frame into a tightly packed buffer.
///
/// FFmpeg rows often carry padding (stride > width × bytes per pixel); the
/// padding is dropped so the buffer can go straight into
/// [`image::ImageBuffer::from_raw`].
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let data = video_frame.data(0);
    pack_rows(data, stride, width as usize * bytes_per_pixel, height as usize)
}

fn pack_rows(data: &[u8], stride: usize, row_bytes: usize, rows: usize) -> Vec<u8> {
    if stride == row_bytes {
        return data[..row_bytes * rows].to_vec();
    }

    let mut buffer = Vec::with_capacity(row_bytes * rows);
    for row in 0..rows {
        let row_start = row * stride;
        buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
    }
    buffer
}

/// Convert a rational frame rate to frames per second, or `None` when the
/// denominator or numerator is zero.
pub(crate) fn rational_to_fps(rate: Rational) -> Option<f64> {
    if rate.denominator() == 0 || rate.numerator() == 0 {
        None
    } else {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    }
}
