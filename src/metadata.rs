//! Video metadata.
//!
//! Read once when a source is opened and used for informational logging and
//! progress percentages only; extraction never trusts the reported frame
//! count and always reads until the stream runs dry.

/// Metadata of the video stream being extracted.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second as reported by the container. May be zero.
    pub frames_per_second: f64,
    /// Total frame count as reported (or estimated) by the container.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Duration in seconds, `frame_count / frames_per_second`.
    ///
    /// Zero when the frame rate is not positive.
    pub fn duration_seconds(&self) -> f64 {
        if self.frames_per_second > 0.0 {
            self.frame_count as f64 / self.frames_per_second
        } else {
            0.0
        }
    }
}
