//! In-memory sources for unit tests.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Mutex, Once},
};

use image::{DynamicImage, RgbImage};

use crate::{
    error::VidframesError,
    metadata::VideoMetadata,
    source::{FrameSource, SourceOpener},
};

/// What a fake video does when opened, keyed by file name.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FakeVideo {
    /// Opens and yields this many frames.
    Frames(u64),
    /// Opens, yields this many frames, then reports a decode error.
    BreaksAfter(u64),
    /// Cannot be opened.
    Unopenable,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryOpener {
    videos: HashMap<String, FakeVideo>,
}

impl MemoryOpener {
    pub(crate) fn with(mut self, name: &str, video: FakeVideo) -> Self {
        self.videos.insert(name.to_string(), video);
        self
    }
}

pub(crate) struct MemorySource {
    metadata: VideoMetadata,
    remaining: u64,
    breaks: bool,
    produced: u8,
}

impl FrameSource for MemorySource {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn next_frame(&mut self) -> Option<Result<DynamicImage, VidframesError>> {
        if self.remaining == 0 {
            if self.breaks {
                self.breaks = false;
                return Some(Err(VidframesError::VideoDecodeError(
                    "corrupt packet".to_string(),
                )));
            }
            return None;
        }
        self.remaining -= 1;
        self.produced = self.produced.wrapping_add(1);
        let shade = self.produced;
        Some(Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            4,
            4,
            image::Rgb([shade, shade, shade]),
        ))))
    }
}

impl SourceOpener for MemoryOpener {
    type Source = MemorySource;

    fn open(&self, path: &Path) -> Result<MemorySource, VidframesError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (frames, breaks) = match self.videos.get(&name) {
            Some(FakeVideo::Frames(frames)) => (*frames, false),
            Some(FakeVideo::BreaksAfter(frames)) => (*frames, true),
            Some(FakeVideo::Unopenable) | None => {
                return Err(VidframesError::FileOpen {
                    path: path.to_path_buf(),
                    reason: "Invalid data found when processing input".to_string(),
                });
            }
        };

        Ok(MemorySource {
            metadata: VideoMetadata {
                width: 4,
                height: 4,
                frames_per_second: 25.0,
                frame_count: frames,
                codec: "rawvideo".to_string(),
            },
            remaining: frames,
            breaks,
            produced: 0,
        })
    }
}

/// Records every log line so tests can check which level a message used.
struct CaptureLogger {
    records: Mutex<Vec<(log::Level, String)>>,
}

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

/// Install the capturing logger for this test binary.
pub(crate) fn capture_logs() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Trace);
        }
    });
}

/// Levels of every captured line containing all of `needles`.
pub(crate) fn logged_levels(needles: &[&str]) -> Vec<log::Level> {
    LOGGER
        .records
        .lock()
        .map(|records| {
            records
                .iter()
                .filter(|(_, message)| needles.iter().all(|needle| message.contains(needle)))
                .map(|(level, _)| *level)
                .collect()
        })
        .unwrap_or_default()
}
