//! Progress reporting and cancellation support.
//!
//! Progress is a side channel: callbacks observe the extraction but never
//! steer it. The extractor reports once every
//! [`progress_interval`](crate::ExtractOptions::with_progress_interval)
//! frames and once more when a video finishes. Use [`CancellationToken`] to
//! stop a run from the outside.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidframes::{ExtractOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{}: {} frames", info.source.display(), info.current);
//!     }
//! }
//!
//! let options = ExtractOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// A snapshot of extraction progress for one video.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// The video being extracted.
    pub source: PathBuf,
    /// Frames written so far.
    pub current: u64,
    /// Frame count reported by the container, if it reported one.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time since the video was opened.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// `true` for the final report of a video.
    pub finished: bool,
}

/// Receives progress updates during extraction.
///
/// Implementations must be [`Send`] and [`Sync`]; with the `rayon` feature
/// several videos report from worker threads at once.
pub trait ProgressCallback: Send + Sync {
    /// Called at the configured interval and once when a video finishes.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards every notification. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state, so a token handed to
/// [`ExtractOptions::with_cancellation`](crate::ExtractOptions::with_cancellation)
/// can be cancelled from another thread or a signal handler.
///
/// ```
/// use vidframes::CancellationToken;
///
/// let token = CancellationToken::new();
/// let clone = token.clone();
/// token.cancel();
/// assert!(clone.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks per-video timing and fires the callback every `interval` frames.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    source: PathBuf,
    total: Option<u64>,
    current: u64,
    interval: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        source: &Path,
        total: Option<u64>,
        interval: u64,
    ) -> Self {
        Self {
            callback,
            source: source.to_path_buf(),
            total: total.filter(|&t| t > 0),
            current: 0,
            interval: interval.max(1),
            start_time: Instant::now(),
        }
    }

    /// Record one written frame. Returns `true` when this frame crossed a
    /// reporting boundary and the callback fired.
    pub(crate) fn advance(&mut self) -> bool {
        self.current += 1;
        if self.current % self.interval == 0 {
            self.report(false);
            true
        } else {
            false
        }
    }

    /// Emit the final report for this video.
    pub(crate) fn finish(&self) {
        self.report(true);
    }

    fn report(&self, finished: bool) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .map(|t| (self.current as f32 / t as f32 * 100.0).min(100.0));

        let estimated_remaining = if self.current > 0 && !finished {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        self.callback.on_progress(&ProgressInfo {
            source: self.source.clone(),
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            finished,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<ProgressInfo>>,
    }

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.seen.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn tracker_reports_on_interval_boundaries() {
        let recorder = Arc::new(Recorder::default());
        let mut tracker =
            ProgressTracker::new(recorder.clone(), Path::new("clip.mp4"), Some(250), 100);

        let fired: Vec<u64> = (1..=250)
            .filter(|_| tracker.advance())
            .collect();
        tracker.finish();

        assert_eq!(fired, vec![100, 200]);
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].current, 100);
        assert_eq!(seen[0].percentage, Some(40.0));
        assert!(!seen[1].finished);
        assert!(seen[2].finished);
        assert_eq!(seen[2].current, 250);
    }

    #[test]
    fn tracker_ignores_zero_total() {
        let recorder = Arc::new(Recorder::default());
        let tracker = ProgressTracker::new(recorder.clone(), Path::new("a.mov"), Some(0), 10);
        tracker.finish();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].total, None);
        assert_eq!(seen[0].percentage, None);
    }

    #[test]
    fn cancellation_token_clone_shares_state() {
        let token = CancellationToken::default();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
