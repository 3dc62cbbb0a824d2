//! Parallel batch processing.
//!
//! Each candidate's extraction is independent and writes only its own
//! prefixed files, so videos can run on separate rayon workers. Every worker
//! opens its own source; nothing decoder-side is shared. Totals match the
//! sequential run, log lines interleave.

use std::path::Path;

use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    batch::{BatchProcessor, BatchSummary},
    configuration::ExtractOptions,
    discovery::ExtensionFilter,
    error::VidframesError,
    extract::{ExtractOutcome, default_prefix},
    source::SourceOpener,
};

impl<O: SourceOpener + Sync> BatchProcessor<O> {
    /// Like [`process`](BatchProcessor::process), with one rayon task per
    /// candidate.
    ///
    /// # Errors
    ///
    /// The first write-class error from any worker.
    pub fn process_parallel(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<BatchSummary, VidframesError> {
        let Some(candidates) = self.prepare(input_dir, output_dir)? else {
            return Ok(BatchSummary::new(output_dir));
        };

        let outcomes: Vec<ExtractOutcome> = candidates
            .par_iter()
            .map(|video_path| {
                let prefix = default_prefix(video_path);
                self.extractor.extract(video_path, output_dir, Some(&prefix))
            })
            .collect::<Result<_, _>>()?;

        let mut summary = BatchSummary::new(output_dir);
        summary.candidates = candidates.len();
        for outcome in &outcomes {
            summary.record(outcome);
        }

        summary.log();
        Ok(summary)
    }
}

/// Parallel counterpart of [`process_directory`](crate::process_directory).
pub fn process_directory_parallel<P, Q>(
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
    processor.process_parallel(input_dir.as_ref(), output_dir.as_ref())
}
