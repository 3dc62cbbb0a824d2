//! Candidate discovery.
//!
//! A candidate is a regular file directly inside the input directory whose
//! suffix, compared case-insensitively, is in the [`ExtensionFilter`]. Only
//! the name is checked, so a renamed non-video file is still a candidate and
//! simply fails to open later.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
};

use crate::error::VidframesError;

/// Suffixes matched when no filter is given.
pub const DEFAULT_EXTENSIONS: [&str; 4] = [".mp4", ".avi", ".mkv", ".mov"];

/// A set of case-insensitive file suffixes.
///
/// Entries are normalised to lowercase with a leading dot, so `"MP4"`,
/// `"mp4"` and `".mp4"` are the same entry. An empty entry matches files
/// without an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Build a filter from any list of suffixes.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for extension in extensions {
            let extension = normalize(extension.as_ref());
            if !normalized.contains(&extension) {
                normalized.push(extension);
            }
        }
        Self {
            extensions: normalized,
        }
    }

    /// The normalised suffixes, in the order first given.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether the file name of `path` ends in one of the suffixes.
    pub fn matches(&self, path: &Path) -> bool {
        let suffix = path
            .extension()
            .map(|extension| format!(".{}", extension.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        self.extensions.contains(&suffix)
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

impl Display for ExtensionFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}]", self.extensions.join(", "))
    }
}

fn normalize(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{trimmed}")
    }
}

/// List the candidate files directly inside `input_dir`.
///
/// With `sorted` the result is ordered by path; otherwise it keeps the order
/// the platform lists entries in, which is unspecified.
///
/// # Errors
///
/// [`VidframesError::IoError`] if the directory cannot be read.
pub fn discover_candidates(
    input_dir: &Path,
    filter: &ExtensionFilter,
    sorted: bool,
) -> Result<Vec<PathBuf>, VidframesError> {
    let mut candidates = Vec::new();

    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() && filter.matches(&path) {
            candidates.push(path);
        } else {
            log::trace!("Skipping {}", path.display());
        }
    }

    if sorted {
        candidates.sort();
    }

    Ok(candidates)
}
