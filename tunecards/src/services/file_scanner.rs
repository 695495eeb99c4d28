//! Notation and audio file discovery
//!
//! Lists the files directly inside one directory (no recursion) whose
//! extension matches exactly, sorted by file name.

use std::path::{Path, PathBuf};
use tunecards_common::config::CompiledDefaults;
use tunecards_common::{Error, Result};
use walkdir::WalkDir;

/// Single-directory file scanner filtered by extension
pub struct FileScanner {
    extension: String,
}

impl FileScanner {
    /// Scanner for files ending in `.<extension>` (case-sensitive)
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Scanner for `.abc` notation files
    pub fn notation() -> Self {
        Self::new(CompiledDefaults::NOTATION_EXTENSION)
    }

    /// Scanner for `.mp3` audio files
    pub fn audio() -> Self {
        Self::new(CompiledDefaults::AUDIO_EXTENSION)
    }

    /// Scan `dir` for matching files
    ///
    /// Fails with `DirectoryNotFound` when `dir` is missing. Unreadable
    /// entries are logged and skipped. Symlinks to regular files are
    /// included; dangling links are not.
    pub fn scan(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Err(Error::DirectoryNotFound(dir.to_path_buf()));
        }

        if !dir.is_dir() {
            return Err(Error::Config(format!("Not a directory: {}", dir.display())));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    // Follows symlinks
                    if entry.path().is_file() && self.matches(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            extension = %self.extension,
            count = files.len(),
            "Scan complete"
        );

        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext == self.extension.as_str())
            .unwrap_or(false)
    }
}
