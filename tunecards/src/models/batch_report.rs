//! Batch run outcomes
//!
//! Every file in a batch ends in exactly one [`FileOutcome`]. A failure never
//! stops the batch; it is recorded and the next file runs.

use super::ProcessedFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Outcome of one file in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Pipeline completed
    Succeeded {
        file: PathBuf,
        result: ProcessedFile,
    },
    /// Pipeline aborted; remaining steps for this file were skipped
    Failed { file: PathBuf, error: String },
}

impl FileOutcome {
    /// Input file this outcome belongs to
    pub fn file(&self) -> &Path {
        match self {
            FileOutcome::Succeeded { file, .. } | FileOutcome::Failed { file, .. } => file,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FileOutcome::Succeeded { .. })
    }
}

/// Ordered outcomes of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// When the first file started
    pub started_at: DateTime<Utc>,
    /// When the last file finished
    pub finished_at: DateTime<Utc>,
    /// One entry per input file, in processing order
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Empty report starting now
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            outcomes: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Failed outcomes only
    pub fn failures(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Write the report as pretty JSON
    pub fn export_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}
