//! Result of running one notation file through the pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Pipeline states a file passes through, in order
///
/// `KeyResolved` and `Transposed` only occur when transposition is enabled;
/// `Rendered` and `CleanedUp` only when rendering is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Input path resolved to an existing file
    Located,
    /// `K:` field read and offset computed
    KeyResolved,
    /// Transposer wrote the transposed notation file
    Transposed,
    /// MIDI rendered and encoded to MP3
    Rendered,
    /// Intermediate files removed
    CleanedUp,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Located => "located",
            Stage::KeyResolved => "key resolved",
            Stage::Transposed => "transposed",
            Stage::Rendered => "rendered",
            Stage::CleanedUp => "cleaned up",
        };
        f.write_str(name)
    }
}

/// What a successful pipeline run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFile {
    /// Resolved input notation file
    pub source: PathBuf,
    /// Key read from the `K:` field (transpose only)
    pub key: Option<String>,
    /// Semitone shift passed to the transposer (transpose only)
    pub semitones: Option<i32>,
    /// Transposed notation file, kept only when rendering was skipped
    pub transposed: Option<PathBuf>,
    /// Final MP3 (render only)
    pub audio: Option<PathBuf>,
    /// States reached, in order
    pub stages: Vec<Stage>,
}

impl ProcessedFile {
    pub(crate) fn located(source: PathBuf) -> Self {
        Self {
            source,
            key: None,
            semitones: None,
            transposed: None,
            audio: None,
            stages: vec![Stage::Located],
        }
    }

    pub(crate) fn advance(&mut self, stage: Stage) {
        tracing::debug!(file = %self.source.display(), %stage, "Pipeline stage reached");
        self.stages.push(stage);
    }

    /// Last state reached
    pub fn stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Located)
    }
}
