//! Per-file pipeline
//!
//! Located → KeyResolved → Transposed → Rendered → CleanedUp
//!
//! Transposition and rendering are each optional. Any failure aborts the
//! remaining steps for that file. Intermediate files left behind by an
//! aborted run are not removed.

use crate::models::{ProcessedFile, Stage};
use crate::services::toolchain::Toolchain;
use std::path::{Path, PathBuf};
use tracing::info;
use tunecards_common::config::{CompiledDefaults, TomlConfig};
use tunecards_common::key::{extract_key, transposition_between};
use tunecards_common::{Error, Result};

/// Options shared by every file in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Transpose into `target_key` before rendering
    pub transpose: bool,
    /// Render to MIDI and MP3
    pub render: bool,
    /// Key to transpose into; also names the transposed file
    pub target_key: String,
    /// Directory for transposed, MIDI and MP3 files
    pub output_dir: PathBuf,
}

impl ProcessOptions {
    /// Transpose and render into the configured target key and output dir
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            transpose: true,
            render: true,
            target_key: config.target_key.clone(),
            output_dir: config.output_dir.clone(),
        }
    }
}

/// Resolve a user-supplied notation file name
///
/// Adds the `.abc` extension when none is given, then tries the path as
/// given and finally relative to `abc_dir`.
pub fn resolve_input(name: &Path, abc_dir: &Path) -> Result<PathBuf> {
    let mut path = name.to_path_buf();
    if path.extension().is_none() {
        path.set_extension(CompiledDefaults::NOTATION_EXTENSION);
    }

    if path.exists() {
        return Ok(path);
    }

    let candidate = abc_dir.join(&path);
    if candidate.exists() {
        return Ok(candidate);
    }

    Err(Error::FileNotFound {
        path,
        searched: abc_dir.to_path_buf(),
    })
}

/// Runs notation files through a [`Toolchain`]
pub struct Pipeline<T: Toolchain> {
    toolchain: T,
    abc_dir: PathBuf,
    options: ProcessOptions,
}

impl<T: Toolchain> Pipeline<T> {
    pub fn new(toolchain: T, abc_dir: impl Into<PathBuf>, options: ProcessOptions) -> Self {
        Self {
            toolchain,
            abc_dir: abc_dir.into(),
            options,
        }
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    pub fn abc_dir(&self) -> &Path {
        &self.abc_dir
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Process one notation file
    pub fn process(&self, name: &Path) -> Result<ProcessedFile> {
        let input = resolve_input(name, &self.abc_dir)?;
        let mut record = ProcessedFile::located(input.clone());

        let base_name = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_dir = &self.options.output_dir;
        std::fs::create_dir_all(output_dir)?;

        let working = if self.options.transpose {
            let key = extract_key(&input)?;
            let semitones = transposition_between(&key, &self.options.target_key)?;
            record.key = Some(key);
            record.semitones = Some(semitones);
            record.advance(Stage::KeyResolved);

            let transposed = output_dir.join(format!(
                "{}-in-{}.abc",
                base_name,
                self.options.target_key.to_lowercase()
            ));
            self.toolchain.transpose(&input, semitones, &transposed)?;
            info!(
                file = %input.display(),
                target_key = %self.options.target_key,
                semitones,
                "Transposed to {}: {}",
                self.options.target_key,
                transposed.display()
            );
            record.transposed = Some(transposed.clone());
            record.advance(Stage::Transposed);
            transposed
        } else {
            input.clone()
        };

        if self.options.render {
            let midi = output_dir.join(format!("{}.mid", base_name));
            let mp3 = output_dir.join(format!("{}.mp3", base_name));

            self.toolchain.render_midi(&working, &midi)?;
            self.toolchain.encode_audio(&midi, &mp3)?;
            record.audio = Some(mp3);
            record.advance(Stage::Rendered);

            std::fs::remove_file(&midi)?;
            if let Some(transposed) = record.transposed.take() {
                std::fs::remove_file(&transposed)?;
            }
            record.advance(Stage::CleanedUp);
        }

        Ok(record)
    }
}
