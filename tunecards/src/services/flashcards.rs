//! Anki flashcard export
//!
//! One card per MP3: the front plays the file via Anki's `[sound:...]`
//! tag, the back holds a fixed prompt. Output is a two-column CSV with a
//! `Front,Back` header row, written even when there are no cards.

use crate::services::file_scanner::FileScanner;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tunecards_common::Result;

const HEADER: [&str; 2] = ["Front", "Back"];
const LINE_TERMINATOR: &str = "\r\n";

/// One flashcard row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardRecord {
    pub front: String,
    pub back: String,
}

impl FlashcardRecord {
    /// Card for one audio file; relative paths are made absolute
    pub fn for_audio(path: &Path, prompt: &str) -> Result<Self> {
        let absolute = absolute_path(path)?;
        Ok(Self {
            front: format!("[sound:{}]", absolute.display()),
            back: prompt.to_string(),
        })
    }
}

/// Build one record per `.mp3` in `mp3_dir`, sorted by file name
pub fn collect_records(mp3_dir: &Path, prompt: &str) -> Result<Vec<FlashcardRecord>> {
    FileScanner::audio()
        .scan(mp3_dir)?
        .iter()
        .map(|file| FlashcardRecord::for_audio(file, prompt))
        .collect()
}

/// Write records as CSV with a header row
pub fn write_csv(records: &[FlashcardRecord], output: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(output)?);

    write_row(&mut writer, &HEADER)?;
    for record in records {
        write_row(&mut writer, &[record.front.as_str(), record.back.as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

/// Scan `mp3_dir` and write the flashcard CSV; returns the card count
pub fn make_flashcards(mp3_dir: &Path, prompt: &str, output: &Path) -> Result<usize> {
    let records = collect_records(mp3_dir, prompt)?;
    write_csv(&records, output)?;

    info!(
        output = %output.display(),
        cards = records.len(),
        "Created flashcards file"
    );
    Ok(records.len())
}

fn write_row<W: Write>(writer: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let row = fields
        .iter()
        .map(|f| quote_field(f))
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(row.as_bytes())?;
    writer.write_all(LINE_TERMINATOR.as_bytes())
}

/// Quote only when the field contains a delimiter, quote or line break
fn quote_field(field: &str) -> String {
    if field.contains(&[',', '"', '\r', '\n'][..]) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
