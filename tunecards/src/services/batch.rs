//! Batch runner
//!
//! Applies a per-file step to every notation file in order. Each file gets a
//! typed [`FileOutcome`]; failures are reported and the batch moves on.
//! Strictly sequential.

use crate::models::{BatchReport, FileOutcome, ProcessedFile};
use crate::services::file_scanner::FileScanner;
use crate::services::pipeline::Pipeline;
use crate::services::toolchain::Toolchain;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Run `step` over `files`, turning each result into an outcome
///
/// Does no I/O of its own, so any closure (including one that never touches
/// a subprocess) can drive it.
pub fn run_batch<I, F>(files: I, step: F) -> BatchReport
where
    I: IntoIterator<Item = PathBuf>,
    F: FnMut(&Path) -> tunecards_common::Result<ProcessedFile>,
{
    run_batch_with(files, step, |_| {})
}

/// Like [`run_batch`], handing each outcome to `on_outcome` as soon as it
/// is known
pub fn run_batch_with<I, F, O>(files: I, mut step: F, mut on_outcome: O) -> BatchReport
where
    I: IntoIterator<Item = PathBuf>,
    F: FnMut(&Path) -> tunecards_common::Result<ProcessedFile>,
    O: FnMut(&FileOutcome),
{
    let mut report = BatchReport::new();

    for file in files {
        let name = display_name(&file);
        info!("Processing {}...", name);

        let outcome = match step(&file) {
            Ok(result) => FileOutcome::Succeeded { file, result },
            Err(e) => {
                error!("Error processing {}: {}", name, e);
                FileOutcome::Failed {
                    file,
                    error: e.to_string(),
                }
            }
        };
        on_outcome(&outcome);
        report.outcomes.push(outcome);
    }

    report.finished_at = Utc::now();
    report
}

/// Scan the pipeline's notation directory and process every file
///
/// Creates the output directory once there is something to process. Fails
/// only when either directory cannot be used; per-file errors end up in
/// the report.
pub fn process_all<T, O>(pipeline: &Pipeline<T>, on_outcome: O) -> tunecards_common::Result<BatchReport>
where
    T: Toolchain,
    O: FnMut(&FileOutcome),
{
    let files = FileScanner::notation().scan(pipeline.abc_dir())?;
    if !files.is_empty() {
        std::fs::create_dir_all(&pipeline.options().output_dir)?;
    }
    Ok(run_batch_with(files, |file| pipeline.process(file), on_outcome))
}

/// Short name for a file in progress and error lines
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
