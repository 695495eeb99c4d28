//! Print the transposition offset of one ABC file
//!
//! **Usage:**
//! ```bash
//! abc-offset tune.abc
//! ```
//!
//! Prints only the signed semitone count that moves the tune's `K:` key down
//! to C, so the value can be fed straight into `abc2abc -t`.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tunecards_common::key::file_transposition_offset;

/// Transposition offset for one file
#[derive(Parser, Debug)]
#[clap(name = "abc-offset")]
#[clap(about = "Print the semitones needed to transpose an ABC file to C")]
struct Args {
    /// ABC file to read
    file: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match file_transposition_offset(&args.file) {
        Ok(offset) => {
            println!("{}", offset);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
