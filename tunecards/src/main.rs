//! tunecards - ABC to MP3 batch converter and flashcard exporter
//!
//! **Usage:**
//! ```bash
//! tunecards list
//! tunecards process <FILE> [--no-transpose] [--no-render] [--key K] [--output-dir DIR]
//! tunecards process-all [same flags] [--report FILE]
//! tunecards make-flashcards [--output-file PATH]
//! tunecards offset <FILE>
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tunecards::services::{self, FileScanner};
use tunecards::{ExternalToolchain, FileOutcome, Pipeline, ProcessOptions, ProcessedFile};
use tunecards_common::config::{self, TomlConfig, LOCAL_CONFIG_FILE};
use tunecards_common::key::file_transposition_offset;
use tunecards_common::Error;

/// Command-line arguments for tunecards
#[derive(Parser, Debug)]
#[command(name = "tunecards")]
#[command(about = "Convert ABC tunes to MP3 and make Anki flashcards for them")]
#[command(version)]
struct Cli {
    /// Config file (default: ./tunecards.toml, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding .abc files
    #[arg(long, global = true, value_name = "DIR", env = "TUNECARDS_ABC_DIR")]
    abc_dir: Option<PathBuf>,

    /// Directory scanned for .mp3 files when making flashcards
    #[arg(long, global = true, value_name = "DIR", env = "TUNECARDS_MP3_DIR")]
    mp3_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all ABC files in the abc directory
    List,

    /// Process an ABC file: optionally transpose it and render to MP3
    Process {
        /// File name, with or without .abc, here or in the abc directory
        file: PathBuf,

        #[command(flatten)]
        flags: ProcessFlags,
    },

    /// Process all ABC files in the abc directory
    ProcessAll {
        #[command(flatten)]
        flags: ProcessFlags,

        /// Export per-file outcomes as JSON
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Create Anki flashcards for all MP3 files
    MakeFlashcards {
        /// CSV file to write
        #[arg(long, value_name = "PATH")]
        output_file: Option<PathBuf>,
    },

    /// Print the semitone offset that moves a file's key to C
    Offset {
        file: PathBuf,
    },

    /// Check that the external tools can be started
    Doctor,

    /// Write a config file with the default settings
    InitConfig {
        /// Destination (default: ./tunecards.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Flags shared by `process` and `process-all`
#[derive(Args, Debug, Clone)]
struct ProcessFlags {
    /// Transpose into the target key (default)
    #[arg(long, overrides_with = "no_transpose")]
    transpose: bool,

    /// Keep the original key
    #[arg(long, overrides_with = "transpose")]
    no_transpose: bool,

    /// Render to MIDI and MP3 (default)
    #[arg(long, overrides_with = "no_render")]
    render: bool,

    /// Stop after transposing
    #[arg(long, overrides_with = "render")]
    no_render: bool,

    /// Target key
    #[arg(short, long, env = "TUNECARDS_KEY")]
    key: Option<String>,

    /// Where transposed, MIDI and MP3 files go
    #[arg(long, value_name = "DIR", env = "TUNECARDS_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
}

impl ProcessFlags {
    fn options(&self, config: &TomlConfig) -> ProcessOptions {
        let mut options = ProcessOptions::from_config(config);
        // On by default; the later of --x / --no-x wins
        options.transpose = self.transpose || !self.no_transpose;
        options.render = self.render || !self.no_render;
        if let Some(key) = &self.key {
            options.target_key = key.clone();
        }
        if let Some(dir) = &self.output_dir {
            options.output_dir = dir.clone();
        }
        options
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = &cli.abc_dir {
        config.abc_dir = dir.clone();
    }
    if let Some(dir) = &cli.mp3_dir {
        config.mp3_dir = dir.clone();
    }

    init_tracing(&config.logging.level, cli.verbose);

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the configured level
fn init_tracing(level: &str, verbose: bool) {
    let level = if verbose { "debug" } else { level };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands, config: &TomlConfig) -> Result<()> {
    match command {
        Commands::List => list(config),
        Commands::Process { file, flags } => process(&file, &flags, config),
        Commands::ProcessAll { flags, report } => process_all(&flags, report.as_deref(), config),
        Commands::MakeFlashcards { output_file } => {
            let output = output_file.unwrap_or_else(|| config.flashcard_file.clone());
            make_flashcards(&output, config)
        }
        Commands::Offset { file } => {
            let offset = file_transposition_offset(&file)?;
            println!("{}", offset);
            Ok(())
        }
        Commands::Doctor => doctor(config),
        Commands::InitConfig { path, force } => {
            init_config(&path.unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE)), force)
        }
    }
}

fn list(config: &TomlConfig) -> Result<()> {
    let files = scan_abc_dir(config)?;
    if files.is_empty() {
        println!("No ABC files found!");
        return Ok(());
    }

    println!("Available ABC files:");
    for file in files {
        if let Some(name) = file.file_name() {
            println!("  {}", name.to_string_lossy());
        }
    }
    Ok(())
}

fn process(file: &Path, flags: &ProcessFlags, config: &TomlConfig) -> Result<()> {
    let pipeline = build_pipeline(flags, config);
    let result = pipeline.process(file)?;
    print_processed(&result, pipeline.options());
    Ok(())
}

fn process_all(flags: &ProcessFlags, report_path: Option<&Path>, config: &TomlConfig) -> Result<()> {
    let pipeline = build_pipeline(flags, config);

    let report = match services::process_all(&pipeline, |outcome| match outcome {
        FileOutcome::Succeeded { result, .. } => print_processed(result, pipeline.options()),
        FileOutcome::Failed { file, error } => {
            eprintln!("Error processing {}: {}", services::display_name(file), error)
        }
    }) {
        Ok(report) => report,
        Err(Error::DirectoryNotFound(dir)) => bail!("ABC directory not found: {}", dir.display()),
        Err(e @ Error::Io(_)) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to create output directory {}",
                    pipeline.options().output_dir.display()
                )
            })
        }
        Err(e) => return Err(e.into()),
    };

    if report.total() == 0 {
        println!("No ABC files found!");
        return Ok(());
    }

    if let Some(path) = report_path {
        report
            .export_json(path)
            .with_context(|| format!("Failed to export report to {}", path.display()))?;
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Report exported to {}",
            path.display()
        );
    }
    Ok(())
}

fn make_flashcards(output: &Path, config: &TomlConfig) -> Result<()> {
    let count = match services::make_flashcards(&config.mp3_dir, &config.flashcard_prompt, output) {
        Err(Error::DirectoryNotFound(dir)) => bail!("MP3 directory not found: {}", dir.display()),
        other => other?,
    };

    if count == 0 {
        println!("No MP3 files found!");
    }
    println!("Created flashcards file: {}", output.display());
    Ok(())
}

fn doctor(config: &TomlConfig) -> Result<()> {
    let statuses = ExternalToolchain::new(config.tools.clone()).check_available();
    let mut missing = 0;
    for status in &statuses {
        let mark = if status.available { "ok" } else { "MISSING" };
        println!("  {:<14} {:<20} {}", status.role, status.program, mark);
        if !status.available {
            missing += 1;
        }
    }

    if missing > 0 {
        bail!("{} external tool(s) not found", missing);
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config::write_toml_config(&TomlConfig::default(), path)?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn scan_abc_dir(config: &TomlConfig) -> Result<Vec<PathBuf>> {
    match FileScanner::notation().scan(&config.abc_dir) {
        Ok(files) => Ok(files),
        Err(Error::DirectoryNotFound(dir)) => bail!("ABC directory not found: {}", dir.display()),
        Err(e) => Err(e.into()),
    }
}

fn build_pipeline(flags: &ProcessFlags, config: &TomlConfig) -> Pipeline<ExternalToolchain> {
    let options = flags.options(config);
    if !options.transpose && flags.key.is_some() {
        warn!("--key has no effect with --no-transpose");
    }
    Pipeline::new(
        ExternalToolchain::new(config.tools.clone()),
        config.abc_dir.clone(),
        options,
    )
}

fn print_processed(result: &ProcessedFile, options: &ProcessOptions) {
    println!("Processed {}", result.source.display());
    if let (Some(key), Some(semitones)) = (&result.key, result.semitones) {
        println!(
            "  Key {} -> {} ({:+} semitones)",
            key, options.target_key, semitones
        );
    }
    if let Some(transposed) = &result.transposed {
        println!("  Transposed to {}: {}", options.target_key, transposed.display());
    }
    if let Some(audio) = &result.audio {
        println!("  Created MP3: {}", audio.display());
    }
}
