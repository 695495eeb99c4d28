//! Services for the ABC to MP3 pipeline
//!
//! - `file_scanner`: notation/audio file discovery
//! - `toolchain`: external transposer, renderer, decoder and encoder
//! - `pipeline`: per-file orchestration
//! - `batch`: whole-directory runs with per-file outcomes
//! - `flashcards`: Anki CSV export

pub mod batch;
pub mod file_scanner;
pub mod flashcards;
pub mod pipeline;
pub mod toolchain;

pub use batch::{display_name, process_all, run_batch, run_batch_with};
pub use file_scanner::FileScanner;
pub use flashcards::{make_flashcards, FlashcardRecord};
pub use pipeline::{resolve_input, Pipeline, ProcessOptions};
pub use toolchain::{ExternalToolchain, ToolStatus, Toolchain};
