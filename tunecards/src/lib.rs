//! tunecards library interface
//!
//! Batch pipeline that turns ABC notation into MP3 (optionally transposed
//! into a target key) and exports Anki flashcards for the results.
//! Exposes the services for the binaries and for integration testing.

pub mod models;
pub mod services;

pub use models::{BatchReport, FileOutcome, ProcessedFile, Stage};
pub use services::pipeline::{Pipeline, ProcessOptions};
pub use services::toolchain::{ExternalToolchain, Toolchain};
