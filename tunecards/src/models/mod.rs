//! Data models for pipeline runs

pub mod batch_report;
pub mod processed_file;

pub use batch_report::{BatchReport, FileOutcome};
pub use processed_file::{ProcessedFile, Stage};
