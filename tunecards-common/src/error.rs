//! Common error types for tunecards

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for tunecards operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds shared by the key logic, the pipeline and the CLI
#[derive(Error, Debug)]
pub enum Error {
    /// Input could not be resolved as given nor under the notation directory
    #[error("File not found in current directory or {}: {}", .searched.display(), .path.display())]
    FileNotFound { path: PathBuf, searched: PathBuf },

    /// File exists (or was expected to) but could not be opened or read
    #[error("Cannot read {}: {source}", .path.display())]
    NotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `K:` header line before end of file
    #[error("No key signature found in {}", .0.display())]
    KeyNotFound(PathBuf),

    /// Key root is not in the enharmonic table
    #[error("Unrecognized key: {0}")]
    UnrecognizedKey(String),

    /// External program failed to spawn, exited non-zero, or its pipe broke
    #[error("{tool} failed: {reason}")]
    ExternalTool { tool: String, reason: String },

    /// Conventional directory (notation or audio) is missing
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build an `ExternalTool` error from a tool name and any displayable reason
    pub fn tool(tool: impl Into<String>, reason: impl ToString) -> Self {
        Error::ExternalTool {
            tool: tool.into(),
            reason: reason.to_string(),
        }
    }
}
