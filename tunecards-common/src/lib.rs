//! # tunecards Common Library
//!
//! Shared code for the tunecards tools including:
//! - Error types
//! - Configuration loading (TOML bootstrap + compiled defaults)
//! - Key signature parsing, `K:` header extraction and transposition offsets

pub mod config;
pub mod error;
pub mod key;

pub use error::{Error, Result};
pub use key::{KeySignature, REFERENCE_KEY};
