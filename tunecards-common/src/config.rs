//! Configuration loading and config file resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables (`TUNECARDS_*`, wired through clap)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! This module owns tiers 3 and 4. The resolved [`TomlConfig`] is an
//! ordinary value handed to every call site; nothing here is global.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TUNECARDS_CONFIG";

/// Config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "tunecards.toml";

/// Compiled defaults for every setting
pub struct CompiledDefaults;

impl CompiledDefaults {
    pub const ABC_DIR: &'static str = "abc";
    pub const MP3_DIR: &'static str = "mp3";
    pub const NOTATION_EXTENSION: &'static str = "abc";
    pub const AUDIO_EXTENSION: &'static str = "mp3";
    pub const TARGET_KEY: &'static str = crate::key::REFERENCE_KEY;
    pub const FLASHCARD_FILE: &'static str = "music_flashcards.csv";
    pub const FLASHCARD_PROMPT: &'static str = "Play this song";
    pub const TRANSPOSER: &'static str = "abc2abc";
    pub const MIDI_RENDERER: &'static str = "abc2midi";
    pub const DECODER: &'static str = "timidity";
    pub const ENCODER: &'static str = "lame";
    pub const LOG_LEVEL: &'static str = "info";
}

/// Configuration loaded from TOML; every field may be omitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Directory holding the `.abc` notation files
    pub abc_dir: PathBuf,

    /// Directory scanned for finished `.mp3` files when making flashcards
    pub mp3_dir: PathBuf,

    /// Where transposed, MIDI and MP3 artifacts are written
    pub output_dir: PathBuf,

    /// Key every tune is transposed into
    pub target_key: String,

    /// Flashcard CSV written by `make-flashcards`
    pub flashcard_file: PathBuf,

    /// Text on the back of every flashcard
    pub flashcard_prompt: String,

    /// External program names
    pub tools: ToolsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            abc_dir: PathBuf::from(CompiledDefaults::ABC_DIR),
            mp3_dir: PathBuf::from(CompiledDefaults::MP3_DIR),
            output_dir: PathBuf::from(CompiledDefaults::MP3_DIR),
            target_key: CompiledDefaults::TARGET_KEY.to_string(),
            flashcard_file: PathBuf::from(CompiledDefaults::FLASHCARD_FILE),
            flashcard_prompt: CompiledDefaults::FLASHCARD_PROMPT.to_string(),
            tools: ToolsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Program names (or paths) of the external collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// ABC transposer, invoked as `<transposer> <in.abc> -t <semitones>`
    pub transposer: String,
    /// ABC to MIDI renderer, invoked as `<renderer> <in.abc> -o <out.mid>`
    pub midi_renderer: String,
    /// MIDI to raw WAV decoder, invoked as `<decoder> <in.mid> -Ow -o -`
    pub decoder: String,
    /// WAV to MP3 encoder, invoked as `<encoder> - <out.mp3>`
    pub encoder: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            transposer: CompiledDefaults::TRANSPOSER.to_string(),
            midi_renderer: CompiledDefaults::MIDI_RENDERER.to_string(),
            decoder: CompiledDefaults::DECODER.to_string(),
            encoder: CompiledDefaults::ENCODER.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: CompiledDefaults::LOG_LEVEL.to_string(),
        }
    }
}

/// Where a config file path came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` or `TUNECARDS_CONFIG`; must exist
    Explicit(PathBuf),
    /// Conventional location; may be absent
    Discovered(PathBuf),
    /// Nothing found, compiled defaults apply
    Defaults,
}

/// Locate the config file
///
/// Priority: CLI argument → `TUNECARDS_CONFIG` → `./tunecards.toml` →
/// `<user config dir>/tunecards/config.toml`.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> ConfigSource {
    if let Some(path) = cli_arg {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return ConfigSource::Discovered(local);
    }

    if let Some(user) = user_config_path() {
        if user.is_file() {
            return ConfigSource::Discovered(user);
        }
    }

    ConfigSource::Defaults
}

/// Per-user config path for the platform, e.g. `~/.config/tunecards/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunecards").join("config.toml"))
}

/// Resolve and load configuration, falling back to compiled defaults
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        ConfigSource::Explicit(path) => {
            if !path.is_file() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            load_toml_config(&path)
        }
        ConfigSource::Discovered(path) => load_toml_config(&path),
        ConfigSource::Defaults => {
            debug!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Leading comment block of every written config file
const CONFIG_HEADER: &str = "\
# tunecards configuration
#
# Command-line flags and TUNECARDS_* environment variables override these
# values. Remove a line to fall back to the built-in default.
# [tools] names the programs run for each stage; [logging] level takes
# tracing filter syntax and RUST_LOG overrides it.

";

/// Write config atomically (temp file + rename), behind a commented header
pub fn write_toml_config(config: &TomlConfig, target: &Path) -> Result<()> {
    let body = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;
    let content = format!("{}{}", CONFIG_HEADER, body);

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut temp = target.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    std::fs::write(&temp, content)?;
    if let Err(e) = std::fs::rename(&temp, target) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }

    Ok(())
}
