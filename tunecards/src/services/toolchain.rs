//! External tool invocation
//!
//! The pipeline only ever talks to the [`Toolchain`] trait. The real
//! implementation shells out to abc2abc, abc2midi, timidity and lame (or
//! whatever the config names) without going through a shell: the
//! decode/encode stage is two child processes joined by an OS pipe.

use std::fs::File;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use tracing::{debug, info};
use tunecards_common::config::ToolsConfig;
use tunecards_common::{Error, Result};

/// Operations the pipeline delegates to external programs
pub trait Toolchain {
    /// Write `input` shifted by `semitones` to `output`
    fn transpose(&self, input: &Path, semitones: i32, output: &Path) -> Result<()>;

    /// Render ABC notation to a MIDI file
    fn render_midi(&self, abc: &Path, midi: &Path) -> Result<()>;

    /// Decode MIDI to raw audio and compress it to MP3
    fn encode_audio(&self, midi: &Path, mp3: &Path) -> Result<()>;
}

/// Availability of one configured program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    /// Role in the pipeline, e.g. "transposer"
    pub role: &'static str,
    /// Program name or path as configured
    pub program: String,
    pub available: bool,
}

/// [`Toolchain`] backed by real processes
#[derive(Debug, Clone)]
pub struct ExternalToolchain {
    tools: ToolsConfig,
}

impl ExternalToolchain {
    pub fn new(tools: ToolsConfig) -> Self {
        Self { tools }
    }

    /// `<transposer> <input> -t <semitones>`; stdout is the transposed tune
    pub fn transpose_command(&self, input: &Path, semitones: i32) -> Command {
        let mut command = Command::new(&self.tools.transposer);
        command.arg(input).arg("-t").arg(semitones.to_string());
        command
    }

    /// `<renderer> <abc> -o <midi>`
    pub fn render_command(&self, abc: &Path, midi: &Path) -> Command {
        let mut command = Command::new(&self.tools.midi_renderer);
        command.arg(abc).arg("-o").arg(midi);
        command
    }

    /// `<decoder> <midi> -Ow -o -`; raw WAV on stdout
    pub fn decode_command(&self, midi: &Path) -> Command {
        let mut command = Command::new(&self.tools.decoder);
        command.arg(midi).args(["-Ow", "-o", "-"]);
        command
    }

    /// `<encoder> - <mp3>`; raw WAV on stdin
    pub fn encode_command(&self, mp3: &Path) -> Command {
        let mut command = Command::new(&self.tools.encoder);
        command.arg("-").arg(mp3);
        command
    }

    /// Probe every configured program by spawning it once
    ///
    /// A program counts as available when it can be started at all; its
    /// exit status is ignored since not every tool understands `--version`.
    pub fn check_available(&self) -> Vec<ToolStatus> {
        [
            ("transposer", &self.tools.transposer),
            ("midi renderer", &self.tools.midi_renderer),
            ("decoder", &self.tools.decoder),
            ("encoder", &self.tools.encoder),
        ]
        .into_iter()
        .map(|(role, program)| {
            let available = Command::new(program)
                .arg("--version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .is_ok();

            debug!(role, program = %program, available, "Tool availability check");

            ToolStatus {
                role,
                program: program.clone(),
                available,
            }
        })
        .collect()
    }
}

impl Toolchain for ExternalToolchain {
    fn transpose(&self, input: &Path, semitones: i32, output: &Path) -> Result<()> {
        let tool = &self.tools.transposer;
        let out_file = File::create(output)?;

        let mut command = self.transpose_command(input, semitones);
        command.stdout(Stdio::from(out_file));

        if let Err(e) = run(tool, &mut command) {
            let _ = std::fs::remove_file(output);
            return Err(e);
        }

        debug!(input = %input.display(), output = %output.display(), semitones, "Transposer finished");
        Ok(())
    }

    fn render_midi(&self, abc: &Path, midi: &Path) -> Result<()> {
        run(&self.tools.midi_renderer, &mut self.render_command(abc, midi))?;
        info!(output = %midi.display(), "Created MIDI");
        Ok(())
    }

    fn encode_audio(&self, midi: &Path, mp3: &Path) -> Result<()> {
        let decoder_name = &self.tools.decoder;
        let encoder_name = &self.tools.encoder;

        debug!(decoder = %decoder_name, encoder = %encoder_name, "Spawning decode | encode");

        let mut decoder = self
            .decode_command(midi)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(decoder_name, e))?;

        let raw = match decoder.stdout.take() {
            Some(raw) => raw,
            None => {
                let _ = decoder.kill();
                let _ = decoder.wait();
                return Err(Error::tool(decoder_name, "stdout was not captured"));
            }
        };

        // The encoder owns the read end from here; if it never starts the
        // pipe closes and the decoder stops on a broken pipe.
        let encoder_status = self
            .encode_command(mp3)
            .stdin(Stdio::from(raw))
            .status()
            .map_err(|e| spawn_error(encoder_name, e));

        let decoder_status = decoder
            .wait()
            .map_err(|e| Error::tool(decoder_name, e))?;
        let encoder_status = encoder_status?;

        // An encoder that quits early takes the decoder down with a broken
        // pipe; the encoder is the one at fault then.
        if !encoder_status.success() && killed_by_broken_pipe(decoder_status) {
            return check_status(encoder_name, encoder_status);
        }
        check_status(decoder_name, decoder_status)?;
        check_status(encoder_name, encoder_status)?;

        info!(output = %mp3.display(), "Created MP3");
        Ok(())
    }
}

/// Run a prepared command to completion, inheriting stderr
fn run(tool: &str, command: &mut Command) -> Result<()> {
    debug!(tool, command = ?command, "Running external tool");
    let status = command.status().map_err(|e| spawn_error(tool, e))?;
    check_status(tool, status)
}

fn spawn_error(tool: &str, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::tool(tool, "binary not found in PATH")
    } else {
        Error::tool(tool, format!("could not start: {}", e))
    }
}

/// SIGPIPE, either delivered directly or reported by a shell wrapper as 128 + 13
#[cfg(unix)]
fn killed_by_broken_pipe(status: ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    const SIGPIPE: i32 = 13;
    status.signal() == Some(SIGPIPE) || status.code() == Some(128 + SIGPIPE)
}

#[cfg(not(unix))]
fn killed_by_broken_pipe(_status: ExitStatus) -> bool {
    false
}

fn check_status(tool: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(Error::tool(tool, format!("exited with {}", status)))
    }
}
