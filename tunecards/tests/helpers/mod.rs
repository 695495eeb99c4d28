//! Test Helper Utilities
//!
//! Shared fixtures for tunecards integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tunecards::Toolchain;
use tunecards_common::{Error, Result};

/// Which fake stage should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Transpose,
    Render,
    Encode,
}

/// Toolchain that writes placeholder files instead of spawning programs
///
/// Every call is recorded as a short string so tests can assert order and
/// arguments.
#[derive(Default)]
pub struct FakeToolchain {
    calls: RefCell<Vec<String>>,
    fail_at: Option<FailAt>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(stage: FailAt) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_at: Some(stage),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn check(&self, stage: FailAt, tool: &str) -> Result<()> {
        if self.fail_at == Some(stage) {
            Err(Error::tool(tool, "exited with exit status: 1"))
        } else {
            Ok(())
        }
    }
}

fn name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

impl Toolchain for FakeToolchain {
    fn transpose(&self, input: &Path, semitones: i32, output: &Path) -> Result<()> {
        self.calls.borrow_mut().push(format!(
            "transpose {} {} -> {}",
            name(input),
            semitones,
            name(output)
        ));
        self.check(FailAt::Transpose, "abc2abc")?;

        let body = std::fs::read_to_string(input)?;
        std::fs::write(output, format!("% transposed {}\n{}", semitones, body))?;
        Ok(())
    }

    fn render_midi(&self, abc: &Path, midi: &Path) -> Result<()> {
        let first_line = std::fs::read_to_string(abc)?
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        self.calls.borrow_mut().push(format!(
            "render {} ({}) -> {}",
            name(abc),
            first_line,
            name(midi)
        ));
        self.check(FailAt::Render, "abc2midi")?;

        std::fs::write(midi, b"MThd")?;
        Ok(())
    }

    fn encode_audio(&self, midi: &Path, mp3: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("encode {} -> {}", name(midi), name(mp3)));
        assert!(midi.exists(), "encoder ran before MIDI existed");
        self.check(FailAt::Encode, "lame")?;

        std::fs::write(mp3, b"ID3")?;
        Ok(())
    }
}

/// Write an ABC tune into `dir`
pub fn write_tune(dir: &Path, name: &str, key: Option<&str>) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::from("X:1\nT:Test Tune\nM:6/8\nL:1/8\n");
    if let Some(key) = key {
        body.push_str(&format!("K:{}\n", key));
    }
    body.push_str("|:GAB c2d|edc BAG:|\n");
    std::fs::write(&path, body).unwrap();
    path
}

/// Sorted file names in a directory
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
