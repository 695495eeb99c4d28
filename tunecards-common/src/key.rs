//! Key signatures and transposition offsets
//!
//! An ABC tune declares its key on the first header line starting with `K:`.
//! Only the root (letter plus optional `#`/`b`) takes part in the math; mode
//! suffixes such as `m`, `dor` or `mix` are carried along but ignored.
//!
//! Offsets are always returned as a downward shift in `[-11, 0]`, which is
//! what `abc2abc -t` expects for moving a tune into the reference key.

use crate::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Key every tune is moved into when no other target is given
pub const REFERENCE_KEY: &str = "C";

/// ABC header field that declares the key signature
const KEY_FIELD: &str = "K:";

/// Semitones per octave
const OCTAVE: i32 = 12;

/// Semitones above C for each spelled root
///
/// Enharmonic spellings share a value, so `C#` and `Db` transpose identically.
const ROOT_TABLE: [(&str, i32); 17] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
];

/// Look up a root spelling in the enharmonic table
pub fn root_semitones(root: &str) -> Option<i32> {
    ROOT_TABLE
        .iter()
        .find(|(name, _)| *name == root)
        .map(|(_, semitones)| *semitones)
}

/// A parsed key token such as `G`, `F#m` or `Bbmix`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySignature {
    root: String,
    mode: String,
    semitones: i32,
}

impl KeySignature {
    /// Parse a key token
    ///
    /// The root is the first character, extended to two characters when the
    /// second one is `#` or `b`. Anything after the root is the mode.
    pub fn parse(token: &str) -> Result<Self> {
        let mut chars = token.char_indices();
        let root_end = match (chars.next(), chars.next()) {
            (None, _) => return Err(Error::UnrecognizedKey(token.to_string())),
            (Some((_, first)), None) => first.len_utf8(),
            (Some(_), Some((idx, second))) if second == '#' || second == 'b' => {
                idx + second.len_utf8()
            }
            (Some(_), Some((idx, _))) => idx,
        };

        let (root, mode) = token.split_at(root_end);
        let semitones =
            root_semitones(root).ok_or_else(|| Error::UnrecognizedKey(token.to_string()))?;

        Ok(Self {
            root: root.to_string(),
            mode: mode.to_string(),
            semitones,
        })
    }

    /// Root spelling, e.g. `F#`
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Mode suffix exactly as written, possibly empty
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Semitones above C
    pub fn semitones_above_c(&self) -> i32 {
        self.semitones
    }

    /// Downward shift (in `[-11, 0]`) that moves this key onto `target`
    pub fn offset_to(&self, target: &KeySignature) -> i32 {
        let up = (target.semitones - self.semitones).rem_euclid(OCTAVE);
        if up == 0 {
            0
        } else {
            up - OCTAVE
        }
    }
}

impl FromStr for KeySignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for KeySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.mode)
    }
}

/// Semitones needed to move `key` down to C
pub fn transposition_offset(key: &str) -> Result<i32> {
    Ok(-KeySignature::parse(key)?.semitones_above_c())
}

/// Semitones needed to move `from` down onto `to`, in `[-11, 0]`
///
/// With `to == "C"` this is the same as [`transposition_offset`].
pub fn transposition_between(from: &str, to: &str) -> Result<i32> {
    let from = KeySignature::parse(from)?;
    let to = KeySignature::parse(to)?;
    Ok(from.offset_to(&to))
}

/// Return the key of the first `K:` header line in an ABC file
///
/// The value runs from `K:` up to the next colon, if any, and is trimmed.
/// Stops reading as soon as the line is found.
pub fn extract_key(path: &Path) -> Result<String> {
    let not_readable = |source| Error::NotReadable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(not_readable)?;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(not_readable)?;
        if let Some(rest) = line.strip_prefix(KEY_FIELD) {
            let value = rest.split(':').next().unwrap_or_default().trim();
            tracing::debug!(file = %path.display(), key = value, "Found key field");
            return Ok(value.to_string());
        }
    }

    Err(Error::KeyNotFound(path.to_path_buf()))
}

/// Extract the key of an ABC file and compute its offset to C
pub fn file_transposition_offset(path: &Path) -> Result<i32> {
    let key = extract_key(path)?;
    transposition_offset(&key)
}
