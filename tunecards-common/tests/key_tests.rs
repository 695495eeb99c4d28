//! Key extraction tests against real files on disk

use std::path::Path;
use tempfile::TempDir;
use tunecards_common::key::{extract_key, file_transposition_offset};
use tunecards_common::Error;

fn write_tune(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_key_after_five_header_lines() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_tune(
        temp_dir.path(),
        "reel.abc",
        "X:1\nT:The Silver Spear\nR:reel\nM:4/4\nL:1/8\nK:D\n|:A|FA (3AAA BAFA|\n",
    );

    assert_eq!(extract_key(&path).unwrap(), "D");
    assert_eq!(file_transposition_offset(&path).unwrap(), -2);
}

#[test]
fn test_first_key_line_wins_and_value_is_trimmed() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_tune(
        temp_dir.path(),
        "two_keys.abc",
        "X:1\nT:Modulating\nK:  Ador  \nABcd|\nK:G\nGABc|\n",
    );

    assert_eq!(extract_key(&path).unwrap(), "Ador");
    assert_eq!(file_transposition_offset(&path).unwrap(), -9);
}

#[test]
fn test_indented_key_line_is_not_a_header() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_tune(temp_dir.path(), "indented.abc", "X:1\n K:G\nT:Nothing\n");

    assert!(matches!(extract_key(&path), Err(Error::KeyNotFound(_))));
}

#[test]
fn test_missing_key_is_key_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_tune(temp_dir.path(), "nokey.abc", "X:1\nT:No key\nABC|\n");

    match extract_key(&path) {
        Err(Error::KeyNotFound(p)) => assert_eq!(p, path),
        other => panic!("expected KeyNotFound, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_not_readable() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.abc");

    assert!(matches!(
        extract_key(&path),
        Err(Error::NotReadable { .. })
    ));
}

#[test]
fn test_unknown_key_in_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_tune(temp_dir.path(), "h.abc", "X:1\nK:H\n");

    assert!(matches!(
        file_transposition_offset(&path),
        Err(Error::UnrecognizedKey(k)) if k == "H"
    ));
}

#[test]
fn test_key_value_ends_at_next_colon() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_tune(temp_dir.path(), "clef.abc", "X:1\nK: Em :clef=bass\nEFGA|\n");

    assert_eq!(extract_key(&path).unwrap(), "Em");
    assert_eq!(file_transposition_offset(&path).unwrap(), -4);
}
