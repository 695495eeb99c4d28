//! Batch runner tests over a real notation directory

mod helpers;

use helpers::{file_names, write_tune, FailAt, FakeToolchain};
use tempfile::TempDir;
use tunecards::services::process_all;
use tunecards::{FileOutcome, Pipeline, ProcessOptions};
use tunecards_common::Error;

fn options(output_dir: std::path::PathBuf) -> ProcessOptions {
    ProcessOptions {
        transpose: true,
        render: true,
        target_key: "C".to_string(),
        output_dir,
    }
}

#[test]
fn test_bad_file_is_skipped_and_rest_processed() {
    let temp_dir = TempDir::new().unwrap();
    let abc_dir = temp_dir.path().join("abc");
    let output_dir = temp_dir.path().join("mp3");
    std::fs::create_dir(&abc_dir).unwrap();

    write_tune(&abc_dir, "a_reel.abc", Some("D"));
    write_tune(&abc_dir, "b_broken.abc", None);
    write_tune(&abc_dir, "c_jig.abc", Some("Bbm"));
    std::fs::write(abc_dir.join("readme.txt"), "not a tune").unwrap();

    let pipeline = Pipeline::new(FakeToolchain::new(), &abc_dir, options(output_dir.clone()));
    let report = process_all(&pipeline, |_| {}).unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 1);

    let failed: Vec<_> = report.failures().collect();
    match failed[0] {
        FileOutcome::Failed { file, error } => {
            assert!(file.ends_with("b_broken.abc"));
            assert!(error.contains("No key signature found"));
        }
        other => panic!("expected failure, got {:?}", other),
    }

    match &report.outcomes[2] {
        FileOutcome::Succeeded { result, .. } => assert_eq!(result.semitones, Some(-10)),
        other => panic!("expected success, got {:?}", other),
    }

    assert_eq!(file_names(&output_dir), vec!["a_reel.mp3", "c_jig.mp3"]);
}

#[test]
fn test_every_file_fails_but_batch_completes() {
    let temp_dir = TempDir::new().unwrap();
    let abc_dir = temp_dir.path().join("abc");
    std::fs::create_dir(&abc_dir).unwrap();
    write_tune(&abc_dir, "one.abc", Some("G"));
    write_tune(&abc_dir, "two.abc", Some("F"));

    let pipeline = Pipeline::new(
        FakeToolchain::failing_at(FailAt::Render),
        &abc_dir,
        options(temp_dir.path().join("out")),
    );
    let report = process_all(&pipeline, |_| {}).unwrap();

    assert_eq!(report.failed(), 2);
    assert_eq!(pipeline.toolchain().calls().len(), 4);
}

#[test]
fn test_missing_abc_dir_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(
        FakeToolchain::new(),
        temp_dir.path().join("abc"),
        options(temp_dir.path().join("mp3")),
    );

    assert!(matches!(
        process_all(&pipeline, |_| {}),
        Err(Error::DirectoryNotFound(_))
    ));
}

#[test]
fn test_report_exports_json() {
    let temp_dir = TempDir::new().unwrap();
    let abc_dir = temp_dir.path().join("abc");
    std::fs::create_dir(&abc_dir).unwrap();
    write_tune(&abc_dir, "tune.abc", Some("Eb"));

    let pipeline = Pipeline::new(
        FakeToolchain::new(),
        &abc_dir,
        options(temp_dir.path().join("mp3")),
    );
    let report = process_all(&pipeline, |_| {}).unwrap();

    let json_path = temp_dir.path().join("report.json");
    report.export_json(&json_path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    let outcome = &value["outcomes"][0];
    assert_eq!(outcome["status"], "succeeded");
    assert_eq!(outcome["result"]["semitones"], -3);
    assert_eq!(outcome["result"]["stages"][4], "cleaned_up");
}
