use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixtures for CLI runs
mod test_utils {
    use super::*;

    /// Two verses of 3s and 4s
    pub fn write_verses(dir: &Path) -> PathBuf {
        let path = dir.join("verses.json");
        std::fs::write(
            &path,
            r#"{"verses": [
                {"chapterId": 1, "verseNumber": 1, "timestampFrom": 0, "timestampTo": 3000},
                {"chapterId": 1, "verseNumber": 2, "timestampFrom": 3000, "timestampTo": 7000}
            ]}"#,
        )
        .unwrap();
        path
    }

    pub fn write_manifest(dir: &Path) -> PathBuf {
        let path = dir.join("durations.json");
        std::fs::write(&path, r#"{"1:1": 200, "1:2": 300}"#).unwrap();
        path
    }

    /// Binary isolated from any config file or environment override
    pub fn cli(dir: &Path) -> Command {
        let mut cmd = Command::cargo_bin("verse-timeline").unwrap();
        cmd.current_dir(dir).env_remove("RUST_LOG");
        for (key, _) in std::env::vars() {
            if key.starts_with("VERSE_TIMELINE_") {
                cmd.env_remove(key);
            }
        }
        cmd
    }
}

use test_utils::*;

#[test]
fn test_compute_full_mode_json() {
    let dir = TempDir::new().unwrap();
    let verses = write_verses(dir.path());
    let manifest = write_manifest(dir.path());

    let output = cli(dir.path())
        .args(["compute", "--mode", "full", "--json", "--verses"])
        .arg(&verses)
        .arg("--durations")
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());

    let response: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["timeline"]["totalDuration"], 800);
    assert_eq!(response["timeline"]["placements"][1]["start"], 305);
    assert_eq!(response["timeline"]["placements"][1]["translationStart"], 440);
    assert_eq!(response["mode"], "full");
    assert_eq!(response["fallbacks"], serde_json::json!([]));
}

#[test]
fn test_compute_table_output() {
    let dir = TempDir::new().unwrap();
    let verses = write_verses(dir.path());

    cli(dir.path())
        .args(["compute", "--verses"])
        .arg(&verses)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 270 frames"));
}

#[test]
fn test_compute_offline_uses_fallbacks() {
    let dir = TempDir::new().unwrap();
    let verses = write_verses(dir.path());

    let output = cli(dir.path())
        .args(["compute", "--mode", "translation-only", "--offline", "--json", "--verses"])
        .arg(&verses)
        .output()
        .unwrap();
    assert!(output.status.success());

    let response: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["timeline"]["totalDuration"], 300 + 300 + 60);
    assert_eq!(response["fallbacks"].as_array().unwrap().len(), 2);
}

#[test]
fn test_compute_buffer_overrides() {
    let dir = TempDir::new().unwrap();
    let verses = write_verses(dir.path());
    let manifest = write_manifest(dir.path());

    let output = cli(dir.path())
        .args(["compute", "--mode", "full", "--json", "--buffer-frames", "0", "--end-buffer-frames", "30"])
        .arg("--verses")
        .arg(&verses)
        .arg("--durations")
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());

    let response: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["timeline"]["totalDuration"], 90 + 200 + 120 + 300 + 30);
}

#[test]
fn test_config_file_is_discovered() {
    let dir = TempDir::new().unwrap();
    let verses = write_verses(dir.path());
    std::fs::write(
        dir.path().join("verse_timeline.toml"),
        "[timeline]\nend_buffer_frames = 0\n",
    )
    .unwrap();

    cli(dir.path())
        .args(["compute", "--verses"])
        .arg(&verses)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 210 frames"));
}

#[test]
fn test_unknown_mode_fails() {
    let dir = TempDir::new().unwrap();
    let verses = write_verses(dir.path());

    cli(dir.path())
        .args(["compute", "--mode", "both", "--verses"])
        .arg(&verses)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown audio track mode"));
}

#[test]
fn test_missing_verse_file_fails() {
    let dir = TempDir::new().unwrap();

    cli(dir.path())
        .args(["compute", "--offline", "--verses", "missing.json"])
        .assert()
        .failure();
}

#[test]
fn test_durations_from_manifest() {
    let dir = TempDir::new().unwrap();
    let verses = write_verses(dir.path());
    let manifest = write_manifest(dir.path());

    let output = cli(dir.path())
        .args(["durations", "--json", "--verses"])
        .arg(&verses)
        .arg("--durations")
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["durations"]["1:1"], 200);
    assert_eq!(report["fetched"], 2);
}

#[test]
fn test_fixup_writes_fixed_copy() {
    let dir = TempDir::new().unwrap();
    let props = dir.path().join("props.json");
    std::fs::write(
        &props,
        r#"{
            "translationAudio": "full",
            "verses": [{"chapterId": 1, "verseNumber": 1}, {"chapterId": 1, "verseNumber": 2}],
            "timestamps": [{"start": 0, "durationInFrames": 90}, {"start": 90, "durationInFrames": 120}],
            "translationDurations": {"1:1": 200, "1:2": 300},
            "translations": [131]
        }"#,
    )
    .unwrap();

    cli(dir.path())
        .args(["fixup", "--props"])
        .arg(&props)
        .assert()
        .success()
        .stdout(predicate::str::contains("durationInFrames=800"));

    let fixed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("fixed-props.json")).unwrap())
            .unwrap();
    assert_eq!(fixed["durationInFrames"], 800);
    assert_eq!(fixed["fps"], 30);
    assert_eq!(fixed["translations"], serde_json::json!(["131"]));
}

#[test]
fn test_fixup_ignores_missing_manifest_setting() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("verse_timeline.toml"),
        "[lookup]\nmanifest = \"missing-durations.json\"\n",
    )
    .unwrap();
    let props = dir.path().join("props.json");
    std::fs::write(&props, r#"{"durationInFrames": 451, "fps": 0.4}"#).unwrap();

    cli(dir.path())
        .args(["fixup", "--props"])
        .arg(&props)
        .assert()
        .success()
        .stdout(predicate::str::contains("durationInFrames=451 fps=30"));
}
