//! Generated-suite runner against a stand-in `npm`
#![cfg(unix)]

use bb_e2e_core::config::{OutputConfig, RunnerConfig};
use bb_e2e_core::{GeneratedTestRunner, HarnessError, OutputFormat};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn write_npm(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-npm");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn runner(temp: &TempDir, npm: &Path, timeout_minutes: u64) -> GeneratedTestRunner {
    let javascript_root = temp.path().join("javascript");
    fs::create_dir_all(&javascript_root).unwrap();
    GeneratedTestRunner::new(
        OutputConfig {
            javascript_root,
            ..Default::default()
        },
        RunnerConfig {
            npm_bin: npm.display().to_string(),
            install_dependencies: false,
            timeout_minutes,
        },
    )
}

#[tokio::test]
async fn test_passing_suite() {
    let temp = TempDir::new().unwrap();
    let npm = write_npm(temp.path(), "exit 0");

    runner(&temp, &npm, 1)
        .run(OutputFormat::JsJest, "XmlEM")
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_slow_suite_times_out_and_is_killed() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("jest-finished");
    // npm hands the suite to a separate worker, as `npm test` does with jest
    let npm = write_npm(
        temp.path(),
        &format!("sh -c \"sleep 2; touch '{}'\"", marker.display()),
    );

    let err = runner(&temp, &npm, 2)
        .run(OutputFormat::JsJest, "XmlEM")
        .await
        .unwrap_err();

    match err {
        HarnessError::Timeout {
            phase,
            folder,
            limit,
        } => {
            assert_eq!(phase, "generated test run");
            assert_eq!(folder, "XmlEM");
            assert_eq!(limit, Duration::from_secs(120));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Real time: give a surviving worker the chance to finish
    std::thread::sleep(Duration::from_secs(3));
    assert!(!marker.exists(), "test worker survived the timeout");
}
