//! Tests for the external-process engine using shell-script stand-ins
#![cfg(unix)]

use bb_e2e_core::config::HarnessConfig;
use bb_e2e_core::run_config::keys;
use bb_e2e_core::{
    CommandEngine, EngineError, GenerationEngine, HarnessError, HttpVerb, OutputFormat,
    RunConfiguration, RunRequest, SeedCounter, TestOrchestrator,
};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Write an executable script that finds `--outputFolder` in its arguments
/// and then runs `body` with `$out` set to it.
fn write_engine(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-engine");
    let script = format!(
        r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--outputFolder" ]; then out="$2"; fi
  shift
done
echo "$(date +%s)" >> "{calls}"
{body}
"#,
        calls = dir.join("calls.log").display()
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn call_count(dir: &Path) -> usize {
    fs::read_to_string(dir.join("calls.log"))
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

fn orchestrator(temp: &TempDir, engine: CommandEngine) -> TestOrchestrator {
    let mut config = HarnessConfig::default();
    config.output.javascript_root = temp.path().join("javascript");
    TestOrchestrator::new(config, engine).with_seed_counter(Arc::new(SeedCounter::default()))
}

#[tokio::test]
async fn test_engine_summary_is_loaded() {
    let temp = TempDir::new().unwrap();
    let program = write_engine(
        temp.path(),
        r#"mkdir -p "$out"
cat > "$out/solution.json" <<'JSON'
{"individuals": [{"calls": [{"verb": "POST", "path": "/api/xml/receive-string-respond-xml", "status": 200}]}]}
JSON"#,
    );
    let engine = CommandEngine::new(program.display().to_string());

    let solution = orchestrator(&temp, engine)
        .run_black_box(&RunRequest::new(OutputFormat::JsJest, "XmlEM", 10, 1), |c| c)
        .await
        .unwrap();

    assert!(solution.has_at_least_one(
        HttpVerb::Post,
        200,
        "/api/xml/receive-string-respond-xml",
        None
    ));
}

#[tokio::test]
async fn test_missing_summary_means_empty_solution() {
    let temp = TempDir::new().unwrap();
    let program = write_engine(temp.path(), "exit 0");
    let engine = CommandEngine::new(program.display().to_string());
    let config = RunConfiguration::new().with(
        keys::OUTPUT_FOLDER,
        temp.path().join("out").display().to_string(),
    );

    let solution = engine.generate(config).await.unwrap();
    assert!(solution.individuals.is_empty());
}

#[tokio::test]
async fn test_corrupt_summary_is_fatal() {
    let temp = TempDir::new().unwrap();
    let program = write_engine(
        temp.path(),
        r#"mkdir -p "$out"; echo 'not json' > "$out/solution.json""#,
    );
    let engine = CommandEngine::new(program.display().to_string());

    let err = orchestrator(&temp, engine)
        .run_black_box(&RunRequest::new(OutputFormat::JsJest, "XmlEM", 10, 1), |c| c)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HarnessError::Engine(EngineError::SummaryParse { .. })
    ));
    assert_eq!(call_count(temp.path()), 1);
}

#[tokio::test]
async fn test_non_zero_exit_is_retried_as_flaky() {
    let temp = TempDir::new().unwrap();
    let program = write_engine(temp.path(), "echo 'SUT not reachable' >&2; exit 3");
    let engine = CommandEngine::new(program.display().to_string());

    let err = orchestrator(&temp, engine)
        .run_black_box(&RunRequest::new(OutputFormat::JsJest, "XmlEM", 10, 1), |c| c)
        .await
        .unwrap_err();

    match err {
        HarnessError::Engine(EngineError::Failed { stderr, .. }) => {
            assert_eq!(stderr, "SUT not reachable");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(call_count(temp.path()), 3);
}

#[tokio::test]
async fn test_non_executable_engine_is_not_retried() {
    let temp = TempDir::new().unwrap();
    let program = write_engine(temp.path(), "exit 0");
    fs::set_permissions(&program, fs::Permissions::from_mode(0o644)).unwrap();
    let engine = CommandEngine::new(program.display().to_string());

    let orch = orchestrator(&temp, engine);
    let err = orch
        .run_black_box(&RunRequest::new(OutputFormat::JsJest, "XmlEM", 10, 1), |c| c)
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::Engine(EngineError::Spawn { .. })));
    assert_eq!(orch.seeds().current(), 43);
}

#[tokio::test]
async fn test_leading_args_come_first() {
    let temp = TempDir::new().unwrap();
    let args_log = temp.path().join("args.log");
    let script = temp.path().join("print-args");
    fs::write(
        &script,
        format!("#!/bin/sh\necho \"$1 $2 $3\" > '{}'\n", args_log.display()),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let engine = CommandEngine::new(script.display().to_string()).with_args(["-jar", "em.jar"]);
    let config = RunConfiguration::new()
        .with(keys::OUTPUT_FOLDER, temp.path().join("out").display().to_string());
    engine.generate(config).await.unwrap();

    assert_eq!(
        fs::read_to_string(&args_log).unwrap().trim(),
        "-jar em.jar --outputFolder"
    );
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_engine_process_is_killed() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("finished");
    let program = write_engine(
        temp.path(),
        &format!("sleep 2\ntouch '{}'", marker.display()),
    );
    let engine = CommandEngine::new(program.display().to_string());

    let err = orchestrator(&temp, engine)
        .run_black_box(&RunRequest::new(OutputFormat::JsJest, "XmlEM", 10, 1), |c| c)
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Timeout { .. }));

    // Real time: give a surviving process the chance to finish
    std::thread::sleep(Duration::from_secs(3));
    assert!(!marker.exists(), "engine process survived the timeout");
}

#[tokio::test(start_paused = true)]
async fn test_timeout_kills_processes_started_by_the_engine() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("worker-finished");
    // The launcher delegates to a separate shell, like a wrapper starting `java`
    let program = write_engine(
        temp.path(),
        &format!("sh -c \"sleep 2; touch '{}'\"\necho done", marker.display()),
    );
    let engine = CommandEngine::new(program.display().to_string());

    let err = orchestrator(&temp, engine)
        .run_black_box(&RunRequest::new(OutputFormat::JsJest, "XmlEM", 10, 1), |c| c)
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Timeout { .. }));

    std::thread::sleep(Duration::from_secs(3));
    assert!(!marker.exists(), "worker started by the engine survived the timeout");
}
