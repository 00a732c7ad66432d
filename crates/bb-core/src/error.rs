//! Error types for orchestration, generation, test execution and verification

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::output_format::OutputFormat;
use crate::solution::HttpVerb;

/// Top-level harness error returned by the orchestrator and runner
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Output format has no black-box backend. Fatal, never retried.
    #[error("Not supported output type {0}")]
    UnsupportedOutputFormat(OutputFormat),

    /// A bounded phase did not finish in time. Fatal for the test case.
    #[error("{phase} for '{folder}' timed out after {limit:?}")]
    Timeout {
        phase: &'static str,
        folder: String,
        limit: Duration,
    },

    /// Generation engine failure (after flaky retries were exhausted)
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Generated test suite failed or could not be launched
    #[error(transparent)]
    Runner(#[from] RunnerError),

    /// Coverage or solution verification failed
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Output directory cleanup failed
    #[error("failed to clean output directory {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a [`crate::engine::GenerationEngine`]
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to launch engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read solution summary {path}: {source}")]
    SummaryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse solution summary {path}: {source}")]
    SummaryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failure reported by an in-process engine
    #[error("engine error: {message}")]
    Other { message: String, flaky: bool },
}

impl EngineError {
    /// Whether the failure is transient and worth another attempt.
    ///
    /// A missing or non-executable engine binary or a bad configuration will
    /// fail the same way on every attempt, so those are not flaky.
    pub fn is_flaky(&self) -> bool {
        match self {
            EngineError::Spawn { source, .. } => !matches!(
                source.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ),
            EngineError::Failed { .. } | EngineError::SummaryRead { .. } => true,
            EngineError::InvalidConfig(_) | EngineError::SummaryParse { .. } => false,
            EngineError::Other { flaky, .. } => *flaky,
        }
    }
}

/// Errors raised while executing a generated test suite
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}: {stderr}")]
    TestsFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("project root {0} does not exist")]
    MissingProjectRoot(PathBuf),
}

/// Acceptance failures: the engine ran but did not do what the case expects
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Targets were already covered before the run (stale state)
    #[error("targets already covered before the run: {}", .labels.join(", "))]
    AlreadyCovered { labels: Vec<String> },

    #[error("targets not covered: {}", .missing.join(", "))]
    TargetsNotCovered { missing: Vec<String> },

    #[error("solution contains no individuals")]
    EmptySolution,

    #[error("no {verb} {path} call returned {status}{}", body_hint(.body_contains))]
    NoMatchingCall {
        verb: HttpVerb,
        status: u16,
        path: String,
        body_contains: Option<String>,
    },

    /// The coverage probe could not be queried
    #[error("coverage probe error: {message}")]
    Probe {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn body_hint(body_contains: &Option<String>) -> String {
    match body_contains {
        Some(fragment) => format!(" with body containing '{fragment}'"),
        None => String::new(),
    }
}
