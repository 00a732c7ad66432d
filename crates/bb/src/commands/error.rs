//! Error types for command execution

use thiserror::Error;

/// Command execution errors
#[derive(Debug, Error)]
pub enum CommandError {
    /// `--set` value without `key=value` shape
    #[error("Invalid engine option '{0}' (expected KEY=VALUE)")]
    InvalidOption(String),

    /// `--expect` value that cannot be parsed
    #[error("Invalid expectation: {0}")]
    InvalidExpectation(String),

    /// Targets given but nowhere to read coverage from
    #[error("--target requires a coverage endpoint (--coverage-url or [sut] coverage_url)")]
    MissingCoverageUrl,
}
