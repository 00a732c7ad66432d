//! Core library for bb-e2e
//!
//! Drives a black-box test generation engine against a running service,
//! verifies that the expected coverage targets were hit, and re-executes the
//! emitted test suite as an independent verification pass.
//!
//! The moving parts:
//! - [`orchestrator::TestOrchestrator`] builds the [`RunConfiguration`],
//!   launches the engine under a wall-clock timeout and owns the seed counter
//! - [`coverage::CoverageContext`] and [`coverage::CoverageProbe`] track which
//!   coverage targets the service under test has recorded
//! - [`runner::GeneratedTestRunner`] runs the generated suite with the
//!   toolchain of its output format

pub mod config;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod home;
pub mod logging;
pub mod orchestrator;
pub mod output_format;
mod process;
pub mod run_config;
pub mod runner;
pub mod seed;
pub mod solution;

pub use coverage::{CoverageContext, CoverageProbe, HttpCoverageProbe, SharedCoverage};
pub use engine::{CommandEngine, GenerationEngine};
pub use error::{EngineError, HarnessError, RunnerError, VerificationError};
pub use orchestrator::{EvaluationReport, RunRequest, TestOrchestrator};
pub use output_format::{OutputFormat, TestSuiteSplitType};
pub use run_config::RunConfiguration;
pub use runner::GeneratedTestRunner;
pub use seed::SeedCounter;
pub use solution::{HttpCall, HttpVerb, Individual, Solution};
