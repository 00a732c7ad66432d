//! Black-box generation orchestration
//!
//! A test case goes through these phases, strictly in order:
//!
//! 1. reset coverage and make sure the expected targets are not already
//!    covered (catches a probe that failed to reset)
//! 2. delete the output folder, build the run configuration and run the
//!    engine, all under one wall-clock timeout
//! 3. check the targets are covered
//! 4. reset coverage, re-execute the generated suite, check again
//!
//! Transient engine failures are retried inside the timeout. A timeout is
//! never retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::coverage::{CoverageContext, CoverageProbe};
use crate::engine::GenerationEngine;
use crate::error::{HarnessError, VerificationError};
use crate::output_format::{OutputFormat, TestSuiteSplitType};
use crate::run_config::{RunConfiguration, keys};
use crate::runner::GeneratedTestRunner;
use crate::seed::SeedCounter;
use crate::solution::Solution;

/// Parameters of one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub format: OutputFormat,
    /// Folder name under the format's base location
    pub folder: String,
    /// Budget of action evaluations
    pub iterations: u32,
    pub timeout_minutes: u64,
}

impl RunRequest {
    pub fn new(
        format: OutputFormat,
        folder: impl Into<String>,
        iterations: u32,
        timeout_minutes: u64,
    ) -> Self {
        Self {
            format,
            folder: folder.into(),
            iterations,
            timeout_minutes,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_minutes.saturating_mul(60))
    }
}

/// Outcome of [`TestOrchestrator::execute_and_evaluate`]
#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub solution: Solution,
    /// Coverage recorded while the engine ran
    pub generation_coverage: CoverageContext,
    /// Coverage recorded while the generated suite ran
    pub suite_coverage: CoverageContext,
}

#[derive(Debug)]
pub struct TestOrchestrator {
    config: HarnessConfig,
    engine: Box<dyn GenerationEngine>,
    runner: GeneratedTestRunner,
    seeds: Arc<SeedCounter>,
}

impl TestOrchestrator {
    /// Orchestrator sharing the process-wide seed counter.
    pub fn new(config: HarnessConfig, engine: impl GenerationEngine + 'static) -> Self {
        let runner = GeneratedTestRunner::from_config(&config);
        Self {
            config,
            engine: Box::new(engine),
            runner,
            seeds: SeedCounter::global(),
        }
    }

    /// Use `seeds` instead of the process-wide counter.
    pub fn with_seed_counter(mut self, seeds: Arc<SeedCounter>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn with_runner(mut self, runner: GeneratedTestRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn seeds(&self) -> &SeedCounter {
        &self.seeds
    }

    /// `<baseLocationForFormat>/<folder>`
    ///
    /// # Errors
    ///
    /// [`HarnessError::UnsupportedOutputFormat`] for formats black-box runs
    /// cannot emit.
    pub fn output_dir(&self, format: OutputFormat, folder: &str) -> Result<PathBuf, HarnessError> {
        self.config
            .output
            .base_location(format)
            .map(|base| base.join(folder))
            .ok_or(HarnessError::UnsupportedOutputFormat(format))
    }

    /// Configuration handed to the engine before test-specific overrides.
    pub fn base_configuration(
        &self,
        request: &RunRequest,
        output_dir: &Path,
        seed: u64,
    ) -> RunConfiguration {
        let sut = &self.config.sut;
        RunConfiguration::new()
            .with(keys::CREATE_TESTS, "true")
            .with(keys::SEED, seed.to_string())
            .with(keys::USE_TIME_IN_FEEDBACK_SAMPLING, "false")
            .with(keys::MAX_EVALUATIONS, request.iterations.to_string())
            .with(keys::STOPPING_CRITERION, "ACTION_EVALUATIONS")
            .with(
                keys::TEST_SUITE_SPLIT_TYPE,
                TestSuiteSplitType::Faults.to_string(),
            )
            .with(keys::EXPECTATIONS_ACTIVE, "false")
            .with(keys::OUTPUT_FOLDER, output_dir.display().to_string())
            .with(keys::TEST_SUITE_FILE_NAME, "")
            .with(keys::BLACK_BOX, "true")
            .with(keys::BB_TARGET_URL, sut.base_url())
            .with(keys::BB_SWAGGER_URL, sut.schema_url())
            .with(keys::PROBLEM_TYPE, sut.problem_type.clone())
            .with(keys::OUTPUT_FORMAT, request.format.to_string())
            .with(keys::BB_EXPERIMENTS, "false")
    }

    /// Run the engine once for `request` and return its solution.
    ///
    /// `customize` receives the base configuration and returns the one the
    /// engine gets. It is called once per attempt.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::UnsupportedOutputFormat`] before anything is touched
    /// - [`HarnessError::Timeout`] when cleanup plus all attempts exceed
    ///   `request.timeout_minutes`; the in-flight engine is dropped
    /// - [`HarnessError::Engine`] on a fatal failure or once the flaky
    ///   attempts are used up
    pub async fn run_black_box<F>(
        &self,
        request: &RunRequest,
        customize: F,
    ) -> Result<Solution, HarnessError>
    where
        F: Fn(RunConfiguration) -> RunConfiguration,
    {
        let output_dir = self.output_dir(request.format, &request.folder)?;
        let limit = request.timeout();

        let run = async {
            clean_output_dir(&output_dir).await?;
            self.generate_with_retries(request, &output_dir, &customize)
                .await
        };

        match tokio::time::timeout(limit, run).await {
            Ok(result) => result,
            Err(_) => {
                warn!(folder = %request.folder, ?limit, "generation timed out");
                Err(HarnessError::Timeout {
                    phase: "generation",
                    folder: request.folder.clone(),
                    limit,
                })
            }
        }
    }

    async fn generate_with_retries<F>(
        &self,
        request: &RunRequest,
        output_dir: &Path,
        customize: &F,
    ) -> Result<Solution, HarnessError>
    where
        F: Fn(RunConfiguration) -> RunConfiguration,
    {
        let attempts = self.config.flaky.attempts.max(1);
        let mut attempt = 1;
        loop {
            let seed = self.seeds.advance();
            let config = customize(self.base_configuration(request, output_dir, seed));
            info!(folder = %request.folder, attempt, seed, "starting generation run");

            match self.engine.generate(config).await {
                Ok(solution) => return Ok(solution),
                Err(e) if e.is_flaky() && attempt < attempts => {
                    warn!(
                        folder = %request.folder,
                        attempt,
                        "flaky generation failure, retrying: {e}"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Re-execute the suite generated for `format` into `folder`.
    pub async fn run_generated_tests(
        &self,
        format: OutputFormat,
        folder: &str,
    ) -> Result<(), HarnessError> {
        self.runner.run(format, folder).await
    }

    /// Generation plus independent verification of the emitted suite,
    /// checking `labels` are covered after each phase.
    pub async fn execute_and_evaluate<F, S>(
        &self,
        request: &RunRequest,
        labels: &[S],
        probe: &dyn CoverageProbe,
        customize: F,
    ) -> Result<EvaluationReport, HarnessError>
    where
        F: Fn(RunConfiguration) -> RunConfiguration,
        S: AsRef<str>,
    {
        probe.reset().await?;
        let before = probe.snapshot().await?;
        if !labels.is_empty() && before.are_covered(labels) {
            return Err(VerificationError::AlreadyCovered {
                labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
            }
            .into());
        }

        let solution = self.run_black_box(request, customize).await?;
        let generation_coverage = probe.snapshot().await?;
        generation_coverage.check_covered_targets(labels)?;
        info!(folder = %request.folder, "targets covered during generation");

        probe.reset().await?;
        self.run_generated_tests(request.format, &request.folder)
            .await?;
        let suite_coverage = probe.snapshot().await?;
        suite_coverage.check_covered_targets(labels)?;
        info!(folder = %request.folder, "targets covered by generated suite");

        Ok(EvaluationReport {
            solution,
            generation_coverage,
            suite_coverage,
        })
    }

    /// [`execute_and_evaluate`](Self::execute_and_evaluate) for one label.
    pub async fn execute_and_evaluate_single<F>(
        &self,
        request: &RunRequest,
        label: &str,
        probe: &dyn CoverageProbe,
        customize: F,
    ) -> Result<EvaluationReport, HarnessError>
    where
        F: Fn(RunConfiguration) -> RunConfiguration,
    {
        self.execute_and_evaluate(request, &[label], probe, customize)
            .await
    }
}

/// Recursively delete `dir`. A missing directory is not an error.
pub async fn clean_output_dir(dir: &Path) -> Result<(), HarnessError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            info!("removed previous output at {dir:?}");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(HarnessError::Cleanup {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
