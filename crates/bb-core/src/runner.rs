//! Re-execution of generated test suites
//!
//! After a generation run the emitted suite is executed on its own, with the
//! toolchain of its output format, so coverage can be checked a second time
//! independently of the engine. [`GeneratedTestRunner::run`] is the single
//! dispatch point; a new backend is one more arm in its `match`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{HarnessConfig, OutputConfig, RunnerConfig};
use crate::engine::tail;
use crate::error::{HarnessError, RunnerError};
use crate::output_format::OutputFormat;
use crate::process;

const STDERR_TAIL_LINES: usize = 40;

#[derive(Debug, Clone)]
pub struct GeneratedTestRunner {
    output: OutputConfig,
    runner: RunnerConfig,
}

impl GeneratedTestRunner {
    pub fn new(output: OutputConfig, runner: RunnerConfig) -> Self {
        Self { output, runner }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(config.output.clone(), config.runner.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.runner.timeout_minutes.saturating_mul(60))
    }

    /// Execute the suite generated into `folder` for `format`.
    ///
    /// # Errors
    ///
    /// - [`HarnessError::UnsupportedOutputFormat`] for formats without a
    ///   runner backend (everything except the JavaScript family)
    /// - [`HarnessError::Timeout`] if the pass exceeds the runner timeout;
    ///   `npm` and every process it started are killed
    /// - [`HarnessError::Runner`] if the test command fails
    pub async fn run(&self, format: OutputFormat, folder: &str) -> Result<(), HarnessError> {
        match format {
            f if f.is_javascript() => {
                let limit = self.timeout();
                tokio::time::timeout(limit, self.run_npm_tests(folder))
                    .await
                    .map_err(|_| HarnessError::Timeout {
                        phase: "generated test run",
                        folder: folder.to_string(),
                        limit,
                    })??;
                Ok(())
            }
            other => Err(HarnessError::UnsupportedOutputFormat(other)),
        }
    }

    /// `npm install` (optional) then `npm test -- <generated dir>/<folder>`,
    /// both from the JavaScript project root.
    async fn run_npm_tests(&self, folder: &str) -> Result<(), RunnerError> {
        let root = &self.output.javascript_root;
        if !root.is_dir() {
            return Err(RunnerError::MissingProjectRoot(root.clone()));
        }

        if self.runner.install_dependencies {
            self.run_step(root, &["install".to_string()]).await?;
        }

        let relative = self.output.relative_path(folder);
        self.run_step(root, &["test".to_string(), "--".to_string(), relative])
            .await?;
        info!(folder, "generated JavaScript suite passed");
        Ok(())
    }

    async fn run_step(&self, cwd: &Path, args: &[String]) -> Result<(), RunnerError> {
        let npm = &self.runner.npm_bin;
        let command = format!("{npm} {}", args.join(" "));
        info!(cwd = %cwd.display(), %command, "running generated suite step");

        let mut step = Command::new(npm);
        step.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let output = process::output(step)
            .await
            .map_err(|source| RunnerError::Spawn {
                program: npm.clone(),
                source,
            })?;

        debug!(
            %command,
            stdout = %tail(&String::from_utf8_lossy(&output.stdout), 10),
            "step output"
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(RunnerError::TestsFailed {
                command,
                status: output.status.to_string(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
            })
        }
    }

    /// Directory the suite for `folder` is generated into
    pub fn suite_dir(&self, format: OutputFormat, folder: &str) -> Option<PathBuf> {
        self.output.base_location(format).map(|base| base.join(folder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_formats_are_fatal() {
        let runner = GeneratedTestRunner::from_config(&HarnessConfig::default());
        for format in [
            OutputFormat::PythonUnittest,
            OutputFormat::JavaJunit5,
            OutputFormat::KotlinJunit4,
        ] {
            let err = runner.run(format, "XmlEM").await.unwrap_err();
            assert!(matches!(err, HarnessError::UnsupportedOutputFormat(f) if f == format));
        }
    }

    #[tokio::test]
    async fn test_missing_project_root() {
        let mut config = HarnessConfig::default();
        config.output.javascript_root = PathBuf::from("/nonexistent/bb-e2e/javascript");
        let runner = GeneratedTestRunner::from_config(&config);

        let err = runner.run(OutputFormat::JsJest, "XmlEM").await.unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Runner(RunnerError::MissingProjectRoot(_))
        ));
    }

    #[test]
    fn test_suite_dir() {
        let runner = GeneratedTestRunner::from_config(&HarnessConfig::default());
        assert_eq!(
            runner.suite_dir(OutputFormat::JsJest, "XmlEM"),
            Some(PathBuf::from("javascript/generated/XmlEM"))
        );
        assert_eq!(runner.suite_dir(OutputFormat::PythonUnittest, "XmlEM"), None);
    }
}
