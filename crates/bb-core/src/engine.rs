//! Generation engine seam
//!
//! [`GenerationEngine`] is the boundary between the orchestrator and the
//! test generator. The shipping implementation, [`CommandEngine`], launches
//! the generator as a child process with the run configuration rendered as
//! `--key value` arguments, then loads the solution summary it wrote into
//! the output folder.
//!
//! The child runs in its own process group. When the orchestrator's timeout
//! fires it drops the in-flight future, which kills the launcher together
//! with everything it started instead of leaving it running against the
//! service.

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::process;
use crate::run_config::{RunConfiguration, keys};
use crate::solution::Solution;

/// Lines of stderr kept in error messages
const STDERR_TAIL_LINES: usize = 20;

/// Runs one generation pass for a configuration.
///
/// Object-safe via [`async_trait`] so orchestrators can hold a
/// `Box<dyn GenerationEngine>`.
#[async_trait]
pub trait GenerationEngine: Send + Sync + fmt::Debug {
    async fn generate(&self, config: RunConfiguration) -> Result<Solution, EngineError>;
}

/// Engine launched as an external process
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    summary_file: String,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self::from_config(&EngineConfig {
            program: program.into(),
            ..Default::default()
        })
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            summary_file: config.summary_file.clone(),
        }
    }

    /// Arguments placed before the generated options
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_summary_file(mut self, name: impl Into<String>) -> Self {
        self.summary_file = name.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument vector (without the program) for `config`
    pub fn command_args(&self, config: &RunConfiguration) -> Vec<String> {
        self.args.iter().cloned().chain(config.to_args()).collect()
    }

    fn summary_path(&self, config: &RunConfiguration) -> Result<PathBuf, EngineError> {
        let folder = config.get(keys::OUTPUT_FOLDER).ok_or_else(|| {
            EngineError::InvalidConfig(format!("missing '{}' option", keys::OUTPUT_FOLDER))
        })?;
        Ok(PathBuf::from(folder).join(&self.summary_file))
    }
}

#[async_trait]
impl GenerationEngine for CommandEngine {
    async fn generate(&self, config: RunConfiguration) -> Result<Solution, EngineError> {
        let summary_path = self.summary_path(&config)?;
        let args = self.command_args(&config);
        info!(program = %self.program, options = config.len(), "launching generation engine");
        debug!(?args, "engine arguments");

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let output = process::output(command)
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.to_string(),
                stderr: tail(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL_LINES),
            });
        }
        debug!(
            stdout_bytes = output.stdout.len(),
            "generation engine finished"
        );

        if !summary_path.exists() {
            warn!("engine wrote no solution summary at {summary_path:?}; assuming empty solution");
            return Ok(Solution::default());
        }
        let solution = Solution::load(&summary_path)?;
        info!(
            individuals = solution.individuals.len(),
            "loaded solution summary"
        );
        Ok(solution)
    }
}

/// Last `lines` lines of `text`, trimmed
pub(crate) fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_prefix_then_options() {
        let engine = CommandEngine::new("java").with_args(["-jar", "evomaster.jar"]);
        let config = RunConfiguration::new()
            .with("blackBox", "true")
            .with("testSuiteFileName", "");

        assert_eq!(
            engine.command_args(&config),
            vec![
                "-jar",
                "evomaster.jar",
                "--blackBox",
                "true",
                "--testSuiteFileName",
                ""
            ]
        );
    }

    #[test]
    fn test_summary_path_requires_output_folder() {
        let engine = CommandEngine::new("evomaster");
        let err = engine.summary_path(&RunConfiguration::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
        assert!(!err.is_flaky());

        let config = RunConfiguration::new().with(keys::OUTPUT_FOLDER, "out/XmlEM");
        assert_eq!(
            engine.summary_path(&config).unwrap(),
            PathBuf::from("out/XmlEM/solution.json")
        );
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail("only", 5), "only");
        assert_eq!(tail("", 5), "");
    }

    #[tokio::test]
    async fn test_missing_program_is_fatal_spawn_error() {
        let engine = CommandEngine::new("bb-e2e-definitely-not-installed");
        let config = RunConfiguration::new().with(keys::OUTPUT_FOLDER, "unused");
        let err = engine.generate(config).await.unwrap_err();
        assert!(matches!(err, EngineError::Spawn { .. }));
        assert!(!err.is_flaky());
    }
}
