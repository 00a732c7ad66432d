//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::output_format::OutputFormat;

/// Complete harness configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Service under test
    #[serde(default)]
    pub sut: SutConfig,
    /// External generation engine
    #[serde(default)]
    pub engine: EngineConfig,
    /// Where generated suites are written
    #[serde(default)]
    pub output: OutputConfig,
    /// Generated suite execution
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Retry policy for transient engine failures
    #[serde(default)]
    pub flaky: FlakyConfig,
}

/// Service under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SutConfig {
    /// Base URL of the running service, without trailing slash
    pub base_url: String,
    /// Path of the OpenAPI schema, appended to `base_url`
    pub schema_path: String,
    /// Engine problem type
    pub problem_type: String,
    /// Endpoint exposing covered targets (see [`crate::coverage::HttpCoverageProbe`])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_url: Option<String>,
}

impl Default for SutConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            schema_path: "/v3/api-docs".to_string(),
            problem_type: "REST".to_string(),
            coverage_url: None,
        }
    }
}

impl SutConfig {
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn schema_url(&self) -> String {
        format!("{}{}", self.base_url(), self.schema_path)
    }
}

/// External generation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Program to launch, e.g. `java` or a wrapper script
    pub program: String,
    /// Arguments placed before the generated `--key value` options,
    /// e.g. `["-jar", "evomaster.jar"]`
    pub args: Vec<String>,
    /// Solution summary file name, relative to the output folder
    pub summary_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "evomaster".to_string(),
            args: Vec::new(),
            summary_file: "solution.json".to_string(),
        }
    }
}

/// Where generated suites are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// npm project that runs generated JavaScript suites
    pub javascript_root: PathBuf,
    /// Directory under each project root holding generated suites
    pub generated_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            javascript_root: PathBuf::from("javascript"),
            generated_dir: "generated".to_string(),
        }
    }
}

impl OutputConfig {
    /// Base location for suites of `format`, or `None` when black-box runs
    /// do not support the format.
    pub fn base_location(&self, format: OutputFormat) -> Option<PathBuf> {
        if format.is_javascript() {
            Some(self.javascript_root.join(&self.generated_dir))
        } else {
            None
        }
    }

    /// Path of a generated suite relative to its project root
    pub fn relative_path(&self, folder: &str) -> String {
        format!("{}/{folder}", self.generated_dir)
    }
}

/// Generated suite execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub npm_bin: String,
    /// Run `npm install` before `npm test`
    pub install_dependencies: bool,
    /// Bound on the whole verification pass
    pub timeout_minutes: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            npm_bin: "npm".to_string(),
            install_dependencies: true,
            timeout_minutes: 10,
        }
    }
}

/// Retry policy for transient engine failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlakyConfig {
    /// Total attempts per generation run, including the first
    pub attempts: u32,
}

impl Default for FlakyConfig {
    fn default() -> Self {
        Self { attempts: 3 }
    }
}
