//! CLI command dispatch and execution

use anyhow::{Context, Result};
use bb_e2e_core::OutputFormat;
use bb_e2e_core::config::{ConfigOverrides, HarnessConfig, resolve_config};
use bb_e2e_core::home::get_home_dir;
use bb_e2e_core::{RunConfiguration, RunRequest};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod args;
mod config_cmd;
mod error;
mod generate;
mod run;
mod verify;

use error::CommandError;

/// bb-e2e - black-box test generation harness
#[derive(Parser, Debug)]
#[command(
    name = "bb-e2e",
    version,
    about = "Black-box test generation harness",
    long_about = "Runs a test generation engine against a running service, verifies coverage targets, and re-executes the generated suite"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a suite, then verify it covers the targets
    Run(run::RunArgs),

    /// Generate a suite without re-executing it
    Generate(generate::GenerateArgs),

    /// Execute a previously generated suite
    Verify(verify::VerifyArgs),

    /// Print the engine command line for a run without launching it
    Args(args::ArgsArgs),

    /// Show effective configuration
    Config(config_cmd::ConfigArgs),
}

/// Configuration overrides accepted by every subcommand
#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Config file to use instead of .bb-e2e.toml discovery
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the service under test
    #[arg(long, global = true)]
    sut_url: Option<String>,

    /// Engine program to launch
    #[arg(long, global = true)]
    engine: Option<String>,

    /// npm project that runs generated JavaScript suites
    #[arg(long, global = true)]
    js_root: Option<PathBuf>,

    /// Engine attempts per run when failures are transient
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    flaky_attempts: Option<u32>,
}

impl GlobalArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.sut_url.clone(),
            engine_program: self.engine.clone(),
            javascript_root: self.js_root.clone(),
            flaky_attempts: self.flaky_attempts,
            config_path: self.config.clone(),
            ..Default::default()
        }
    }
}

/// Options describing one generation run
#[derive(Args, Debug, Clone)]
pub struct RunSpec {
    /// Output format of the generated suite (e.g. JS_JEST)
    #[arg(long, short = 'f', default_value = "JS_JEST", value_parser = parse_format)]
    pub format: OutputFormat,

    /// Output folder name under the format's base location
    #[arg(long)]
    pub folder: String,

    /// Budget of action evaluations
    #[arg(long, default_value_t = 100)]
    pub iterations: u32,

    /// Wall-clock bound for the generation phase
    #[arg(long, default_value_t = 3)]
    pub timeout_minutes: u64,

    /// Extra engine option as key=value; repeatable, later wins
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

impl RunSpec {
    fn request(&self) -> RunRequest {
        RunRequest::new(
            self.format,
            self.folder.clone(),
            self.iterations,
            self.timeout_minutes,
        )
    }

    /// Parsed `--set` pairs
    fn overrides(&self) -> Result<Vec<(String, String)>, CommandError> {
        self.options
            .iter()
            .map(|raw| {
                RunConfiguration::parse_override(raw)
                    .ok_or_else(|| CommandError::InvalidOption(raw.clone()))
            })
            .collect()
    }
}

fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    raw.parse::<OutputFormat>().map_err(|e| e.to_string())
}

fn resolve(overrides: &ConfigOverrides) -> Result<HarnessConfig> {
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;
    resolve_config(overrides, &current_dir, &home_dir).context("Failed to resolve configuration")
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let overrides = self.global.overrides();
        match self.command {
            Commands::Run(args) => run::execute(args, &overrides).await,
            Commands::Generate(args) => generate::execute(args, &overrides).await,
            Commands::Verify(args) => verify::execute(args, &overrides).await,
            Commands::Args(args) => args::execute(args, &overrides),
            Commands::Config(args) => config_cmd::execute(args, &overrides),
        }
    }
}
