//! Run command implementation: generation plus verification

use anyhow::Result;
use bb_e2e_core::config::ConfigOverrides;
use bb_e2e_core::{CommandEngine, HttpCoverageProbe, TestOrchestrator};
use clap::Args;
use tracing::info;

use super::error::CommandError;
use super::generate::{check_expectations, print_summary};
use super::{RunSpec, resolve};

/// Generate a suite, then verify it covers the targets
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub spec: RunSpec,

    /// Coverage target that must be covered after each phase; repeatable
    #[arg(long = "target", value_name = "LABEL")]
    pub targets: Vec<String>,

    /// Endpoint exposing the service's covered targets
    #[arg(long)]
    pub coverage_url: Option<String>,

    /// Require a matching call in the solution: "VERB STATUS PATH [BODY]";
    /// repeatable
    #[arg(long = "expect", value_name = "EXPECTATION")]
    pub expectations: Vec<String>,

    /// Print the solution summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the run command
///
/// With targets, coverage is checked after generation and again after the
/// generated suite runs. Without targets, both phases still run and only
/// their success is checked.
pub async fn execute(args: RunArgs, overrides: &ConfigOverrides) -> Result<()> {
    let mut overrides = overrides.clone();
    if args.coverage_url.is_some() {
        overrides.coverage_url = args.coverage_url.clone();
    }
    let config = resolve(&overrides)?;
    let coverage_url = config.sut.coverage_url.clone();
    let engine = CommandEngine::from_config(&config.engine);
    let orchestrator = TestOrchestrator::new(config, engine);

    let request = args.spec.request();
    let options = args.spec.overrides()?;
    let customize = |c: bb_e2e_core::RunConfiguration| c.with_all(options.clone());

    let solution = if args.targets.is_empty() {
        let solution = orchestrator.run_black_box(&request, customize).await?;
        orchestrator
            .run_generated_tests(request.format, &request.folder)
            .await?;
        solution
    } else {
        let url = coverage_url.ok_or(CommandError::MissingCoverageUrl)?;
        let probe = HttpCoverageProbe::new(url);
        let report = orchestrator
            .execute_and_evaluate(&request, &args.targets, &probe, customize)
            .await?;
        info!(
            targets = args.targets.len(),
            "all targets covered in both phases"
        );
        report.solution
    };

    check_expectations(&solution, &args.expectations)?;
    print_summary(&solution, &request.folder, args.json)?;
    if !args.json {
        println!("Generated suite for '{}' passed", request.folder);
    }
    Ok(())
}
