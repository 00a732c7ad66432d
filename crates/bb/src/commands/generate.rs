//! Generate command implementation

use anyhow::Result;
use bb_e2e_core::config::ConfigOverrides;
use bb_e2e_core::solution::parse_expectation;
use bb_e2e_core::{CommandEngine, Solution, TestOrchestrator};
use clap::Args;
use serde_json::json;

use super::error::CommandError;
use super::{RunSpec, resolve};

/// Generate a suite without re-executing it
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub spec: RunSpec,

    /// Require a matching call in the solution: "VERB STATUS PATH [BODY]";
    /// repeatable
    #[arg(long = "expect", value_name = "EXPECTATION")]
    pub expectations: Vec<String>,

    /// Print the solution summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the generate command
pub async fn execute(args: GenerateArgs, overrides: &ConfigOverrides) -> Result<()> {
    let config = resolve(overrides)?;
    let engine = CommandEngine::from_config(&config.engine);
    let orchestrator = TestOrchestrator::new(config, engine);
    let options = args.spec.overrides()?;

    let solution = orchestrator
        .run_black_box(&args.spec.request(), |c| c.with_all(options.clone()))
        .await?;
    check_expectations(&solution, &args.expectations)?;

    print_summary(&solution, &args.spec.folder, args.json)?;
    Ok(())
}

/// Assert every `--expect` entry has a matching call
pub(crate) fn check_expectations(solution: &Solution, expectations: &[String]) -> Result<()> {
    if expectations.is_empty() {
        return Ok(());
    }
    solution.assert_not_empty()?;
    for raw in expectations {
        let (verb, status, path, body) =
            parse_expectation(raw).map_err(CommandError::InvalidExpectation)?;
        solution.assert_has_at_least_one(verb, status, &path, body.as_deref())?;
    }
    Ok(())
}

pub(crate) fn print_summary(solution: &Solution, folder: &str, as_json: bool) -> Result<()> {
    if as_json {
        let output = json!({
            "folder": folder,
            "individuals": solution.individuals.len(),
            "calls": solution.calls().count(),
            "solution": solution,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Generated '{folder}': {} individual(s), {} call(s)",
            solution.individuals.len(),
            solution.calls().count()
        );
    }
    Ok(())
}
