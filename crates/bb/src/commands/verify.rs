//! Verify command implementation

use anyhow::Result;
use bb_e2e_core::config::ConfigOverrides;
use bb_e2e_core::{GeneratedTestRunner, OutputFormat};
use clap::Args;

use super::{parse_format, resolve};

/// Execute a previously generated suite
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Output format of the generated suite
    #[arg(long, short = 'f', default_value = "JS_JEST", value_parser = parse_format)]
    pub format: OutputFormat,

    /// Output folder name under the format's base location
    #[arg(long)]
    pub folder: String,
}

/// Execute the verify command
pub async fn execute(args: VerifyArgs, overrides: &ConfigOverrides) -> Result<()> {
    let config = resolve(overrides)?;
    let runner = GeneratedTestRunner::from_config(&config);
    runner.run(args.format, &args.folder).await?;
    println!("Generated suite for '{}' passed", args.folder);
    Ok(())
}
