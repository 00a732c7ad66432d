//! Args command implementation: dry run of the engine command line

use anyhow::Result;
use bb_e2e_core::config::ConfigOverrides;
use bb_e2e_core::seed::DEFAULT_SEED;
use bb_e2e_core::{CommandEngine, TestOrchestrator};
use clap::Args;

use super::{RunSpec, resolve};

/// Print the engine command line for a run without launching it
#[derive(Args, Debug)]
pub struct ArgsArgs {
    #[command(flatten)]
    pub spec: RunSpec,

    /// Seed to render into the configuration
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Output as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Execute the args command
pub fn execute(args: ArgsArgs, overrides: &ConfigOverrides) -> Result<()> {
    let config = resolve(overrides)?;
    let engine = CommandEngine::from_config(&config.engine);
    let program = engine.program().to_string();
    let orchestrator = TestOrchestrator::new(config, engine.clone());

    let request = args.spec.request();
    let output_dir = orchestrator.output_dir(request.format, &request.folder)?;
    let run_config = orchestrator
        .base_configuration(&request, &output_dir, args.seed)
        .with_all(args.spec.overrides()?);

    let mut argv = vec![program];
    argv.extend(engine.command_args(&run_config));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&argv)?);
    } else {
        let quoted: Vec<String> = argv.iter().map(|a| shell_quote(a)).collect();
        println!("{}", quoted.join(" "));
    }
    Ok(())
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
