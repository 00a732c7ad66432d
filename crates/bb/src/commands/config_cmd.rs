//! Config command implementation

use anyhow::Result;
use bb_e2e_core::config::{ConfigOverrides, GLOBAL_CONFIG_PATH, find_repo_local_config};
use bb_e2e_core::home::get_home_dir;
use clap::Args;
use serde_json::json;

use super::resolve;

/// Show effective configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the config command
pub fn execute(args: ConfigArgs, overrides: &ConfigOverrides) -> Result<()> {
    let config = resolve(overrides)?;
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;

    let global_config_path = home_dir.join(GLOBAL_CONFIG_PATH);
    let repo_config_path = overrides
        .config_path
        .clone()
        .or_else(|| find_repo_local_config(&current_dir));

    if args.json {
        let output = json!({
            "config": config,
            "configFiles": {
                "global": {
                    "path": global_config_path.display().to_string(),
                    "exists": global_config_path.exists(),
                },
                "repo": repo_config_path.as_ref().map(|p| p.display().to_string()),
            }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Service:     {}", config.sut.base_url());
        println!("Schema:      {}", config.sut.schema_url());
        println!(
            "Coverage:    {}",
            config.sut.coverage_url.as_deref().unwrap_or("(none)")
        );
        let engine_line = std::iter::once(config.engine.program.as_str())
            .chain(config.engine.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        println!("Engine:      {engine_line}");
        println!("JS project:  {}", config.output.javascript_root.display());
        println!("Flaky tries: {}", config.flaky.attempts);
        println!();
        println!(
            "Global config: {} ({})",
            global_config_path.display(),
            if global_config_path.exists() { "found" } else { "not found" }
        );
        match repo_config_path {
            Some(path) => println!("Repo config:   {}", path.display()),
            None => println!("Repo config:   (none)"),
        }
    }
    Ok(())
}
