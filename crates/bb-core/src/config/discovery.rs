//! Configuration discovery and resolution

use super::types::HarnessConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Repo-local config file name
pub const REPO_CONFIG_FILE: &str = ".bb-e2e.toml";

/// Global config path, relative to the home directory
pub const GLOBAL_CONFIG_PATH: &str = ".config/bb-e2e/config.toml";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Invalid value in an environment variable
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override the service base URL
    pub base_url: Option<String>,
    /// Override the engine program
    pub engine_program: Option<String>,
    /// Override the coverage endpoint
    pub coverage_url: Option<String>,
    /// Override the JavaScript project root
    pub javascript_root: Option<PathBuf>,
    /// Override the number of flaky attempts
    pub flaky_attempts: Option<u32>,
    /// Explicit config file; replaces repo-local discovery
    pub config_path: Option<PathBuf>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables
/// 3. Repo-local config (.bb-e2e.toml in current dir or up to git root),
///    or the explicit `config_path` override
/// 4. Global config (~/.config/bb-e2e/config.toml)
/// 5. Defaults
///
/// Unparseable global or repo-local files are skipped with a warning. An
/// explicit `config_path` must load.
pub fn resolve_config(
    overrides: &ConfigOverrides,
    current_dir: &Path,
    home_dir: &Path,
) -> Result<HarnessConfig, ConfigError> {
    let mut config = HarnessConfig::default();

    // 4. Global config
    let global_config_path = home_dir.join(GLOBAL_CONFIG_PATH);
    if global_config_path.exists() {
        match load_config_file(&global_config_path) {
            Ok(file_config) => config = file_config,
            Err(e) => warn!("Failed to parse global config at {global_config_path:?}: {e}"),
        }
    }

    // 3. Explicit or repo-local config
    if let Some(path) = &overrides.config_path {
        config = load_layered(path, &config)?;
    } else if let Some(repo_config) = find_repo_local_config(current_dir) {
        match load_layered(&repo_config, &config) {
            Ok(merged) => config = merged,
            Err(e) => warn!("Failed to parse repo config at {repo_config:?}: {e}"),
        }
    }

    // 2. Environment variables
    apply_env_overrides(&mut config)?;

    // 1. Command-line overrides
    apply_cli_overrides(&mut config, overrides);

    Ok(config)
}

/// Find repo-local config file
///
/// Searches current directory and parent directories up to git root
pub fn find_repo_local_config(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let config_path = dir.join(REPO_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if dir.join(".git").exists() {
            break;
        }

        dir = dir.parent()?;
    }

    None
}

fn load_config_file(path: &Path) -> Result<HarnessConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Load `path` on top of `base`: keys present in the file win, keys absent
/// from the file keep the value from `base`.
fn load_layered(path: &Path, base: &HarnessConfig) -> Result<HarnessConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let file: toml::Table = toml::from_str(&contents)?;
    let mut merged = match toml::Value::try_from(base) {
        Ok(toml::Value::Table(table)) => table,
        _ => toml::Table::new(),
    };
    merge_tables(&mut merged, file);
    debug!("Loaded config from {path:?}");
    Ok(toml::Value::Table(merged).try_into()?)
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                merge_tables(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut HarnessConfig) -> Result<(), ConfigError> {
    if let Some(url) = non_empty_env("BB_E2E_SUT_URL") {
        config.sut.base_url = url;
    }
    if let Some(url) = non_empty_env("BB_E2E_COVERAGE_URL") {
        config.sut.coverage_url = Some(url);
    }
    if let Some(program) = non_empty_env("BB_E2E_ENGINE") {
        config.engine.program = program;
    }
    if let Some(root) = non_empty_env("BB_E2E_JS_ROOT") {
        config.output.javascript_root = PathBuf::from(root);
    }
    if let Some(npm) = non_empty_env("BB_E2E_NPM") {
        config.runner.npm_bin = npm;
    }
    if let Some(raw) = non_empty_env("BB_E2E_FLAKY_ATTEMPTS") {
        config.flaky.attempts = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: "BB_E2E_FLAKY_ATTEMPTS",
            value: raw.clone(),
        })?;
    }
    Ok(())
}

/// Apply command-line overrides
fn apply_cli_overrides(config: &mut HarnessConfig, overrides: &ConfigOverrides) {
    if let Some(ref url) = overrides.base_url {
        config.sut.base_url = url.clone();
    }
    if let Some(ref program) = overrides.engine_program {
        config.engine.program = program.clone();
    }
    if let Some(ref url) = overrides.coverage_url {
        config.sut.coverage_url = Some(url.clone());
    }
    if let Some(ref root) = overrides.javascript_root {
        config.output.javascript_root = root.clone();
    }
    if let Some(attempts) = overrides.flaky_attempts {
        config.flaky.attempts = attempts;
    }
}
