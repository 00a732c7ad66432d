//! Configuration resolution
//!
//! Resolves configuration from multiple sources with priority:
//! 1. Command-line flags (passed as parameters)
//! 2. Environment variables (`BB_E2E_*`)
//! 3. Repo-local config (.bb-e2e.toml)
//! 4. Global config (~/.config/bb-e2e/config.toml)
//! 5. Defaults

mod discovery;
mod types;

pub use discovery::{
    ConfigError, ConfigOverrides, GLOBAL_CONFIG_PATH, REPO_CONFIG_FILE, find_repo_local_config,
    resolve_config,
};
pub use types::{EngineConfig, FlakyConfig, HarnessConfig, OutputConfig, RunnerConfig, SutConfig};
