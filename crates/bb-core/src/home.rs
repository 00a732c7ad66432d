//! Home directory resolution
//!
//! # Precedence
//!
//! 1. `BB_E2E_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default
//!
//! Integration tests set `BB_E2E_HOME` to a temp dir so the global config at
//! `~/.config/bb-e2e/config.toml` never leaks into a test run.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "BB_E2E_HOME";

/// Get the home directory used to locate the global config.
///
/// # Errors
///
/// Returns an error if `BB_E2E_HOME` is unset and the platform home directory
/// cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().context("Could not determine home directory")
}
