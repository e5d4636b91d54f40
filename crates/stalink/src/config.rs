//! CLI-side configuration: `GlobalOpts`-aware wrappers over `stalink-config`.

use std::path::PathBuf;

use clap::ValueEnum;
use tracing::warn;

pub use stalink_config::{Config, Profile};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// `--config` if given, else the platform path.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(stalink_config::config_path)
}

pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(stalink_config::load_config_from(&config_path(global))?)
}

/// `--output`, else `defaults.output`, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or_else(|_| {
            warn!(output = %cfg.defaults.output, "unknown default output format, using table");
            OutputFormat::Table
        })
    })
}

/// Resolve and validate the active profile.
pub fn active_profile(global: &GlobalOpts, cfg: &Config) -> Result<(String, Profile), CliError> {
    let (name, profile) =
        stalink_config::active_profile(cfg, global.profile.as_deref()).map_err(|e| {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            CliError::from_config(e, &available, &config_path(global).display().to_string())
        })?;
    profile.validate()?;
    Ok((name, profile.clone()))
}
