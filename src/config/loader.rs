// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::SchedulerConfig;
use crate::errors::Result;

/// Load a scheduler configuration from a TOML file and validate it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<SchedulerConfig> {
    let contents = fs::read_to_string(path.as_ref())?;

    let config: SchedulerConfig = toml::from_str(&contents)?;
    config.validate()?;

    Ok(config)
}

/// Load the configuration from `path` if one was given, otherwise fall back
/// to [`SchedulerConfig::default`].
///
/// The defaults are always valid, so validation only runs on loaded files.
pub fn load_or_default(path: Option<&Path>) -> Result<SchedulerConfig> {
    match path {
        Some(p) => load_from_path(p),
        None => Ok(SchedulerConfig::default()),
    }
}
