//! YAML draw configuration files.

use anyhow::{Context, Result};
use paydraw_types::DrawConfig;
use std::fs;
use std::path::Path;

pub fn parse_config(contents: &str) -> Result<DrawConfig, serde_yaml::Error> {
    serde_yaml::from_str(contents)
}

/// Read a config file. Validation happens when the controller is built.
pub fn load_config(path: &Path) -> Result<DrawConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {}", path.display()))?;
    parse_config(&contents).context("Could not parse config file")
}
