//! Run configuration helpers.
//!
//! This module loads, validates, and writes the run-owned `beanpack.json`.
//! Coverage thresholds are deliberately absent: they are fixed in code.
use crate::paths::RunPaths;
use crate::util::{read_json, write_json};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current schema version for `beanpack.json`.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Default upper bound for files the inventory will scan.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

/// Directories never worth scanning, regardless of config.
pub const BUILTIN_IGNORE_DIRS: [&str; 11] = [
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    "vendor",
    "__pycache__",
    ".venv",
    ".beanpack",
];

/// Run-owned configuration persisted as `beanpack.json`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub schema_version: u32,
    /// Run the enrich stage when an enricher is available.
    #[serde(default)]
    pub enrich: bool,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Extra directory names skipped by the inventory walk.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_dirs: Vec<String>,
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            enrich: false,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            ignore_dirs: Vec::new(),
        }
    }
}

impl RunConfig {
    /// Return true when a directory name should be skipped by the walk.
    pub fn ignores_dir(&self, name: &str) -> bool {
        BUILTIN_IGNORE_DIRS.contains(&name) || self.ignore_dirs.iter().any(|dir| dir == name)
    }
}

/// Load `beanpack.json`, falling back to defaults when it is absent.
pub fn load_config(run_root: &Path) -> Result<RunConfig> {
    let paths = RunPaths::new(run_root.to_path_buf());
    let path = paths.config_path();
    if !path.is_file() {
        return Ok(RunConfig::default());
    }
    let config: RunConfig = read_json(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Persist a config to disk in a stable JSON format.
pub fn write_config(run_root: &Path, config: &RunConfig) -> Result<()> {
    validate_config(config)?;
    let paths = RunPaths::new(run_root.to_path_buf());
    write_json(&paths.config_path(), config)
}

/// Validate schema version and user-provided values.
pub fn validate_config(config: &RunConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported beanpack config schema_version {}",
            config.schema_version
        ));
    }
    if config.max_file_bytes == 0 {
        return Err(anyhow!("max_file_bytes must be greater than zero"));
    }
    for dir in &config.ignore_dirs {
        validate_dir_name(dir)?;
    }
    Ok(())
}

fn validate_dir_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return Err(anyhow!("ignore_dirs entries must be directory names (got {name:?})"));
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(anyhow!(
            "ignore_dirs entries must be bare names without separators (got {name:?})"
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
