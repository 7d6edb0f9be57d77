//! Study configuration helpers.
//!
//! The config is optional; every field falls back to the hicexplorer
//! defaults so a bare studies directory works without one.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_SUM_COMMAND: &str = "hicSumMatrices";
pub const SUM_COMMAND_ENV: &str = "HICSUM_SUM_COMMAND";
pub const DEFAULT_RESOLUTIONS: [u32; 4] = [1_000_000, 500_000, 200_000, 50_000];
pub const DEFAULT_MATRIX_SUBDIR: &str = "hic_results/matrix/h5df";
pub const DEFAULT_TRIO_PREFIX: &str = "trio";

/// Settings read from `hicsum.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StudyConfig {
    pub schema_version: u32,
    pub sum_command: String,
    /// Bin sizes in base pairs, summed in this order.
    pub resolutions: Vec<u32>,
    pub matrix_subdir: String,
    pub trio_prefix: String,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            sum_command: DEFAULT_SUM_COMMAND.to_string(),
            resolutions: DEFAULT_RESOLUTIONS.to_vec(),
            matrix_subdir: DEFAULT_MATRIX_SUBDIR.to_string(),
            trio_prefix: DEFAULT_TRIO_PREFIX.to_string(),
        }
    }
}

/// Load a config file.
pub fn load_config(path: &Path) -> Result<StudyConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: StudyConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load an explicit config, or the default path when it exists, or defaults.
pub fn resolve_config(explicit: Option<&Path>, default_path: &Path) -> Result<StudyConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    if default_path.is_file() {
        tracing::debug!(path = %default_path.display(), "loading study config");
        return load_config(default_path);
    }
    Ok(StudyConfig::default())
}

pub fn validate_config(config: &StudyConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.sum_command.trim().is_empty() {
        return Err(anyhow!("sum_command must not be empty"));
    }
    if config.resolutions.is_empty() {
        return Err(anyhow!("resolutions must list at least one bin size"));
    }
    let mut seen = BTreeSet::new();
    for resolution in &config.resolutions {
        if *resolution == 0 {
            return Err(anyhow!("resolution must be greater than zero"));
        }
        if !seen.insert(resolution) {
            return Err(anyhow!("duplicate resolution {resolution}"));
        }
    }
    if config.trio_prefix.is_empty() || config.trio_prefix.contains('.') {
        return Err(anyhow!(
            "trio_prefix must be a non-empty name without '.': {:?}",
            config.trio_prefix
        ));
    }
    let subdir = Path::new(&config.matrix_subdir);
    if subdir.is_absolute()
        || subdir
            .components()
            .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(anyhow!(
            "matrix_subdir must be a relative path without '..': {}",
            config.matrix_subdir
        ));
    }
    Ok(())
}

/// Resolve the summation command: explicit flag > env var > config.
pub fn resolve_sum_command(explicit: Option<&str>, config: &StudyConfig) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            std::env::var(SUM_COMMAND_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty())
        })
        .unwrap_or_else(|| config.sum_command.clone())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
