//! Configuration file support for license-tracker.
//!
//! Provides YAML-based configuration through `license-tracker.config.yml`
//! files, including data structures, file loading, and validation.
//! Command-line flags always take precedence over values loaded here.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::adapters::outbound::cache::MAX_TTL_DAYS;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "license-tracker.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub cache_path: Option<PathBuf>,
    pub cache_ttl_days: Option<u32>,
    pub max_concurrency: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub output: Option<PathBuf>,
    pub forbidden_licenses: Option<Vec<String>>,
    pub allowed_licenses: Option<Vec<String>>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_yaml_ng::Value>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config = parse_config(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// An empty document is an empty config.
fn parse_config(content: &str) -> Result<ConfigFile> {
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    Ok(serde_yaml_ng::from_str(content)?)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    tracing::debug!(path = %config_path.display(), "Using discovered config file");
    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.cache_ttl_days == Some(0) {
        bail!(
            "Invalid config: cache_ttl_days must be at least 1.\n\n\
             💡 Hint: Remove the field to use the default of 30 days."
        );
    }
    if let Some(days) = config.cache_ttl_days.filter(|days| *days > MAX_TTL_DAYS) {
        bail!(
            "Invalid config: cache_ttl_days must be at most {} (got {}).",
            MAX_TTL_DAYS,
            days
        );
    }
    if config.max_concurrency == Some(0) {
        bail!("Invalid config: max_concurrency must be at least 1.");
    }
    if config.request_timeout_secs == Some(0) {
        bail!("Invalid config: request_timeout_secs must be at least 1.");
    }
    if config.forbidden_licenses.is_some() && config.allowed_licenses.is_some() {
        bail!(
            "Invalid config: forbidden_licenses and allowed_licenses cannot both be set.\n\n\
             💡 Hint: Use a deny list or an allow list, not both."
        );
    }
    for (field, list) in [
        ("forbidden_licenses", &config.forbidden_licenses),
        ("allowed_licenses", &config.allowed_licenses),
    ] {
        if let Some(list) = list {
            if let Some(i) = list.iter().position(|l| l.trim().is_empty()) {
                bail!("Invalid config: {}[{}] must not be empty.", field, i);
            }
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        tracing::warn!(field = %key, "Unknown config field will be ignored");
        eprintln!("⚠️  Warning: Unknown config field '{}' will be ignored.", key);
    }
}
