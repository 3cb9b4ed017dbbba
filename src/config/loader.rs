//! Configuration loading and layering
//!
//! Precedence order (highest to lowest):
//! 1. Environment variable overrides
//! 2. Root config file
//! 3. Built-in defaults

use super::{paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Comma-separated kinds replacing `excludeKinds`
pub const ENV_EXCLUDE_KINDS: &str = "ARGOGRAPH_EXCLUDE_KINDS";

/// Replaces `argoNamespace`
pub const ENV_NAMESPACE: &str = "ARGOGRAPH_NAMESPACE";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers applied
    pub fn load() -> Result<Config> {
        let path = paths::root_config_path();
        let config = if path.exists() {
            Self::load_file(&path)?
        } else {
            Self::load_defaults()
        };
        let config = Self::apply_overrides(config, |key| std::env::var(key).ok());
        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a file; absent keys take their defaults
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        Config::default()
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
        if let Some(kinds) = lookup(ENV_EXCLUDE_KINDS) {
            config.exclude_kinds = kinds
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(ns) = lookup(ENV_NAMESPACE).filter(|ns| !ns.is_empty()) {
            config.argo_namespace = ns;
        }
        config
    }

    /// Reject settings that would make every tracking signal unmatchable
    pub fn validate(config: &Config) -> Result<()> {
        if config.tracking_annotation.trim().is_empty() {
            return Err(anyhow::anyhow!("trackingAnnotation must not be empty"));
        }
        if config.instance_label.trim().is_empty() {
            return Err(anyhow::anyhow!("instanceLabel must not be empty"));
        }
        if config.argo_namespace.trim().is_empty() {
            return Err(anyhow::anyhow!("argoNamespace must not be empty"));
        }
        Ok(())
    }

    /// Write configuration to the root config file
    pub fn save_root(config: &Config) -> Result<()> {
        let path = paths::root_config_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
        std::fs::write(&path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
