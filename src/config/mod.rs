//! Configuration system for argograph
//!
//! A single YAML file layered over built-in defaults, with environment
//! variable overrides on top.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::Config;

/// Get a configuration value by key
pub fn get_config_value(config: &Config, key: &str) -> anyhow::Result<String> {
    match key {
        "excludeKinds" => Ok(config.exclude_kinds.join(",")),
        "trackingAnnotation" => Ok(config.tracking_annotation.clone()),
        "instanceLabel" => Ok(config.instance_label.clone()),
        "argoNamespace" => Ok(config.argo_namespace.clone()),
        _ => Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }
}

/// Set a configuration value by key
pub fn set_config_value(config: &mut Config, key: &str, value: &str) -> anyhow::Result<()> {
    match key {
        "excludeKinds" => {
            config.exclude_kinds = value
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        "trackingAnnotation" => {
            config.tracking_annotation = value.to_string();
        }
        "instanceLabel" => {
            config.instance_label = value.to_string();
        }
        "argoNamespace" => {
            config.argo_namespace = value.to_string();
        }
        _ => return Err(anyhow::anyhow!("Unknown configuration key: {}", key)),
    }

    ConfigLoader::validate(config)
}
