//! Tunables for relationship inference

use std::collections::HashSet;

use crate::config::Config;
use crate::config::schema::{DEFAULT_INSTANCE_LABEL, DEFAULT_TRACKING_ANNOTATION};

/// Settings the graph builder reads on every resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    /// Kinds never listed during a full harvest
    pub exclude_kinds: HashSet<String>,
    /// Annotation whose value starts with `<app>:` on tracked objects
    pub tracking_annotation: String,
    /// Label whose value equals the application name on tracked objects
    pub instance_label: String,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            exclude_kinds: ["Event".to_string()].into_iter().collect(),
            tracking_annotation: DEFAULT_TRACKING_ANNOTATION.to_string(),
            instance_label: DEFAULT_INSTANCE_LABEL.to_string(),
        }
    }
}

impl From<&Config> for GraphOptions {
    fn from(config: &Config) -> Self {
        Self {
            exclude_kinds: config.exclude_kinds.iter().cloned().collect(),
            tracking_annotation: config.tracking_annotation.clone(),
            instance_label: config.instance_label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_default_config() {
        assert_eq!(GraphOptions::default(), GraphOptions::from(&Config::default()));
    }
}
