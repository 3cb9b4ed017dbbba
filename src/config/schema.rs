//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};

/// Annotation Argo CD writes on resources it tracks by id
pub const DEFAULT_TRACKING_ANNOTATION: &str = "argocd.argoproj.io/tracking-id";

/// Label Argo CD writes on resources it tracks by label
pub const DEFAULT_INSTANCE_LABEL: &str = "app.kubernetes.io/instance";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Kinds skipped entirely when harvesting the cluster (high volume, low value)
    #[serde(default = "default_exclude_kinds")]
    pub exclude_kinds: Vec<String>,

    /// Tracking-id annotation key
    #[serde(default = "default_tracking_annotation")]
    pub tracking_annotation: String,

    /// Instance label key
    #[serde(default = "default_instance_label")]
    pub instance_label: String,

    /// Namespace roots are looked up in when none is given
    #[serde(default = "default_argo_namespace")]
    pub argo_namespace: String,
}

// Default value functions
fn default_exclude_kinds() -> Vec<String> {
    vec!["Event".to_string()]
}

fn default_tracking_annotation() -> String {
    DEFAULT_TRACKING_ANNOTATION.to_string()
}

fn default_instance_label() -> String {
    DEFAULT_INSTANCE_LABEL.to_string()
}

fn default_argo_namespace() -> String {
    "argocd".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_kinds: default_exclude_kinds(),
            tracking_annotation: default_tracking_annotation(),
            instance_label: default_instance_label(),
            argo_namespace: default_argo_namespace(),
        }
    }
}
