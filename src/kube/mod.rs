//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server, resource type discovery,
//! bulk listing, and identity helpers for unstructured objects.

pub mod harvest;
pub mod object;
pub mod source;

pub use harvest::{Harvester, ObjectUniverse};
pub use object::ObjectKey;
pub use source::{ClusterSource, KubeClusterSource, ResourceType};

use anyhow::{Context, Result};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// With no context, uses the default loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
///
/// With a context, that context is selected from the kubeconfig.
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    let config = match context {
        Some(ctx) => {
            let options = KubeConfigOptions {
                context: Some(ctx.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options)
                .await
                .with_context(|| format!("Failed to load kubeconfig context '{}'", ctx))?
        }
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };

    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Split an `apiVersion` into (group, version); the core group is empty
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_api_version() {
        assert_eq!(split_api_version("apps/v1"), ("apps", "v1"));
        assert_eq!(split_api_version("v1"), ("", "v1"));
        assert_eq!(
            split_api_version("argoproj.io/v1alpha1"),
            ("argoproj.io", "v1alpha1")
        );
    }
}
