//! Cluster collaborators: resource type catalog and list transport
//!
//! `ClusterSource` is the seam between the graph builder and the API server.
//! `KubeClusterSource` is the production implementation on top of `kube::Client`.

use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::api::ListParams;
use kube::core::{ApiResource, DynamicObject, GroupVersionKind, TypeMeta};
use kube::{Api, Client};

use crate::models::ArgoKind;

/// A list-able resource type served by the cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceType {
    pub group: String,
    pub version: String,
    pub kind: String,
    /// Plural name used in the list path (e.g. `deployments`)
    pub plural: String,
    pub namespaced: bool,
}

impl ResourceType {
    /// Resource type for one of the Argo CD kinds, `None` for `Generic`
    pub fn argo(kind: ArgoKind) -> Option<Self> {
        let ar = kind.api_resource()?;
        Some(Self {
            group: ar.group,
            version: ar.version,
            kind: ar.kind,
            plural: ar.plural,
            namespaced: true,
        })
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }

    /// Fill in `apiVersion`/`kind` on a listed object when the server left them out
    pub fn stamp(&self, mut obj: DynamicObject) -> DynamicObject {
        let missing = obj
            .types
            .as_ref()
            .is_none_or(|t| t.kind.is_empty() || t.api_version.is_empty());
        if missing {
            obj.types = Some(TypeMeta {
                api_version: self.api_version(),
                kind: self.kind.clone(),
            });
        }
        obj
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.plural, self.version)
        } else {
            write!(f, "{}.{}.{}", self.plural, self.version, self.group)
        }
    }
}

/// Source of resource types and objects for one cluster
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Every list-able resource type at its preferred version
    async fn preferred_types(&self) -> Result<Vec<ResourceType>>;

    /// All instances of one resource type across all namespaces
    async fn list(&self, resource: &ResourceType) -> Result<Vec<DynamicObject>>;
}

/// `ClusterSource` backed by a live API server
#[derive(Clone)]
pub struct KubeClusterSource {
    client: Client,
}

impl KubeClusterSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn group_types(
        &self,
        group: String,
        group_version: String,
        version: String,
    ) -> Vec<ResourceType> {
        match self.client.list_api_group_resources(&group_version).await {
            Ok(list) => resource_types_from_list(&group, &version, &list),
            Err(e) => {
                tracing::warn!("Skipping API group {}: {}", group_version, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ClusterSource for KubeClusterSource {
    async fn preferred_types(&self) -> Result<Vec<ResourceType>> {
        let core = self
            .client
            .list_core_api_versions()
            .await
            .context("Failed to list core API versions")?;
        let core_version = core
            .versions
            .first()
            .cloned()
            .unwrap_or_else(|| "v1".to_string());
        let core_list = self
            .client
            .list_core_api_resources(&core_version)
            .await
            .context("Failed to list core API resources")?;
        let mut types = resource_types_from_list("", &core_version, &core_list);

        let groups = self
            .client
            .list_api_groups()
            .await
            .context("Failed to list API groups")?;

        let lookups = groups.groups.into_iter().filter_map(|group| {
            let preferred = group
                .preferred_version
                .or_else(|| group.versions.first().cloned())?;
            Some(self.group_types(group.name, preferred.group_version, preferred.version))
        });
        for group_types in join_all(lookups).await {
            types.extend(group_types);
        }

        tracing::debug!("Discovered {} list-able resource types", types.len());
        Ok(types)
    }

    async fn list(&self, resource: &ResourceType) -> Result<Vec<DynamicObject>> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource.api_resource());
        let list = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("Failed to list {}", resource))?;
        Ok(list.items)
    }
}

/// Turn one discovery document into list-able resource types.
///
/// Subresources (`pods/log`) and types without the `list` verb are dropped.
pub(crate) fn resource_types_from_list(
    group: &str,
    version: &str,
    list: &APIResourceList,
) -> Vec<ResourceType> {
    list.resources
        .iter()
        .filter(|r| !r.name.contains('/'))
        .filter(|r| r.verbs.iter().any(|v| v == "list"))
        .map(|r| ResourceType {
            group: r.group.clone().unwrap_or_else(|| group.to_string()),
            version: r.version.clone().unwrap_or_else(|| version.to_string()),
            kind: r.kind.clone(),
            plural: r.name.clone(),
            namespaced: r.namespaced,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, ObjectMeta};

    fn api_resource(name: &str, kind: &str, verbs: &[&str]) -> APIResource {
        APIResource {
            name: name.to_string(),
            kind: kind.to_string(),
            namespaced: true,
            verbs: verbs.iter().map(|v| v.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resource_types_from_list_filters() {
        let list = APIResourceList {
            group_version: "apps/v1".to_string(),
            resources: vec![
                api_resource("deployments", "Deployment", &["get", "list", "watch"]),
                api_resource("deployments/scale", "Scale", &["get", "list"]),
                api_resource("tokenreviews", "TokenReview", &["create"]),
            ],
        };
        let types = resource_types_from_list("apps", "v1", &list);
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].kind, "Deployment");
        assert_eq!(types[0].plural, "deployments");
        assert_eq!(types[0].api_version(), "apps/v1");
    }

    #[test]
    fn test_display_and_api_version() {
        let core = ResourceType {
            group: String::new(),
            version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
            plural: "configmaps".to_string(),
            namespaced: true,
        };
        assert_eq!(core.api_version(), "v1");
        assert_eq!(core.to_string(), "configmaps.v1");

        let apps = ResourceType::argo(ArgoKind::Application).unwrap();
        assert_eq!(apps.to_string(), "applications.v1alpha1.argoproj.io");
    }

    #[test]
    fn test_stamp_fills_missing_type_meta() {
        let rt = ResourceType::argo(ArgoKind::Application).unwrap();
        let obj = DynamicObject {
            types: None,
            metadata: ObjectMeta {
                name: Some("a".to_string()),
                ..Default::default()
            },
            data: serde_json::json!({}),
        };
        let stamped = rt.stamp(obj);
        let types = stamped.types.unwrap();
        assert_eq!(types.api_version, "argoproj.io/v1alpha1");
        assert_eq!(types.kind, "Application");
    }
}
