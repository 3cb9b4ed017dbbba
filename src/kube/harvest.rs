//! Bulk object harvesting
//!
//! Fans out one list call per resource type and merges the results into an
//! [`ObjectUniverse`]. Each list call writes only its own result slot; the
//! merge happens after every call has completed. A type that fails to list
//! contributes nothing instead of failing the harvest, since served catalogs
//! routinely contain aggregated or virtual types that cannot be listed.

use std::collections::HashSet;

use futures::future::join_all;
use kube::core::DynamicObject;

use super::source::{ClusterSource, ResourceType};
use crate::graph::GraphError;

/// The full set of objects collected by one harvest, in no particular order
#[derive(Debug, Clone, Default)]
pub struct ObjectUniverse {
    objects: Vec<DynamicObject>,
}

impl ObjectUniverse {
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DynamicObject> {
        self.objects.iter()
    }

    pub fn into_objects(self) -> Vec<DynamicObject> {
        self.objects
    }

    fn from_slots(slots: Vec<Vec<DynamicObject>>) -> Self {
        let total = slots.iter().map(Vec::len).sum();
        let mut objects = Vec::with_capacity(total);
        for slot in slots {
            objects.extend(slot);
        }
        Self { objects }
    }
}

impl<'a> IntoIterator for &'a ObjectUniverse {
    type Item = &'a DynamicObject;
    type IntoIter = std::slice::Iter<'a, DynamicObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// Concurrent lister over a [`ClusterSource`]
pub struct Harvester<'a, C: ClusterSource + ?Sized> {
    source: &'a C,
}

impl<'a, C: ClusterSource + ?Sized> Harvester<'a, C> {
    pub fn new(source: &'a C) -> Self {
        Self { source }
    }

    /// List every served resource type whose kind is not in `exclude_kinds`.
    ///
    /// Only a catalog failure is returned as an error.
    pub async fn harvest_all(
        &self,
        exclude_kinds: &HashSet<String>,
    ) -> Result<ObjectUniverse, GraphError> {
        let types = self
            .source
            .preferred_types()
            .await
            .map_err(GraphError::Discovery)?;

        let selected: Vec<ResourceType> = types
            .into_iter()
            .filter(|t| !exclude_kinds.contains(&t.kind))
            .collect();

        let universe = self.collect(&selected).await;
        tracing::info!(
            "Harvested {} objects across {} resource types",
            universe.len(),
            selected.len()
        );
        Ok(universe)
    }

    /// List all instances of a single resource type
    pub async fn harvest_one(&self, resource: &ResourceType) -> ObjectUniverse {
        self.collect(std::slice::from_ref(resource)).await
    }

    async fn collect(&self, types: &[ResourceType]) -> ObjectUniverse {
        let slots = join_all(types.iter().map(|t| self.list_or_empty(t))).await;
        ObjectUniverse::from_slots(slots)
    }

    async fn list_or_empty(&self, resource: &ResourceType) -> Vec<DynamicObject> {
        match self.source.list(resource).await {
            Ok(items) => items.into_iter().map(|obj| resource.stamp(obj)).collect(),
            Err(e) => {
                tracing::debug!("Treating {} as empty: {:#}", resource, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kube::source::MockClusterSource;
    use serde_json::json;

    fn resource_type(kind: &str, plural: &str) -> ResourceType {
        ResourceType {
            group: String::new(),
            version: "v1".to_string(),
            kind: kind.to_string(),
            plural: plural.to_string(),
            namespaced: true,
        }
    }

    fn config_map(name: &str) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": { "name": name, "namespace": "default" }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_failed_type_is_empty_not_fatal() {
        let mut source = MockClusterSource::new();
        source.expect_preferred_types().returning(|| {
            Ok(vec![
                resource_type("ConfigMap", "configmaps"),
                resource_type("Secret", "secrets"),
            ])
        });
        source.expect_list().returning(|rt| {
            if rt.kind == "Secret" {
                Err(anyhow::anyhow!("secrets is forbidden"))
            } else {
                Ok(vec![config_map("a"), config_map("b")])
            }
        });

        let universe = Harvester::new(&source)
            .harvest_all(&HashSet::new())
            .await
            .unwrap();
        assert_eq!(universe.len(), 2);
        assert!(universe.iter().all(|o| o.types.as_ref().unwrap().kind == "ConfigMap"));
    }

    #[tokio::test]
    async fn test_excluded_kinds_are_never_listed() {
        let mut source = MockClusterSource::new();
        source.expect_preferred_types().returning(|| {
            Ok(vec![
                resource_type("ConfigMap", "configmaps"),
                resource_type("Event", "events"),
            ])
        });
        source
            .expect_list()
            .withf(|rt| rt.kind == "ConfigMap")
            .times(1)
            .returning(|_| Ok(vec![config_map("a")]));

        let exclude: HashSet<String> = ["Event".to_string()].into_iter().collect();
        let universe = Harvester::new(&source).harvest_all(&exclude).await.unwrap();
        assert_eq!(universe.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_fatal() {
        let mut source = MockClusterSource::new();
        source
            .expect_preferred_types()
            .returning(|| Err(anyhow::anyhow!("connection refused")));

        let result = Harvester::new(&source).harvest_all(&HashSet::new()).await;
        assert!(matches!(result, Err(GraphError::Discovery(_))));
    }

    #[tokio::test]
    async fn test_harvest_one_skips_catalog() {
        let mut source = MockClusterSource::new();
        source.expect_preferred_types().never();
        source
            .expect_list()
            .times(1)
            .returning(|_| Ok(vec![config_map("only")]));

        let universe = Harvester::new(&source)
            .harvest_one(&resource_type("ConfigMap", "configmaps"))
            .await;
        assert_eq!(universe.len(), 1);
    }
}
