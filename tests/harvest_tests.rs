//! Harvester tests
//!
//! Exercise the fan-out over a fake cluster without a Kubernetes API server.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use argograph::kube::{Harvester, ObjectKey};
use argograph::{ArgoKind, ClusterSource, GraphError, ResourceType};
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::DynamicObject;
use tokio::sync::Barrier;

fn resource_type(kind: &str) -> ResourceType {
    ResourceType {
        group: String::new(),
        version: "v1".to_string(),
        kind: kind.to_string(),
        plural: format!("{}s", kind.to_lowercase()),
        namespaced: true,
    }
}

/// Object as a list response item: no apiVersion/kind of its own
fn bare_item(name: &str) -> DynamicObject {
    DynamicObject {
        types: None,
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some("default".to_string()),
            ..Default::default()
        },
        data: serde_json::json!({}),
    }
}

/// Every list call waits until all of them have started
struct BarrierCluster {
    types: Vec<ResourceType>,
    barrier: Barrier,
    listed: Mutex<Vec<String>>,
}

impl BarrierCluster {
    fn new(kinds: &[&str]) -> Self {
        Self {
            types: kinds.iter().map(|k| resource_type(k)).collect(),
            barrier: Barrier::new(kinds.len()),
            listed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ClusterSource for BarrierCluster {
    async fn preferred_types(&self) -> Result<Vec<ResourceType>> {
        Ok(self.types.clone())
    }

    async fn list(&self, resource: &ResourceType) -> Result<Vec<DynamicObject>> {
        self.barrier.wait().await;
        self.listed.lock().unwrap().push(resource.kind.clone());
        if resource.kind == "Lease" {
            anyhow::bail!("the server could not find the requested resource");
        }
        Ok(vec![bare_item(&format!("{}-1", resource.kind.to_lowercase()))])
    }
}

#[tokio::test]
async fn test_lists_run_concurrently_and_all_complete() {
    let cluster = BarrierCluster::new(&["ConfigMap", "Secret", "Service", "Lease"]);
    let harvester = Harvester::new(&cluster);

    // Sequential listing would never get past the barrier
    let universe = tokio::time::timeout(
        Duration::from_secs(5),
        harvester.harvest_all(&HashSet::new()),
    )
    .await
    .expect("harvest should not block on sequential lists")
    .unwrap();

    assert_eq!(universe.len(), 3);
    let mut listed = cluster.listed.lock().unwrap().clone();
    listed.sort();
    assert_eq!(listed, vec!["ConfigMap", "Lease", "Secret", "Service"]);
}

#[tokio::test]
async fn test_listed_items_get_type_meta_from_their_resource_type() {
    let cluster = BarrierCluster::new(&["ConfigMap"]);
    let universe = Harvester::new(&cluster)
        .harvest_all(&HashSet::new())
        .await
        .unwrap();

    let obj = universe.iter().next().unwrap();
    let key = ObjectKey::of(obj);
    assert_eq!(key.kind, "ConfigMap");
    assert_eq!(key.version, "v1");
    assert_eq!(key.name, "configmap-1");
}

#[tokio::test]
async fn test_exclusions_shrink_the_fan_out() {
    let cluster = BarrierCluster::new(&["ConfigMap", "Event"]);
    // Barrier sized for two lists; exclude one so only a single list runs
    let cluster = BarrierCluster {
        barrier: Barrier::new(1),
        ..cluster
    };

    let exclude: HashSet<String> = ["Event".to_string()].into_iter().collect();
    let universe = Harvester::new(&cluster).harvest_all(&exclude).await.unwrap();

    assert_eq!(universe.len(), 1);
    assert_eq!(*cluster.listed.lock().unwrap(), vec!["ConfigMap"]);
}

struct DownCluster;

#[async_trait]
impl ClusterSource for DownCluster {
    async fn preferred_types(&self) -> Result<Vec<ResourceType>> {
        anyhow::bail!("dial tcp 10.0.0.1:6443: connect: connection refused")
    }

    async fn list(&self, _resource: &ResourceType) -> Result<Vec<DynamicObject>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_discovery_failure_is_reported() {
    let err = Harvester::new(&DownCluster)
        .harvest_all(&HashSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Discovery(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_harvest_one_lists_only_applications() {
    let cluster = BarrierCluster {
        types: Vec::new(),
        barrier: Barrier::new(1),
        listed: Mutex::new(Vec::new()),
    };
    let applications = ResourceType::argo(ArgoKind::Application).unwrap();

    let universe = Harvester::new(&cluster).harvest_one(&applications).await;

    assert_eq!(universe.len(), 1);
    let obj = universe.iter().next().unwrap();
    assert_eq!(ArgoKind::of(obj), ArgoKind::Application);
    assert_eq!(*cluster.listed.lock().unwrap(), vec!["Application"]);
}
