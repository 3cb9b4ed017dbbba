//! argograph library
//!
//! Builds ownership and tracking graphs for Argo CD delivery entities
//! (Applications, ApplicationSets and AppProjects) from the objects in a
//! live cluster. It can be used both as a binary and as a library.

pub mod cli;
pub mod config;
pub mod graph;
pub mod kube;
pub mod models;

// Re-export commonly used types for convenience
pub use graph::{
    GraphBuild, GraphBuilder, GraphError, GraphOptions, GraphSink, NodeId, Resolution,
    ResourceGraph, build_graph,
};
pub use crate::kube::{ClusterSource, KubeClusterSource, ObjectKey, ResourceType};
pub use models::ArgoKind;
