//! Relationship graphs for Argo CD delivery entities
//!
//! Builds a directed graph rooted at an Application, ApplicationSet or
//! AppProject, linking it to every cluster object it owns or tracks.

mod builder;
mod error;
mod options;
mod store;

pub use builder::{GraphBuild, GraphBuilder, Resolution, build_graph};
pub use error::GraphError;
pub use options::GraphOptions;
pub use store::{GraphEdge, GraphNode, GraphSink, NodeId, ResourceGraph};
