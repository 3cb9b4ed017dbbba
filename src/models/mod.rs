//! Model layer
//!
//! Resource kind classification shared by the graph builder and the CLI.

mod argo_resource_kind;

pub use argo_resource_kind::{ARGO_GROUP, ARGO_VERSION, ArgoKind};
