//! Errors surfaced by graph construction

/// Failures that reach the caller of a graph build.
///
/// A single resource type failing to list is not represented here; the
/// harvester absorbs it as an empty result.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Failed to discover served resource types: {0:#}")]
    Discovery(#[source] anyhow::Error),

    #[error("{kind} {name} is missing required field {field}")]
    MalformedSpec {
        kind: String,
        name: String,
        field: &'static str,
    },

    #[error("Failed to resolve child {kind} {name}")]
    ChildResolution {
        kind: String,
        name: String,
        source: Box<GraphError>,
    },
}

impl GraphError {
    /// The innermost error, following child resolution failures down
    pub fn root_cause(&self) -> &GraphError {
        match self {
            GraphError::ChildResolution { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
