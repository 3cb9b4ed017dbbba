//! Graph command handler
//!
//! Fetches a root Argo CD object, builds its relationship graph and prints it.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use kube::Api;
use kube::core::DynamicObject;
use serde::Serialize;

use crate::config::ConfigLoader;
use crate::graph::{GraphOptions, NodeId, ResourceGraph, build_graph};
use crate::kube::{KubeClusterSource, ResourceType, create_client};
use crate::models::ArgoKind;

/// Output encodings for a built graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Arguments of the `graph` command
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Root kind: application, applicationset or appproject
    pub kind: String,
    /// Root name
    pub name: String,
    /// Namespace of the root (defaults to the configured argoNamespace)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
    /// Kubeconfig context to use instead of the current one
    #[arg(long)]
    pub context: Option<String>,
    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

#[derive(Serialize)]
struct GraphOutput<'a> {
    root: NodeId,
    #[serde(flatten)]
    graph: &'a ResourceGraph,
}

/// Build and print the graph for one root object.
///
/// A partial graph is still printed when the build fails part way.
pub async fn handle_graph_command(args: GraphArgs) -> Result<()> {
    let config = ConfigLoader::load().context("Failed to load configuration")?;

    let kind = ArgoKind::from_str_case_insensitive(&args.kind).ok_or_else(|| {
        anyhow::anyhow!(
            "Unsupported kind '{}': expected application, applicationset or appproject",
            args.kind
        )
    })?;
    let resource = ResourceType::argo(kind)
        .ok_or_else(|| anyhow::anyhow!("No API resource for kind {}", kind))?;
    let namespace = args
        .namespace
        .unwrap_or_else(|| config.argo_namespace.clone());

    let client = create_client(args.context.as_deref()).await?;
    let api: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), &namespace, &resource.api_resource());
    let root = api
        .get(&args.name)
        .await
        .with_context(|| format!("Failed to fetch {} {}/{}", kind, namespace, args.name))?;
    let root = resource.stamp(root);

    let source = KubeClusterSource::new(client);
    let build = build_graph(&source, GraphOptions::from(&config), &root).await;
    tracing::info!(
        "Built graph with {} nodes and {} edges",
        build.graph.node_count(),
        build.graph.edge_count()
    );

    let output = GraphOutput {
        root: build.root,
        graph: &build.graph,
    };
    let rendered = match args.output {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&output).context("Failed to serialize graph")?
        }
        OutputFormat::Yaml => serde_yaml::to_string(&output).context("Failed to serialize graph")?,
    };
    println!("{}", rendered);

    match build.error {
        Some(e) => Err(anyhow::Error::new(e).context("Graph is incomplete")),
        None => Ok(()),
    }
}
