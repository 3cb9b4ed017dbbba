//! Graph builder for Argo CD delivery entities
//!
//! Resolves an unstructured root object into a node and, for Applications and
//! ApplicationSets, discovers related cluster objects and links them with edges
//! labeled by the child's kind. Every related object goes back through
//! [`GraphBuilder::resolve`], so a related AppProject or nested Application is
//! itself classified and expanded.
//!
//! Application children are found in two passes over a full harvest:
//! 1. direct signals: the project named by `spec.project`, a tracking-id
//!    annotation prefixed with `<app>:`, or an instance label equal to `<app>`
//! 2. namespace closure: every object in a namespace that holds a child found
//!    through the annotation or label
//!
//! ApplicationSet children are exactly the Applications with an owner
//! reference to the set's UID.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use futures::FutureExt;
use futures::future::BoxFuture;
use kube::core::DynamicObject;

use super::error::GraphError;
use super::options::GraphOptions;
use super::store::{GraphSink, NodeId, ResourceGraph};
use crate::kube::object::{
    annotation, kind_of, label, name_of, namespace_of, owner_uids, spec_str,
};
use crate::kube::{ClusterSource, Harvester, ObjectKey, ResourceType};
use crate::models::ArgoKind;

/// Outcome of resolving one object.
///
/// The node is always present; `error` carries the failure that cut the
/// expansion short, in which case the node's edges may be incomplete.
#[derive(Debug)]
pub struct Resolution {
    pub node: NodeId,
    pub error: Option<GraphError>,
}

impl Resolution {
    fn ok(node: NodeId) -> Self {
        Self { node, error: None }
    }

    fn failed(node: NodeId, error: GraphError) -> Self {
        Self {
            node,
            error: Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Drop the partial node on failure
    pub fn into_result(self) -> Result<NodeId, GraphError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.node),
        }
    }
}

/// Builds relationship edges into a [`GraphSink`]
pub struct GraphBuilder<'a, C: ClusterSource + ?Sized, S: GraphSink + Send> {
    harvester: Harvester<'a, C>,
    sink: &'a mut S,
    options: GraphOptions,
    /// Delivery entities already expanded in this build
    expanded: HashSet<ObjectKey>,
}

impl<'a, C: ClusterSource + ?Sized, S: GraphSink + Send> GraphBuilder<'a, C, S> {
    pub fn new(source: &'a C, sink: &'a mut S, options: GraphOptions) -> Self {
        Self {
            harvester: Harvester::new(source),
            sink,
            options,
            expanded: HashSet::new(),
        }
    }

    /// Resolve any object into a node, expanding delivery entities
    pub fn resolve<'b>(&'b mut self, obj: &'b DynamicObject) -> BoxFuture<'b, Resolution> {
        async move {
            match ArgoKind::of(obj) {
                ArgoKind::Application => self.resolve_application(obj).await,
                ArgoKind::ApplicationSet => self.resolve_application_set(obj).await,
                ArgoKind::Project => self.resolve_project(obj),
                ArgoKind::Generic => Resolution::ok(self.sink.node(obj)),
            }
        }
        .boxed()
    }

    async fn resolve_application(&mut self, app: &DynamicObject) -> Resolution {
        let node = self.sink.node(app);
        let app_key = ObjectKey::of(app);
        if !self.expanded.insert(app_key.clone()) {
            return Resolution::ok(node);
        }

        let app_name = name_of(app);
        let Some(project) = spec_str(app, "project") else {
            return Resolution::failed(
                node,
                GraphError::MalformedSpec {
                    kind: kind_of(app).to_string(),
                    name: app_name.to_string(),
                    field: "spec.project",
                },
            );
        };
        tracing::debug!("Resolving Application {} (project {})", app_key, project);

        let universe = match self
            .harvester
            .harvest_all(&self.options.exclude_kinds)
            .await
        {
            Ok(universe) => universe,
            Err(e) => return Resolution::failed(node, e),
        };

        let tracking_prefix = format!("{}:", app_name);
        let mut projects = Vec::new();
        let mut children: BTreeMap<ObjectKey, &DynamicObject> = BTreeMap::new();
        let mut tracked_namespaces: BTreeSet<&str> = BTreeSet::new();

        for obj in &universe {
            if ArgoKind::of(obj) == ArgoKind::Project {
                // Projects only ever attach through spec.project
                if name_of(obj) == project {
                    projects.push(obj);
                }
                continue;
            }
            let tracked = annotation(obj, &self.options.tracking_annotation)
                .is_some_and(|id| id.starts_with(&tracking_prefix))
                || label(obj, &self.options.instance_label) == Some(app_name);
            if !tracked {
                continue;
            }
            let key = ObjectKey::of(obj);
            if key == app_key {
                continue;
            }
            if let Some(ns) = namespace_of(obj) {
                tracked_namespaces.insert(ns);
            }
            children.insert(key, obj);
        }

        if !tracked_namespaces.is_empty() {
            for obj in &universe {
                let in_tracked_namespace =
                    namespace_of(obj).is_some_and(|ns| tracked_namespaces.contains(ns));
                if !in_tracked_namespace || ArgoKind::of(obj) == ArgoKind::Project {
                    continue;
                }
                let key = ObjectKey::of(obj);
                if key != app_key {
                    children.entry(key).or_insert(obj);
                }
            }
        }

        tracing::debug!(
            "Application {}: {} project(s), {} child object(s) across {} namespace(s)",
            app_key,
            projects.len(),
            children.len(),
            tracked_namespaces.len()
        );

        for obj in projects.into_iter().chain(children.into_values()) {
            if let Err(e) = self.attach(node, obj).await {
                return Resolution::failed(node, e);
            }
        }

        Resolution::ok(node)
    }

    async fn resolve_application_set(&mut self, appset: &DynamicObject) -> Resolution {
        let node = self.sink.node(appset);
        let appset_key = ObjectKey::of(appset);
        if !self.expanded.insert(appset_key.clone()) {
            return Resolution::ok(node);
        }

        let Some(uid) = appset.metadata.uid.as_deref() else {
            tracing::debug!("ApplicationSet {} has no uid, skipping owner lookup", appset_key);
            return Resolution::ok(node);
        };
        let Some(application_type) = ResourceType::argo(ArgoKind::Application) else {
            return Resolution::ok(node);
        };

        let applications = self.harvester.harvest_one(&application_type).await;
        let owned: BTreeMap<ObjectKey, &DynamicObject> = applications
            .iter()
            .filter(|app| owner_uids(app).any(|owner| owner == uid))
            .map(|app| (ObjectKey::of(app), app))
            .collect();

        tracing::debug!(
            "ApplicationSet {} owns {} of {} Applications",
            appset_key,
            owned.len(),
            applications.len()
        );

        for app in owned.into_values() {
            if let Err(e) = self.attach(node, app).await {
                return Resolution::failed(node, e);
            }
        }

        Resolution::ok(node)
    }

    fn resolve_project(&mut self, project: &DynamicObject) -> Resolution {
        Resolution::ok(self.sink.node(project))
    }

    /// Resolve a child and link it from `parent`, labeled with the child's kind
    async fn attach(&mut self, parent: NodeId, child: &DynamicObject) -> Result<(), GraphError> {
        let resolution = self.resolve(child).await;
        self.sink.relationship(parent, kind_of(child), resolution.node);
        match resolution.error {
            Some(source) => Err(GraphError::ChildResolution {
                kind: kind_of(child).to_string(),
                name: name_of(child).to_string(),
                source: Box::new(source),
            }),
            None => Ok(()),
        }
    }
}

/// A finished build: the graph, the root's node, and any error that cut it short
#[derive(Debug)]
pub struct GraphBuild {
    pub graph: ResourceGraph,
    pub root: NodeId,
    pub error: Option<GraphError>,
}

/// Build a fresh graph rooted at `root`
pub async fn build_graph<C: ClusterSource + ?Sized>(
    source: &C,
    options: GraphOptions,
    root: &DynamicObject,
) -> GraphBuild {
    let mut graph = ResourceGraph::new();
    let resolution = GraphBuilder::new(source, &mut graph, options)
        .resolve(root)
        .await;
    GraphBuild {
        graph,
        root: resolution.node,
        error: resolution.error,
    }
}
