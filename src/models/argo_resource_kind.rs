//! Argo CD resource kind definitions
//!
//! Closed set of the delivery-entity kinds the graph builder specializes,
//! plus an explicit `Generic` variant for every other resource. Dispatch in
//! the graph builder matches on this enum instead of free-form kind strings.

use std::fmt;
use std::str::FromStr;

use kube::core::{ApiResource, DynamicObject, GroupVersionKind};

/// API group serving the Argo CD custom resources
pub const ARGO_GROUP: &str = "argoproj.io";

/// API version of the Argo CD custom resources
pub const ARGO_VERSION: &str = "v1alpha1";

/// Classification of a resource for graph construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgoKind {
    Application,
    ApplicationSet,
    /// Served as `AppProject`
    Project,
    /// Any resource the builder does not expand
    Generic,
}

impl ArgoKind {
    /// Get the served kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgoKind::Application => "Application",
            ArgoKind::ApplicationSet => "ApplicationSet",
            ArgoKind::Project => "AppProject",
            ArgoKind::Generic => "Generic",
        }
    }

    /// Plural resource name used in API paths
    pub fn plural(&self) -> Option<&'static str> {
        match self {
            ArgoKind::Application => Some("applications"),
            ArgoKind::ApplicationSet => Some("applicationsets"),
            ArgoKind::Project => Some("appprojects"),
            ArgoKind::Generic => None,
        }
    }

    /// Classify a group/kind pair.
    ///
    /// Only kinds served under `argoproj.io` are delivery entities; an
    /// `Application` from any other group is a plain leaf.
    pub fn classify(group: &str, kind: &str) -> Self {
        if group != ARGO_GROUP {
            return ArgoKind::Generic;
        }
        kind.parse().unwrap_or(ArgoKind::Generic)
    }

    /// Classify an unstructured object by its `apiVersion` and `kind`
    pub fn of(obj: &DynamicObject) -> Self {
        match &obj.types {
            Some(types) => {
                let (group, _) = crate::kube::split_api_version(&types.api_version);
                Self::classify(group, &types.kind)
            }
            None => ArgoKind::Generic,
        }
    }

    /// Get all delivery-entity kinds (excludes `Generic`)
    pub fn all() -> &'static [Self] {
        &[
            ArgoKind::Application,
            ArgoKind::ApplicationSet,
            ArgoKind::Project,
        ]
    }

    /// Whether this kind is expanded into child edges by the builder
    pub fn is_expandable(&self) -> bool {
        matches!(self, ArgoKind::Application | ArgoKind::ApplicationSet)
    }

    /// API resource for listing or fetching this kind, `None` for `Generic`
    pub fn api_resource(&self) -> Option<ApiResource> {
        let plural = self.plural()?;
        let gvk = GroupVersionKind::gvk(ARGO_GROUP, ARGO_VERSION, self.as_str());
        Some(ApiResource::from_gvk_with_plural(&gvk, plural))
    }

    /// Try to parse a string (case-insensitive, short names allowed)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "application" | "applications" | "app" | "apps" => Some(ArgoKind::Application),
            "applicationset" | "applicationsets" | "appset" | "appsets" => {
                Some(ArgoKind::ApplicationSet)
            }
            "appproject" | "appprojects" | "project" | "projects" | "proj" => {
                Some(ArgoKind::Project)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ArgoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArgoKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Application" => Ok(ArgoKind::Application),
            "ApplicationSet" => Ok(ArgoKind::ApplicationSet),
            "AppProject" | "Project" => Ok(ArgoKind::Project),
            _ => Err(format!("Unknown Argo CD resource kind: {}", s)),
        }
    }
}
