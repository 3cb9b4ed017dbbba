//! Identity and field access for unstructured objects
//!
//! Objects are treated as read-only input; every helper here borrows.

use std::fmt;

use kube::core::DynamicObject;
use serde::Serialize;

use super::split_api_version;

/// Identity of a cluster object: (group, version, kind, namespace, name)
///
/// Cluster-scoped objects carry no namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectKey {
    pub group: String,
    pub version: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn of(obj: &DynamicObject) -> Self {
        let (group, version, kind) = match &obj.types {
            Some(types) => {
                let (group, version) = split_api_version(&types.api_version);
                (group.to_string(), version.to_string(), types.kind.clone())
            }
            None => (String::new(), String::new(), String::new()),
        };
        Self {
            group,
            version,
            kind,
            namespace: namespace_of(obj).map(str::to_string),
            name: obj.metadata.name.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = if self.group.is_empty() {
            "core"
        } else {
            self.group.as_str()
        };
        match &self.namespace {
            Some(ns) => write!(
                f,
                "{}/{}/{}/{}/{}",
                group, self.version, self.kind, ns, self.name
            ),
            None => write!(f, "{}/{}/{}/{}", group, self.version, self.kind, self.name),
        }
    }
}

/// Kind string of an object, empty when the type meta is missing
pub fn kind_of(obj: &DynamicObject) -> &str {
    obj.types.as_ref().map(|t| t.kind.as_str()).unwrap_or("")
}

/// Name of an object, empty when unset
pub fn name_of(obj: &DynamicObject) -> &str {
    obj.metadata.name.as_deref().unwrap_or("")
}

/// Namespace of an object; `None` for cluster-scoped objects
pub fn namespace_of(obj: &DynamicObject) -> Option<&str> {
    obj.metadata
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
}

pub fn annotation<'a>(obj: &'a DynamicObject, key: &str) -> Option<&'a str> {
    obj.metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(key))
        .map(String::as_str)
}

pub fn label<'a>(obj: &'a DynamicObject, key: &str) -> Option<&'a str> {
    obj.metadata
        .labels
        .as_ref()
        .and_then(|l| l.get(key))
        .map(String::as_str)
}

/// UIDs listed in `metadata.ownerReferences`
pub fn owner_uids(obj: &DynamicObject) -> impl Iterator<Item = &str> {
    obj.metadata
        .owner_references
        .iter()
        .flatten()
        .map(|r| r.uid.as_str())
}

/// String value of `spec.<field>`; `None` when absent or not a string
pub fn spec_str<'a>(obj: &'a DynamicObject, field: &str) -> Option<&'a str> {
    obj.data
        .get("spec")
        .and_then(|s| s.get(field))
        .and_then(|v| v.as_str())
}
