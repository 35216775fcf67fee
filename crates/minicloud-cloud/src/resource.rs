//! Remote resource representations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of resource a remote context manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Network,
    Router,
    SecurityGroup,
    Instance,
    Flavor,
    Image,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Network,
        ResourceKind::Router,
        ResourceKind::SecurityGroup,
        ResourceKind::Instance,
        ResourceKind::Flavor,
        ResourceKind::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Network => "network",
            ResourceKind::Router => "router",
            ResourceKind::SecurityGroup => "security_group",
            ResourceKind::Instance => "instance",
            ResourceKind::Flavor => "flavor",
            ResourceKind::Image => "image",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource as reported by a remote context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Resource kind
    pub kind: ResourceKind,

    /// Backend-assigned identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Kind-specific attributes (cidrs, ip, status, ...)
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl RemoteItem {
    pub fn new(kind: ResourceKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            name: name.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Get an attribute as a specific type
    pub fn get_attribute<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.attributes
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }
}

/// Desired resource handed to a remote context for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub kind: ResourceKind,

    pub name: String,

    /// Kind-specific configuration
    pub config: serde_json::Value,
}

impl ResourceSpec {
    pub fn new(kind: ResourceKind, name: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            kind,
            name: name.into(),
            config,
        }
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Result of a remote delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The resource was already gone
    NotFound,
    /// The backend failed while deleting; the resource may linger
    ServerError(String),
}

impl DeleteOutcome {
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}
