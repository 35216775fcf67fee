use crate::entity::Entity;
use crate::remote::RemoteResource;
use minicloud_cloud::{RemoteItem, ResourceKind, ResourceSpec};
use serde_json::json;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Router {
    pub name: String,
    pub id: Option<String>,
    pub cloud: Option<String>,
    /// External network the router is uplinked to
    pub external_network: Option<String>,
}

impl Router {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Entity for Router {
    const KIND: &'static str = "router";

    fn name(&self) -> &str {
        &self.name
    }
}

impl RemoteResource for Router {
    const RESOURCE: ResourceKind = ResourceKind::Router;

    fn remote_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn cloud_name(&self) -> Option<&str> {
        self.cloud.as_deref()
    }

    fn bind_cloud(&mut self, cloud: &str) {
        self.cloud = Some(cloud.to_string());
    }

    fn from_remote(cloud: &str, item: &RemoteItem) -> Option<Self> {
        Some(Self {
            name: item.name.clone(),
            id: Some(item.id.clone()),
            cloud: Some(cloud.to_string()),
            external_network: item.attribute_str("external_network").map(str::to_string),
        })
    }

    fn to_spec(&self) -> ResourceSpec {
        ResourceSpec::new(
            ResourceKind::Router,
            self.name.clone(),
            json!({ "external_network": self.external_network }),
        )
    }
}
