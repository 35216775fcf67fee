use crate::entity::{Entity, sort_by_class};
use crate::remote::RemoteResource;
use minicloud_cloud::{RemoteItem, ResourceKind, ResourceSpec};

/// Compute size class offered by a cloud
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flavor {
    pub name: String,
    pub id: Option<String>,
    pub cloud: Option<String>,
}

impl Entity for Flavor {
    const KIND: &'static str = "flavor";

    fn name(&self) -> &str {
        &self.name
    }

    /// Size classes first: tiny, small, medium, large, xlarge
    fn sort(entities: &mut [Self]) {
        let classes: [fn(&str) -> bool; 5] = [
            |n| n.contains("tiny"),
            |n| n.contains("small"),
            |n| n.contains("medium"),
            |n| n.contains("large") && !n.contains("xlarge"),
            |n| n.contains("xlarge"),
        ];
        sort_by_class(entities, &classes);
    }
}

impl RemoteResource for Flavor {
    const RESOURCE: ResourceKind = ResourceKind::Flavor;
    const READ_ONLY: bool = true;

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
        })
    }

    fn to_spec(&self) -> ResourceSpec {
        ResourceSpec::new(ResourceKind::Flavor, self.name.clone(), serde_json::json!({}))
    }
}
