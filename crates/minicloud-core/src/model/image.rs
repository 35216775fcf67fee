use crate::entity::{Entity, sort_by_class};
use crate::remote::RemoteResource;
use minicloud_cloud::{RemoteItem, ResourceKind, ResourceSpec};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub name: String,
    pub id: Option<String>,
    pub cloud: Option<String>,
}

impl Entity for Image {
    const KIND: &'static str = "image";

    fn name(&self) -> &str {
        &self.name
    }

    /// Well-known distributions first
    fn sort(entities: &mut [Self]) {
        let classes: [fn(&str) -> bool; 6] = [
            |n| n.to_lowercase().contains("cirros"),
            |n| n.to_lowercase().contains("centos"),
            |n| n.to_lowercase().contains("coreos"),
            |n| n.to_lowercase().contains("fedora"),
            |n| n.to_lowercase().contains("opensuse"),
            |n| n.to_lowercase().contains("ubuntu"),
        ];
        sort_by_class(entities, &classes);
    }
}

impl RemoteResource for Image {
    const RESOURCE: ResourceKind = ResourceKind::Image;
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
        ResourceSpec::new(ResourceKind::Image, self.name.clone(), serde_json::json!({}))
    }
}
