use crate::entity::Entity;
use crate::model::Cluster;
use crate::remote::RemoteResource;
use minicloud_cloud::{RemoteItem, ResourceKind, ResourceSpec};
use serde_json::{Value, json};

/// Status a backend reports for an instance that is still being built
pub const STATUS_BUILD: &str = "BUILD";

/// A compute instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instance {
    pub name: String,
    pub id: Option<String>,
    pub cloud: Option<String>,
    pub cluster_name: Option<String>,
    pub network: Option<String>,
    pub flavor: Option<String>,
    pub image: Option<String>,
    pub security_group: Option<String>,
    pub ip: Option<String>,
    pub status: Option<String>,
}

impl Instance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn in_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster_name = Some(cluster.into());
        self
    }

    pub fn on_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_security_group(mut self, sg: impl Into<String>) -> Self {
        self.security_group = Some(sg.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("ACTIVE")
    }
}

impl Entity for Instance {
    const KIND: &'static str = "instance";

    fn name(&self) -> &str {
        &self.name
    }

    fn parent_name(&self) -> Option<&str> {
        self.cluster_name.as_deref()
    }

    fn describe(&self) -> String {
        format!(
            "Instance: {} [{}] ({}) [{}] {}",
            self.name,
            self.ip.as_deref().unwrap_or(""),
            self.network.as_deref().unwrap_or(""),
            self.security_group.as_deref().unwrap_or(""),
            self.status.as_deref().unwrap_or("")
        )
    }
}

impl RemoteResource for Instance {
    const RESOURCE: ResourceKind = ResourceKind::Instance;

    fn remote_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn cloud_name(&self) -> Option<&str> {
        self.cloud.as_deref()
    }

    fn bind_cloud(&mut self, cloud: &str) {
        self.cloud = Some(cloud.to_string());
    }

    fn cluster_name(&self) -> Option<&str> {
        self.cluster_name.as_deref()
    }

    fn from_remote(cloud: &str, item: &RemoteItem) -> Option<Self> {
        let status = item.attribute_str("status").map(str::to_string);
        if status.as_deref() == Some(STATUS_BUILD) {
            tracing::debug!("Instance {} is not ready yet.", item.name);
            return None;
        }

        let cluster_name = item
            .attribute_str("cluster")
            .map(str::to_string)
            .unwrap_or_else(|| Cluster::unnamed_name(cloud));

        Some(Self {
            name: item.name.clone(),
            id: Some(item.id.clone()),
            cloud: Some(cloud.to_string()),
            cluster_name: Some(cluster_name),
            network: item.attribute_str("network").map(str::to_string),
            flavor: item.attribute_str("flavor").map(str::to_string),
            image: item.attribute_str("image").map(str::to_string),
            security_group: item.attribute_str("security_group").map(str::to_string),
            ip: item.attribute_str("ip").map(str::to_string),
            status,
        })
    }

    fn to_spec(&self) -> ResourceSpec {
        // the unnamed cluster only exists locally
        let cluster = self
            .cluster_name
            .as_deref()
            .filter(|c| !Cluster::is_unnamed_name(c))
            .map_or(Value::Null, |c| json!(c));
        ResourceSpec::new(
            ResourceKind::Instance,
            self.name.clone(),
            json!({
                "cluster": cluster,
                "network": self.network,
                "flavor": self.flavor,
                "image": self.image,
                "security_group": self.security_group,
            }),
        )
    }
}
