use crate::entity::Entity;
use crate::remote::RemoteResource;
use minicloud_cloud::{RemoteItem, ResourceKind, ResourceSpec};
use serde_json::json;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    pub name: String,
    pub id: Option<String>,
    pub cloud: Option<String>,
    pub cidrs: Vec<String>,
    pub external: bool,
    /// Router the network is attached to
    pub router: Option<String>,
}

impl Network {
    pub fn new(name: impl Into<String>, cidrs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            cidrs,
            ..Default::default()
        }
    }

    pub fn attached_to(mut self, router: impl Into<String>) -> Self {
        self.router = Some(router.into());
        self
    }

    /// Rough validation of an IPv4 or IPv6 cidr
    pub fn check_cidr(cidr: &str) -> bool {
        let Some((net, prefix)) = cidr.split_once('/') else {
            return false;
        };
        let Ok(prefix) = prefix.parse::<u8>() else {
            return false;
        };
        if net.contains('.') {
            (1..=32).contains(&prefix)
        } else if net.contains(':') {
            (1..=64).contains(&prefix)
        } else {
            false
        }
    }
}

impl Entity for Network {
    const KIND: &'static str = "network";

    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        let mut label = format!("Network: {} ", self.name);
        if self.external {
            label.push_str("(external) ");
        }
        if !self.cidrs.is_empty() {
            label.push_str(&format!("[{}]", self.cidrs.join(", ")));
        }
        label.trim_end().to_string()
    }
}

impl RemoteResource for Network {
    const RESOURCE: ResourceKind = ResourceKind::Network;

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
            cidrs: item.get_attribute("cidrs").unwrap_or_default(),
            external: item.get_attribute("external").unwrap_or(false),
            router: item.attribute_str("router").map(str::to_string),
        })
    }

    fn to_spec(&self) -> ResourceSpec {
        ResourceSpec::new(
            ResourceKind::Network,
            self.name.clone(),
            json!({
                "cidrs": self.cidrs,
                "external": self.external,
                "router": self.router,
            }),
        )
    }

    fn deletable(&self) -> bool {
        !self.external
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_cidr() {
        assert!(Network::check_cidr("10.0.0.0/24"));
        assert!(Network::check_cidr("fd00::/48"));
        assert!(!Network::check_cidr("10.0.0.0"));
        assert!(!Network::check_cidr("10.0.0.0/33"));
        assert!(!Network::check_cidr("fd00::/96"));
        assert!(!Network::check_cidr("net/8"));
    }

    #[test]
    fn test_describe() {
        let mut net = Network::new("public", vec!["172.24.4.0/24".into()]);
        net.external = true;
        assert_eq!(net.describe(), "Network: public (external) [172.24.4.0/24]");
        assert_eq!(Network::new("bare", vec![]).describe(), "Network: bare");
    }
}
