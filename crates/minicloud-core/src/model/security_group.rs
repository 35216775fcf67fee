use crate::entity::{Entity, sort_by_class};
use crate::remote::RemoteResource;
use minicloud_cloud::{RemoteItem, ResourceKind, ResourceSpec};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const PUBLIC_SSH: &str = "public_ssh";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    pub protocol: String,
    pub port_min: u16,
    pub port_max: u16,
    pub direction: String,
    pub cidr: String,
}

impl SecurityGroupRule {
    pub fn ingress(protocol: &str, port: u16, cidr: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            port_min: port,
            port_max: port,
            direction: "ingress".to_string(),
            cidr: cidr.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityGroup {
    pub name: String,
    pub id: Option<String>,
    pub cloud: Option<String>,
    pub description: String,
    pub rules: Vec<SecurityGroupRule>,
}

impl SecurityGroup {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_rule(mut self, rule: SecurityGroupRule) -> Self {
        self.rules.push(rule);
        self
    }
}

impl Entity for SecurityGroup {
    const KIND: &'static str = "security_group";

    fn name(&self) -> &str {
        &self.name
    }

    /// ssh groups first
    fn sort(entities: &mut [Self]) {
        let classes: [fn(&str) -> bool; 1] = [|n| n.to_lowercase().contains(PUBLIC_SSH)];
        sort_by_class(entities, &classes);
    }
}

impl RemoteResource for SecurityGroup {
    const RESOURCE: ResourceKind = ResourceKind::SecurityGroup;

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
            description: item
                .attribute_str("description")
                .unwrap_or_default()
                .to_string(),
            rules: item.get_attribute("rules").unwrap_or_default(),
        })
    }

    fn to_spec(&self) -> ResourceSpec {
        ResourceSpec::new(
            ResourceKind::SecurityGroup,
            self.name.clone(),
            json!({
                "description": self.description,
                "rules": self.rules,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssh_groups_sort_first() {
        let mut groups = vec![
            SecurityGroup::new("default", ""),
            SecurityGroup::new("web", ""),
            SecurityGroup::new("Public_SSH", ""),
            SecurityGroup::new("admin", ""),
        ];
        SecurityGroup::sort(&mut groups);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Public_SSH", "admin", "default", "web"]);
    }
}
