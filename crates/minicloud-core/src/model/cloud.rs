use crate::entity::Entity;
use minicloud_cloud::{CloudType, ConnectionInfo};
use serde::{Deserialize, Serialize};

/// A configured tenant on a backend deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub name: String,
    #[serde(rename = "type")]
    pub cloud_type: CloudType,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub auth_url: String,
    #[serde(default)]
    pub tenant: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub user_domain_id: String,
    #[serde(default)]
    pub project_domain_id: String,
}

impl Cloud {
    /// An offline cloud backed by the stub driver
    pub fn stub(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cloud_type: CloudType::Stub,
            version: String::new(),
            location: "localhost".to_string(),
            auth_url: String::new(),
            tenant: String::new(),
            username: String::new(),
            password: String::new(),
            user_domain_id: String::new(),
            project_domain_id: String::new(),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.cloud_type == CloudType::Stub
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            cloud_name: self.name.clone(),
            auth_url: self.auth_url.clone(),
            tenant: self.tenant.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            user_domain_id: self.user_domain_id.clone(),
            project_domain_id: self.project_domain_id.clone(),
        }
    }

    /// Multi-line rendering with every setting except the password
    pub fn details(&self) -> String {
        let pad = " ".repeat(self.name.len());
        format!(
            "Cloud: {} [Type:{}\n       {}  Version:{}\n       {}  Location:{}\n       {}  Path:{}\n       {}  Tenant:{}\n       {}  Username:{}]",
            self.name,
            self.cloud_type,
            pad,
            self.version,
            pad,
            self.location,
            pad,
            self.auth_url,
            pad,
            self.tenant,
            pad,
            self.username
        )
    }
}

impl Entity for Cloud {
    const KIND: &'static str = "cloud";

    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self) -> String {
        format!("Cloud: {} ({})", self.name, self.location)
    }
}
