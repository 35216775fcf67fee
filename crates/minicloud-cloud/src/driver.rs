//! Drivers turn a cloud's connection settings into a remote context

use crate::context::RemoteContext;
use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Backend type of a cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudType {
    OpenStack,
    Stub,
}

impl fmt::Display for CloudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloudType::OpenStack => write!(f, "openstack"),
            CloudType::Stub => write!(f, "stub"),
        }
    }
}

impl FromStr for CloudType {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openstack" => Ok(CloudType::OpenStack),
            "stub" => Ok(CloudType::Stub),
            other => Err(CloudError::InvalidConfig(format!(
                "unknown cloud type '{}'",
                other
            ))),
        }
    }
}

/// Connection settings a driver needs to build a context
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub cloud_name: String,
    pub auth_url: String,
    pub tenant: String,
    pub username: String,
    pub password: String,
    pub user_domain_id: String,
    pub project_domain_id: String,
}

/// Factory for remote contexts of one cloud type
pub trait Driver: Send + Sync {
    fn cloud_type(&self) -> CloudType;

    /// Build an (unauthenticated) context for a cloud
    fn connect(&self, info: &ConnectionInfo) -> Result<Arc<dyn RemoteContext>>;
}

/// Drivers indexed by cloud type
#[derive(Default, Clone)]
pub struct DriverRegistry {
    drivers: HashMap<CloudType, Arc<dyn Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, driver: Arc<dyn Driver>) {
        tracing::debug!("Registered driver for {}", driver.cloud_type());
        self.drivers.insert(driver.cloud_type(), driver);
    }

    pub fn with_driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.register(driver);
        self
    }

    pub fn supports(&self, cloud_type: CloudType) -> bool {
        self.drivers.contains_key(&cloud_type)
    }

    /// Build a context for a cloud through the driver of its type
    pub fn connect(
        &self,
        cloud_type: CloudType,
        info: &ConnectionInfo,
    ) -> Result<Arc<dyn RemoteContext>> {
        let driver = self
            .drivers
            .get(&cloud_type)
            .ok_or_else(|| CloudError::DriverNotFound(cloud_type.to_string()))?;
        tracing::debug!("Connecting {} through {} driver", info.cloud_name, cloud_type);
        driver.connect(info)
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.drivers.keys().collect::<Vec<_>>())
            .finish()
    }
}
