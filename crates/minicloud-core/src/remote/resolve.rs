//! Picking the remote context that serves an entity

use super::RemoteResource;
use crate::error::{MiniCloudError, Result};
use crate::managers::{CloudManager, ClusterManager};
use minicloud_cloud::RemoteContext;
use std::sync::{Arc, OnceLock, Weak};

/// How an entity's cloud was determined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The entity is bound to a cloud
    Direct(String),
    /// The entity's cluster belongs to a cloud
    ViaParent { cluster: String, cloud: String },
    /// The system has exactly one cloud
    Singleton(String),
}

impl Resolution {
    pub fn cloud(&self) -> &str {
        match self {
            Resolution::Direct(cloud)
            | Resolution::ViaParent { cloud, .. }
            | Resolution::Singleton(cloud) => cloud,
        }
    }
}

/// Resolves entities to clouds and clouds to authenticated contexts
///
/// Holds weak links up to the cloud and cluster managers; those managers own
/// the remote managers through their child links.
#[derive(Default)]
pub struct ContextResolver {
    clouds: OnceLock<Weak<CloudManager>>,
    clusters: OnceLock<Weak<ClusterManager>>,
}

impl ContextResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, clouds: &Arc<CloudManager>, clusters: &Arc<ClusterManager>) {
        if self.clouds.set(Arc::downgrade(clouds)).is_err()
            || self.clusters.set(Arc::downgrade(clusters)).is_err()
        {
            tracing::warn!("[ContextResolver] already bound");
        }
    }

    pub fn cloud_manager(&self) -> Result<Arc<CloudManager>> {
        self.clouds
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| MiniCloudError::integrity("cloud manager is not available"))
    }

    pub fn cluster_manager(&self) -> Result<Arc<ClusterManager>> {
        self.clusters
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| MiniCloudError::integrity("cluster manager is not available"))
    }

    /// Own cloud first, then the cluster's cloud, then the only cloud
    pub fn resolve<E: RemoteResource>(&self, entity: &E) -> Result<Resolution> {
        if let Some(cloud) = entity.cloud_name() {
            return Ok(Resolution::Direct(cloud.to_string()));
        }

        if let Some(cluster_name) = entity.cluster_name() {
            match self.cluster_manager()?.get(cluster_name)? {
                Some(cluster) => {
                    return Ok(Resolution::ViaParent {
                        cluster: cluster.name,
                        cloud: cluster.cloud_name,
                    });
                }
                None => tracing::debug!(
                    "[ContextResolver] cluster {} of {} is unknown",
                    cluster_name,
                    entity.name()
                ),
            }
        }

        match self.cloud_manager()?.get_singleton_entity()? {
            Some(cloud) => Ok(Resolution::Singleton(cloud.name)),
            None => {
                tracing::error!(
                    "[ContextResolver] No driver context can be selected for {}.",
                    entity.name()
                );
                Err(MiniCloudError::integrity(format!(
                    "no cloud can be selected for {} {}",
                    E::KIND,
                    entity.name()
                )))
            }
        }
    }

    /// Authenticated context of the resolved cloud
    pub fn context(&self, resolution: &Resolution) -> Result<Arc<dyn RemoteContext>> {
        let clouds = self.cloud_manager()?;
        let name = resolution.cloud();
        let cloud = clouds
            .get(name)?
            .ok_or_else(|| MiniCloudError::integrity(format!("cloud {} does not exist", name)))?;

        let context = clouds.context(&cloud)?;
        if !context.authenticated() {
            return Err(MiniCloudError::NotAuthorized(format!(
                "cloud {} is not authenticated",
                name
            )));
        }
        Ok(context)
    }
}
