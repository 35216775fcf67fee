//! The MiniCloud system: every manager, wired together
//!
//! ```text
//!   CloudManager ──► ClusterManager ──► InstanceManager
//!        ▲                 ▲                  │
//!        └──── ContextResolver (weak) ◄───────┘  (and every remote manager)
//! ```

use crate::cache::CachedManager;
use crate::error::{MiniCloudError, Result};
use crate::managers::{
    CloudManager, ClusterManager, FlavorManager, ImageManager, InstanceManager, NetworkManager,
    RouterManager, SecurityGroupManager, flavor_manager, image_manager,
};
use crate::model::{Cloud, Cluster};
use crate::policy::{EvictionPolicy, OfflineCloudMarker};
use crate::remote::{ContextResolver, RemoteSource};
use crate::source::StoreSource;
use crate::store::Database;
use crate::topology::{
    self, CloudLevel, ClusterLevel, RouterLevel, SystemTopologyOptions, Topology, TopologyNode,
};
use minicloud_cloud::DriverRegistry;
use std::sync::Arc;

pub struct MiniCloud {
    database: Database,
    resolver: Arc<ContextResolver>,
    clouds: Arc<CloudManager>,
    clusters: Arc<ClusterManager>,
    instances: Arc<InstanceManager>,
    networks: Arc<NetworkManager>,
    routers: Arc<RouterManager>,
    security_groups: Arc<SecurityGroupManager>,
    flavors: Arc<FlavorManager>,
    images: Arc<ImageManager>,
}

impl MiniCloud {
    /// Build the managers on a database and list the clouds once
    pub fn open(database: Database, drivers: DriverRegistry) -> Result<Self> {
        let marker = Arc::new(OfflineCloudMarker::new());
        let policy =
            EvictionPolicy::new(database.is_persistent()).with_offline_marker(marker.clone());
        let resolver = Arc::new(ContextResolver::new());

        let instances: Arc<InstanceManager> = Arc::new(CachedManager::new(
            RemoteSource::new(resolver.clone()),
            policy.clone(),
        ));
        let clusters: Arc<ClusterManager> = Arc::new(CachedManager::new(
            StoreSource::new(database.clusters()),
            policy.clone(),
        ));
        clusters.set_child_manager(instances.clone());

        let clouds = Arc::new(CloudManager::new(
            database.clouds(),
            policy.clone(),
            marker,
            drivers,
        ));
        clouds.set_cluster_manager(clusters.clone());
        resolver.bind(&clouds, &clusters);

        let system = Self {
            networks: Arc::new(CachedManager::new(
                RemoteSource::new(resolver.clone()),
                policy.clone(),
            )),
            routers: Arc::new(CachedManager::new(
                RemoteSource::new(resolver.clone()),
                policy.clone(),
            )),
            security_groups: Arc::new(CachedManager::new(
                RemoteSource::new(resolver.clone()),
                policy.clone(),
            )),
            flavors: Arc::new(flavor_manager(resolver.clone(), policy.clone())),
            images: Arc::new(image_manager(resolver.clone(), policy)),
            database,
            resolver,
            clouds,
            clusters,
            instances,
        };

        let count = system.clouds.count()?;
        tracing::info!(
            "[MiniCloud] opened with {} cloud(s), offline cloud present: {}",
            count,
            system.clouds.offline_marker().is_present()
        );
        Ok(system)
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn resolver(&self) -> &Arc<ContextResolver> {
        &self.resolver
    }

    pub fn clouds(&self) -> &CloudManager {
        &self.clouds
    }

    pub fn clusters(&self) -> &ClusterManager {
        &self.clusters
    }

    pub fn instances(&self) -> &InstanceManager {
        &self.instances
    }

    pub fn networks(&self) -> &NetworkManager {
        &self.networks
    }

    pub fn routers(&self) -> &RouterManager {
        &self.routers
    }

    pub fn security_groups(&self) -> &SecurityGroupManager {
        &self.security_groups
    }

    pub fn flavors(&self) -> &FlavorManager {
        &self.flavors
    }

    pub fn images(&self) -> &ImageManager {
        &self.images
    }

    /// The cloud of a system with a single cloud
    pub fn get_cloud(&self) -> Result<Option<Cloud>> {
        let clouds = self.clouds.list_all()?;
        if clouds.len() > 1 {
            return Err(MiniCloudError::integrity(
                "more than one cloud is provisioned, name the cloud",
            ));
        }
        Ok(clouds.into_iter().next())
    }

    /// Add a cluster to an existing cloud
    pub fn add_cluster(&self, name: &str, cloud: &str) -> Result<Cluster> {
        if self.clouds.get(cloud)?.is_none() {
            return Err(MiniCloudError::integrity(format!(
                "cloud {} does not exist",
                cloud
            )));
        }
        self.clusters.add_cluster(Cluster::new(name, cloud))
    }

    /// Remove (`cleanup`) or forget the deployment, and with
    /// `delete_clouds` the clusters and clouds too
    pub fn clear(&self, cleanup: bool, delete_clouds: bool) -> Result<usize> {
        let mut dropped = 0;

        // remote managers cannot list without a cloud
        if self.clouds.count()? > 0 {
            dropped += self.instances.clear(cleanup)?;
            dropped += self.networks.clear(cleanup)?;
            dropped += self.routers.clear(cleanup)?;
            dropped += self.security_groups.clear(cleanup)?;
        }
        if delete_clouds {
            dropped += self.clusters.clear(cleanup)?;
            dropped += self.clouds.clear(cleanup)?;
        }

        tracing::info!(
            "[MiniCloud] cleared {} entities (cleanup: {}, clouds: {})",
            dropped,
            cleanup,
            delete_clouds
        );
        Ok(dropped)
    }

    /// Drop every cache the policy allows to drop
    pub fn reset(&self) {
        self.instances.reset();
        self.security_groups.reset();
        self.routers.reset();
        self.networks.reset();
        self.images.reset();
        self.flavors.reset();
        self.clusters.reset();
        self.clouds.reset();
    }

    /// Compute tree: clouds, clusters, instances
    pub fn compute_level(&self, show_unnamed: bool) -> CloudLevel<'_> {
        CloudLevel::new(
            &self.clouds,
            ClusterLevel::new(&self.clusters, &self.instances).showing_unnamed(show_unnamed),
        )
    }

    /// Networking tree: routers, networks
    pub fn networking_level(&self) -> RouterLevel<'_> {
        RouterLevel::new(&self.routers, &self.networks)
    }

    pub fn topology(
        &self,
        level: &dyn TopologyNode,
        options: topology::TopologyOptions,
    ) -> Result<Topology> {
        topology::render(level, options, "")
    }

    /// One cluster and its instances
    pub fn cluster_topology(
        &self,
        name: &str,
        options: topology::TopologyOptions,
    ) -> Result<Topology> {
        let cluster = self
            .clusters
            .get(name)?
            .ok_or_else(|| MiniCloudError::DoesNotExist(format!("cluster '{}'", name)))?;
        let level = ClusterLevel::new(&self.clusters, &self.instances);
        topology::render_entity(&level, &topology::Node::of(&cluster), options, "")
    }

    /// Compute and networking of the whole system
    pub fn system_topology(&self, options: SystemTopologyOptions) -> Result<Topology> {
        if self.clouds.count()? == 0 {
            return Ok(Topology::default());
        }
        let name = match self.get_cloud() {
            Ok(Some(cloud)) => cloud.name,
            _ => "MiniCloud".to_string(),
        };
        let compute = self.compute_level(options.show_unnamed_clusters);
        let networking = self.networking_level();
        topology::render_system(&name, &compute, &networking, options, "")
    }
}
