//! Cloud manager
//!
//! Clouds are stored locally. Besides caching them, the manager owns the
//! remote sessions (one authenticated context per cloud) and the offline
//! cloud marker every eviction policy consults.

use super::ClusterManager;
use crate::cache::{CachedManager, ListOptions};
use crate::error::Result;
use crate::hierarchy::ManagerNode;
use crate::model::{Cloud, Cluster};
use crate::policy::{EvictionPolicy, OfflineCloudMarker, OfflineCloudState};
use crate::source::StoreSource;
use crate::store::Store;
use minicloud_cloud::{DriverRegistry, RemoteContext};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

type Sessions = HashMap<String, Arc<dyn RemoteContext>>;

pub struct CloudManager {
    inner: CachedManager<StoreSource<Cloud>>,
    offline: Arc<OfflineCloudMarker>,
    drivers: DriverRegistry,
    sessions: Mutex<Sessions>,
    clusters: OnceLock<Arc<ClusterManager>>,
}

impl CloudManager {
    pub fn new(
        store: Arc<dyn Store>,
        policy: EvictionPolicy,
        offline: Arc<OfflineCloudMarker>,
        drivers: DriverRegistry,
    ) -> Self {
        Self {
            inner: CachedManager::new(StoreSource::new(store), policy),
            offline,
            drivers,
            sessions: Mutex::new(HashMap::new()),
            clusters: OnceLock::new(),
        }
    }

    pub fn set_cluster_manager(&self, clusters: Arc<ClusterManager>) {
        self.inner.set_child_manager(clusters.clone());
        if self.clusters.set(clusters).is_err() {
            tracing::warn!("[Cloud mgr] cluster manager is already set");
        }
    }

    pub fn offline_marker(&self) -> &Arc<OfflineCloudMarker> {
        &self.offline
    }

    pub fn drivers(&self) -> &DriverRegistry {
        &self.drivers
    }

    fn sessions(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-derive the offline marker from a filled cache
    fn observe(&self) {
        if !self.inner.is_filled() {
            return;
        }
        match self.inner.list(ListOptions::cache_only()) {
            Ok(clouds) => {
                let state = clouds
                    .iter()
                    .find(|c| c.is_offline())
                    .map_or(OfflineCloudState::Absent, |c| {
                        OfflineCloudState::Present(c.name.clone())
                    });
                self.offline.set(state);
            }
            Err(e) => tracing::warn!("[Cloud mgr] could not check for offline clouds: {}", e),
        }
    }

    fn observed<T>(&self, result: Result<T>) -> Result<T> {
        self.observe();
        result
    }

    pub fn is_filled(&self) -> bool {
        self.inner.is_filled()
    }

    pub fn list(&self, options: ListOptions<'_>) -> Result<Vec<Cloud>> {
        let result = self.inner.list(options);
        self.observed(result)
    }

    pub fn list_all(&self) -> Result<Vec<Cloud>> {
        self.list(ListOptions::default())
    }

    pub fn count(&self) -> Result<usize> {
        let result = self.inner.count(None);
        self.observed(result)
    }

    pub fn get(&self, name: &str) -> Result<Option<Cloud>> {
        let result = self.inner.get(name);
        self.observed(result)
    }

    pub fn get_singleton_entity(&self) -> Result<Option<Cloud>> {
        let result = self.inner.get_singleton_entity();
        self.observed(result)
    }

    /// Add a cloud together with its unnamed cluster
    pub fn add(&self, cloud: Cloud) -> Result<Cloud> {
        let cloud = self.inner.add(cloud)?;
        self.observe();

        match self.clusters.get() {
            Some(clusters) => {
                clusters.add_unchecked(Cluster::unnamed(&cloud.name))?;
            }
            None => tracing::warn!(
                "[Cloud mgr] no cluster manager, {} gets no unnamed cluster",
                cloud.name
            ),
        }
        Ok(cloud)
    }

    pub fn update(&self, cloud: &Cloud, patch: &Value) -> Result<Option<Cloud>> {
        self.sessions().remove(&cloud.name);
        let result = self.inner.update(cloud, patch);
        self.observed(result)
    }

    pub fn remove(&self, cloud: &Cloud) -> Result<bool> {
        self.sessions().remove(&cloud.name);
        let result = self.inner.remove(cloud);
        self.observed(result)
    }

    pub fn undeclare(&self, cloud: &Cloud) -> Result<bool> {
        self.sessions().remove(&cloud.name);
        let result = self.inner.undeclare(cloud);
        self.observed(result)
    }

    /// Forget the cloud's clusters and their instances, then remove it
    pub fn deep_remove(&self, cloud: &Cloud) -> Result<bool> {
        Ok(self.inner.undeclare_children(&cloud.name)? && self.remove(cloud)?)
    }

    pub fn deep_undeclare(&self, cloud: &Cloud) -> Result<bool> {
        Ok(self.inner.undeclare_children(&cloud.name)? && self.undeclare(cloud)?)
    }

    /// True when any cluster of the cloud holds instances
    ///
    /// The unnamed cluster always exists, so clusters alone do not count.
    pub fn has_children(&self, name: &str) -> Result<bool> {
        let Some(clusters) = self.inner.child_manager() else {
            return Ok(false);
        };
        for cluster in clusters.child_names(name)? {
            if clusters.has_children(&cluster)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn get_children(&self, name: &str) -> Result<Vec<String>> {
        self.inner.get_children(name)
    }

    pub fn clear_cache(&self) {
        self.inner.clear_cache();
    }

    pub fn reset(&self) {
        self.inner.reset();
    }

    pub fn clear(&self, cleanup: bool) -> Result<usize> {
        let result = self.inner.clear(cleanup);
        if cleanup {
            self.sessions().clear();
        }
        self.observed(result)
    }

    /// Context of a cloud, connected and authenticated on first use
    pub fn context(&self, cloud: &Cloud) -> Result<Arc<dyn RemoteContext>> {
        let mut sessions = self.sessions();
        if let Some(context) = sessions.get(&cloud.name) {
            return Ok(context.clone());
        }

        let context = self
            .drivers
            .connect(cloud.cloud_type, &cloud.connection_info())?;
        match context.authenticate() {
            Ok(status) if status.authenticated => {
                tracing::info!(
                    "[Cloud mgr] authenticated to {} ({})",
                    cloud.name,
                    status.account_info.unwrap_or_default()
                );
            }
            Ok(status) => tracing::warn!(
                "[Cloud mgr] authentication to {} failed: {}",
                cloud.name,
                status.error.unwrap_or_default()
            ),
            Err(e) => tracing::warn!("[Cloud mgr] authentication to {} failed: {}", cloud.name, e),
        }

        sessions.insert(cloud.name.clone(), context.clone());
        Ok(context)
    }

    pub fn is_authenticated(&self, cloud: &Cloud) -> bool {
        match self.context(cloud) {
            Ok(context) => context.authenticated(),
            Err(e) => {
                tracing::warn!("[Cloud mgr] no context for {}: {}", cloud.name, e);
                false
            }
        }
    }
}

impl ManagerNode for CloudManager {
    fn entity_name(&self) -> &'static str {
        self.inner.entity_name()
    }

    fn child_manager(&self) -> Option<Arc<dyn ManagerNode>> {
        self.inner.child_manager()
    }

    fn count_of(&self, _parent: &str) -> Result<usize> {
        Ok(0)
    }

    fn child_names(&self, _parent: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn has_children(&self, name: &str) -> Result<bool> {
        CloudManager::has_children(self, name)
    }

    fn deep_undeclare_named(&self, name: &str) -> Result<bool> {
        match self.inner.list(ListOptions::cache_only().named(name))?.pop() {
            Some(cloud) => self.deep_undeclare(&cloud),
            None => Ok(true),
        }
    }

    fn reset(&self) {
        CloudManager::reset(self)
    }

    fn clear(&self, cleanup: bool) -> Result<usize> {
        CloudManager::clear(self, cleanup)
    }
}
