//! Cache eviction policy
//!
//! Whether a manager may drop its cache depends on two separately tracked
//! inputs: the persistence of the backing store, and the presence of an
//! offline cloud. Either one alone makes the cache permanent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What is known about offline clouds in the system
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OfflineCloudState {
    /// Clouds were not listed yet
    #[default]
    Unknown,
    Absent,
    /// Name of the first offline cloud
    Present(String),
}

/// Offline cloud knowledge, owned by the cloud manager and shared read-only
/// with every policy
#[derive(Debug, Default)]
pub struct OfflineCloudMarker {
    state: Mutex<OfflineCloudState>,
}

impl OfflineCloudMarker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, OfflineCloudState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> OfflineCloudState {
        self.lock().clone()
    }

    pub fn set(&self, state: OfflineCloudState) {
        let mut current = self.lock();
        if *current != state {
            tracing::debug!("[OfflineCloudMarker] {:?} -> {:?}", *current, state);
            *current = state;
        }
    }

    /// Unknown counts as absent
    pub fn is_present(&self) -> bool {
        matches!(*self.lock(), OfflineCloudState::Present(_))
    }
}

#[derive(Debug, Clone)]
pub struct EvictionPolicy {
    persistent_store: bool,
    offline_clouds: Option<Arc<OfflineCloudMarker>>,
    trust_filled_cache: bool,
}

impl EvictionPolicy {
    pub fn new(persistent_store: bool) -> Self {
        Self {
            persistent_store,
            offline_clouds: None,
            trust_filled_cache: false,
        }
    }

    /// A policy that lets the cache be cleared and refreshed freely
    pub fn evicting() -> Self {
        Self::new(true)
    }

    /// A policy that keeps the cache forever
    pub fn never_evicting() -> Self {
        Self::new(false)
    }

    pub fn with_offline_marker(mut self, marker: Arc<OfflineCloudMarker>) -> Self {
        self.offline_clouds = Some(marker);
        self
    }

    /// Answer deep listings from a filled cache, without making it permanent
    pub fn trusting_filled_cache(mut self) -> Self {
        self.trust_filled_cache = true;
        self
    }

    pub fn without_persistence(&self) -> bool {
        !self.persistent_store
    }

    pub fn offline_cloud_present(&self) -> bool {
        self.offline_clouds
            .as_ref()
            .is_some_and(|marker| marker.is_present())
    }

    /// The cache is never cleared and deep listings never bypass it
    pub fn never_evict(&self) -> bool {
        self.without_persistence() || self.offline_cloud_present()
    }

    pub fn trusts_filled_cache(&self) -> bool {
        self.trust_filled_cache || self.never_evict()
    }
}
