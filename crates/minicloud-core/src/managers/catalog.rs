//! Flavors and images are catalog data: read-only and stable, so their
//! managers answer deep listings from a filled cache.

use super::{FlavorManager, ImageManager};
use crate::cache::CachedManager;
use crate::policy::EvictionPolicy;
use crate::remote::{ContextResolver, RemoteSource};
use std::sync::Arc;

pub fn flavor_manager(resolver: Arc<ContextResolver>, policy: EvictionPolicy) -> FlavorManager {
    CachedManager::new(RemoteSource::new(resolver), policy.trusting_filled_cache())
}

pub fn image_manager(resolver: Arc<ContextResolver>, policy: EvictionPolicy) -> ImageManager {
    CachedManager::new(RemoteSource::new(resolver), policy.trusting_filled_cache())
}
