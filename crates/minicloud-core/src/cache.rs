//! Cached entity manager
//!
//! [`CachedManager`] mirrors the entities of one [`Source`] in a map keyed by
//! name. The cache is *filled* once a full listing of the source has been
//! merged into it; from then on lookups that miss the cache are answered
//! with "absent" instead of asking the source.
//!
//! ```text
//!   list(deep) ──► filled && !deep? ──yes──► cache
//!                        │no
//!                        ▼
//!                  full sync ──► Source::list_entities ──► cache (filled)
//! ```
//!
//! Whether a deep listing may bypass a filled cache, and whether the cache
//! may be dropped at all, is decided by the manager's [`EvictionPolicy`].

use crate::entity::{Entity, title};
use crate::error::{MiniCloudError, Result};
use crate::hierarchy::ManagerNode;
use crate::policy::EvictionPolicy;
use crate::source::{ListQuery, Source};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Options of a listing
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions<'a> {
    /// Refresh from the source even when the cache is filled
    pub deep: bool,
    /// Never touch the source
    pub cache_only: bool,
    /// Answer a deep listing from a filled cache
    pub trust_cache_when_filled: bool,
    pub name: Option<&'a str>,
    pub parent: Option<&'a str>,
}

impl<'a> ListOptions<'a> {
    pub fn deep() -> Self {
        Self {
            deep: true,
            ..Self::default()
        }
    }

    pub fn cache_only() -> Self {
        Self {
            cache_only: true,
            ..Self::default()
        }
    }

    pub fn with_deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn trusting_cache(mut self) -> Self {
        self.trust_cache_when_filled = true;
        self
    }

    pub fn named(mut self, name: &'a str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn children_of(mut self, parent: &'a str) -> Self {
        self.parent = Some(parent);
        self
    }
}

struct CacheState<E> {
    entries: HashMap<String, E>,
    filled: bool,
}

impl<E> CacheState<E> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            filled: false,
        }
    }
}

pub struct CachedManager<S: Source> {
    source: S,
    policy: EvictionPolicy,
    label: String,
    state: Mutex<CacheState<S::Entity>>,
    child: OnceLock<Arc<dyn ManagerNode>>,
}

impl<S: Source> CachedManager<S> {
    pub fn new(source: S, policy: EvictionPolicy) -> Self {
        Self {
            source,
            policy,
            label: format!("{} mgr", title(S::Entity::KIND)),
            state: Mutex::new(CacheState::new()),
            child: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> &EvictionPolicy {
        &self.policy
    }

    pub fn entity_name(&self) -> &'static str {
        S::Entity::KIND
    }

    /// Link the manager of the child entities; a manager has at most one
    pub fn set_child_manager(&self, child: Arc<dyn ManagerNode>) {
        let kind = child.entity_name();
        if self.child.set(child).is_err() {
            tracing::warn!("[{}] child manager is already set, ignoring {}", self.label, kind);
        }
    }

    pub fn child_manager(&self) -> Option<Arc<dyn ManagerNode>> {
        self.child.get().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<S::Entity>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_filled(&self) -> bool {
        self.lock().filled
    }

    /// Sorted listing
    pub fn list(&self, options: ListOptions<'_>) -> Result<Vec<S::Entity>> {
        let mut entities = self.unsorted_list(options)?;
        S::Entity::sort(&mut entities);
        Ok(entities)
    }

    pub fn list_all(&self) -> Result<Vec<S::Entity>> {
        self.list(ListOptions::default())
    }

    pub fn unsorted_list(&self, options: ListOptions<'_>) -> Result<Vec<S::Entity>> {
        let mut state = self.lock();
        let deep = options.deep
            && !(state.filled
                && (options.trust_cache_when_filled || self.policy.trusts_filled_cache()));

        if options.cache_only || (state.filled && !deep) {
            tracing::trace!("[{}] listing from cache", self.label);
        } else {
            tracing::debug!(
                "[{}] list() is executing {} fetch",
                self.label,
                if deep { "a deep" } else { "an initial" }
            );
            self.full_sync_locked(&mut state, deep, None)?;
        }

        let mut entities: Vec<S::Entity> = state
            .entries
            .values()
            .filter(|e| options.name.is_none_or(|n| e.name() == n))
            .filter(|e| options.parent.is_none_or(|p| e.is_child_of(p)))
            .cloned()
            .collect();
        // deterministic order for callers that skip sorting
        entities.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(entities)
    }

    /// Entities matching a predicate
    pub fn filtered(
        &self,
        deep: bool,
        predicate: impl Fn(&S::Entity) -> bool,
    ) -> Result<Vec<S::Entity>> {
        Ok(self
            .list(ListOptions::default().with_deep(deep))?
            .into_iter()
            .filter(|e| predicate(e))
            .collect())
    }

    pub fn count(&self, parent: Option<&str>) -> Result<usize> {
        let options = ListOptions {
            parent,
            ..ListOptions::default()
        };
        Ok(self.unsorted_list(options)?.len())
    }

    pub fn get(&self, name: &str) -> Result<Option<S::Entity>> {
        self.cached_get(name, false)
    }

    /// Look an entity up, asking the source on a miss of an unfilled cache
    /// or always when `override_cache` is set
    pub fn cached_get(&self, name: &str, override_cache: bool) -> Result<Option<S::Entity>> {
        let mut state = self.lock();
        self.cached_get_locked(&mut state, name, override_cache)
    }

    fn cached_get_locked(
        &self,
        state: &mut CacheState<S::Entity>,
        name: &str,
        override_cache: bool,
    ) -> Result<Option<S::Entity>> {
        if !override_cache {
            if let Some(entity) = state.entries.get(name) {
                tracing::trace!("[{}] cache hit for {}", self.label, name);
                return Ok(Some(entity.clone()));
            }
            if state.filled {
                tracing::debug!("[{}] {} is not in the filled cache", self.label, name);
                return Ok(None);
            }
        }

        tracing::debug!("[{}] fetching {} from source", self.label, name);
        match self.source.fetch_entity(name)? {
            Some(entity) => {
                tracing::debug!(
                    "[{}] {} found and {}",
                    self.label,
                    name,
                    if override_cache { "refreshed" } else { "cached" }
                );
                state.entries.insert(name.to_string(), entity.clone());
                Ok(Some(entity))
            }
            None => {
                if override_cache && state.entries.remove(name).is_some() {
                    tracing::debug!("[{}] dropped stale entry {}", self.label, name);
                }
                tracing::debug!("[{}] {} not found, filling up cache", self.label, name);
                self.full_sync_locked(state, false, None)?;
                Ok(None)
            }
        }
    }

    pub fn add(&self, entity: S::Entity) -> Result<S::Entity> {
        self.add_entity(entity, false)
    }

    /// Add without checking for an existing entity of the same name
    pub fn add_unchecked(&self, entity: S::Entity) -> Result<S::Entity> {
        self.add_entity(entity, true)
    }

    fn add_entity(&self, entity: S::Entity, skip_check: bool) -> Result<S::Entity> {
        let name = entity.name().to_string();
        if name.is_empty() {
            tracing::error!("[{}] Can't give empty name.", self.label);
            return Err(MiniCloudError::integrity(format!(
                "{} name must not be empty",
                S::Entity::KIND
            )));
        }

        let mut state = self.lock();
        if !skip_check && self.cached_get_locked(&mut state, &name, false)?.is_some() {
            tracing::error!("[{}] Name {} already exists.", self.label, name);
            return Err(MiniCloudError::integrity(format!(
                "{} {} already exists",
                S::Entity::KIND,
                name
            )));
        }

        let created = self.source.create_entity(entity)?;
        state.entries.insert(name.clone(), created.clone());
        tracing::info!("[{}] added {}", self.label, name);

        // fills an unfilled cache; the source may not list the new entity yet
        if let Err(e) = self.full_sync_locked(&mut state, false, Some(&name)) {
            tracing::warn!("[{}] could not merge listing after adding {}: {}", self.label, name, e);
        }
        Ok(created)
    }

    /// Apply a patch; returns the entity as the cache holds it afterwards
    pub fn update(&self, entity: &S::Entity, patch: &Value) -> Result<Option<S::Entity>> {
        let mut state = self.lock();
        let updated = self.source.update_entity(entity, patch)?;
        tracing::info!("[{}] updated {}", self.label, entity.name());

        if self.policy.never_evict() {
            state
                .entries
                .insert(updated.name().to_string(), updated.clone());
            Ok(Some(updated))
        } else {
            self.cached_get_locked(&mut state, entity.name(), true)
        }
    }

    /// Tear the entity down at the source and forget it; false when the
    /// source refused
    pub fn remove(&self, entity: &S::Entity) -> Result<bool> {
        self.boolean_remove(entity, true)
    }

    /// Forget the entity; stored sources also drop their record
    pub fn undeclare(&self, entity: &S::Entity) -> Result<bool> {
        self.boolean_remove(entity, self.source.undeclare_is_remove())
    }

    fn boolean_remove(&self, entity: &S::Entity, cleanup: bool) -> Result<bool> {
        let mut state = self.lock();
        let removed = if cleanup {
            self.source.remove_entity(entity)?
        } else {
            true
        };

        if !removed {
            tracing::warn!("[{}] {} was not removed", self.label, entity.name());
        }
        if state.entries.remove(entity.name()).is_some() {
            tracing::debug!("[{}] forgot {}", self.label, entity.name());
        }
        Ok(removed)
    }

    /// Undeclare all descendants, then remove the entity
    pub fn deep_remove(&self, entity: &S::Entity) -> Result<bool> {
        Ok(self.undeclare_children(entity.name())? && self.remove(entity)?)
    }

    /// Undeclare all descendants, then the entity
    pub fn deep_undeclare(&self, entity: &S::Entity) -> Result<bool> {
        Ok(self.undeclare_children(entity.name())? && self.undeclare(entity)?)
    }

    /// Undeclare every descendant of the named entity
    pub fn undeclare_children(&self, name: &str) -> Result<bool> {
        let Some(child) = self.child_manager() else {
            return Ok(true);
        };
        for child_name in child.child_names(name)? {
            if !child.deep_undeclare_named(&child_name)? {
                tracing::warn!(
                    "[{}] could not undeclare {} {} of {}",
                    self.label,
                    child.entity_name(),
                    child_name,
                    name
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn has_children(&self, name: &str) -> Result<bool> {
        match self.child_manager() {
            Some(child) => Ok(child.count_of(name)? > 0),
            None => Ok(false),
        }
    }

    pub fn get_children(&self, name: &str) -> Result<Vec<String>> {
        match self.child_manager() {
            Some(child) => child.child_names(name),
            None => Ok(Vec::new()),
        }
    }

    /// Re-read the source; returns whether a listing happened
    pub fn full_sync(&self, deep: bool) -> Result<bool> {
        let mut state = self.lock();
        self.full_sync_locked(&mut state, deep, None)
    }

    fn full_sync_locked(
        &self,
        state: &mut CacheState<S::Entity>,
        deep: bool,
        exclude: Option<&str>,
    ) -> Result<bool> {
        if !deep && state.filled {
            tracing::trace!("[{}] full sync is a no-op", self.label);
            return Ok(false);
        }

        if exclude.is_none() {
            if state.filled {
                self.clear_cache_locked(state);
            } else {
                // drop entries of a cache that was never complete
                state.entries.clear();
            }
        }

        let query = ListQuery {
            exclude,
            deep,
            ..ListQuery::all()
        };
        let entities = self.source.list_entities(&query)?;
        for entity in entities {
            state.entries.insert(entity.name().to_string(), entity);
        }
        state.filled = true;
        tracing::debug!(
            "[{}] cache filled with {} entries",
            self.label,
            state.entries.len()
        );
        Ok(true)
    }

    /// Drop the cache unless the policy keeps it forever
    pub fn clear_cache(&self) {
        let mut state = self.lock();
        self.clear_cache_locked(&mut state);
    }

    fn clear_cache_locked(&self, state: &mut CacheState<S::Entity>) {
        if self.policy.never_evict() {
            tracing::trace!("[{}] cache is never evicted", self.label);
            return;
        }
        state.entries.clear();
        state.filled = false;
        tracing::debug!("[{}] cache cleared", self.label);
    }

    pub fn reset(&self) {
        self.clear_cache();
    }

    /// Remove (`cleanup`) or forget every entity; returns how many went
    pub fn clear(&self, cleanup: bool) -> Result<usize> {
        let options = ListOptions {
            cache_only: !cleanup,
            ..ListOptions::default()
        };
        let mut dropped = 0;
        for entity in self.list(options)? {
            if self.boolean_remove(&entity, cleanup)? {
                dropped += 1;
            }
        }
        tracing::info!("[{}] cleared {} entities", self.label, dropped);
        Ok(dropped)
    }

    /// The only entity, when there is exactly one
    pub fn get_singleton_entity(&self) -> Result<Option<S::Entity>> {
        let mut entities = self.unsorted_list(ListOptions::default())?;
        if entities.len() == 1 {
            Ok(entities.pop())
        } else {
            Ok(None)
        }
    }
}

impl<S: Source> ManagerNode for CachedManager<S> {
    fn entity_name(&self) -> &'static str {
        S::Entity::KIND
    }

    fn child_manager(&self) -> Option<Arc<dyn ManagerNode>> {
        self.child.get().cloned()
    }

    fn count_of(&self, parent: &str) -> Result<usize> {
        self.count(Some(parent))
    }

    fn child_names(&self, parent: &str) -> Result<Vec<String>> {
        Ok(self
            .unsorted_list(ListOptions::default().children_of(parent))?
            .into_iter()
            .map(|e| e.name().to_string())
            .collect())
    }

    fn has_children(&self, name: &str) -> Result<bool> {
        CachedManager::has_children(self, name)
    }

    fn deep_undeclare_named(&self, name: &str) -> Result<bool> {
        let cached = self.lock().entries.get(name).cloned();
        match cached {
            Some(entity) => self.deep_undeclare(&entity),
            None => Ok(true),
        }
    }

    fn reset(&self) {
        CachedManager::reset(self)
    }

    fn clear(&self, cleanup: bool) -> Result<usize> {
        CachedManager::clear(self, cleanup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cluster;
    use crate::testing::ScriptedSource;
    use serde_json::json;

    fn manager(policy: EvictionPolicy) -> CachedManager<ScriptedSource<Cluster>> {
        CachedManager::new(ScriptedSource::new(), policy)
    }

    #[test]
    fn test_first_listing_fills_cache() {
        let mgr = manager(EvictionPolicy::evicting());
        mgr.source().seed(Cluster::new("web", "lab"));

        assert!(!mgr.is_filled());
        assert_eq!(mgr.list_all().unwrap().len(), 1);
        assert!(mgr.is_filled());
        assert_eq!(mgr.source().lists(), 1);

        mgr.list_all().unwrap();
        assert_eq!(mgr.source().lists(), 1);
    }

    #[test]
    fn test_miss_on_unfilled_cache_fills_it() {
        let mgr = manager(EvictionPolicy::evicting());
        assert!(mgr.get("x").unwrap().is_none());
        assert!(mgr.is_filled());
        assert!(mgr.list_all().unwrap().is_empty());
        assert_eq!(mgr.source().fetches(), 1);
    }

    #[test]
    fn test_miss_on_filled_cache_skips_source() {
        let mgr = manager(EvictionPolicy::evicting());
        mgr.list_all().unwrap();
        mgr.source().seed(Cluster::new("late", "lab"));

        assert!(mgr.get("late").unwrap().is_none());
        assert_eq!(mgr.source().fetches(), 0);
        assert!(mgr.cached_get("late", true).unwrap().is_some());
    }

    #[test]
    fn test_added_entity_survives_lagging_listing() {
        let mgr = manager(EvictionPolicy::evicting());
        mgr.source().set_lagging(true);

        mgr.add(Cluster::new("web", "lab")).unwrap();
        let names: Vec<String> = mgr
            .list(ListOptions::cache_only())
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["web".to_string()]);
    }

    #[test]
    fn test_add_on_filled_cache_does_not_relist() {
        for policy in [EvictionPolicy::evicting(), EvictionPolicy::never_evicting()] {
            let mgr = manager(policy);
            mgr.source().seed(Cluster::new("web", "lab"));
            mgr.list_all().unwrap();
            assert_eq!(mgr.source().lists(), 1);

            mgr.add(Cluster::new("db", "lab")).unwrap();
            mgr.add(Cluster::new("edge", "lab")).unwrap();
            assert_eq!(mgr.source().lists(), 1);
            assert_eq!(mgr.list(ListOptions::cache_only()).unwrap().len(), 3);
        }
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let mgr = manager(EvictionPolicy::evicting());
        mgr.add(Cluster::new("web", "lab")).unwrap();

        let result = mgr.add(Cluster::new("web", "other"));
        assert!(matches!(result, Err(MiniCloudError::Integrity(_))));
        assert_eq!(mgr.source().creates(), 1);

        assert!(mgr.add_unchecked(Cluster::new("web", "other")).is_ok());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mgr = manager(EvictionPolicy::evicting());
        assert!(matches!(
            mgr.add(Cluster::new("", "lab")),
            Err(MiniCloudError::Integrity(_))
        ));
    }

    #[test]
    fn test_never_evicting_cache_ignores_clear_and_deep() {
        let mgr = manager(EvictionPolicy::never_evicting());
        mgr.source().seed(Cluster::new("web", "lab"));
        mgr.list_all().unwrap();

        mgr.clear_cache();
        assert!(mgr.is_filled());
        mgr.list(ListOptions::deep()).unwrap();
        assert_eq!(mgr.source().lists(), 1);
    }

    #[test]
    fn test_deep_listing_refreshes_evicting_cache() {
        let mgr = manager(EvictionPolicy::evicting());
        mgr.list_all().unwrap();
        mgr.source().seed(Cluster::new("late", "lab"));

        assert_eq!(mgr.list(ListOptions::deep()).unwrap().len(), 1);
        assert_eq!(mgr.source().lists(), 2);

        assert_eq!(
            mgr.list(ListOptions::deep().trusting_cache()).unwrap().len(),
            1
        );
        assert_eq!(mgr.source().lists(), 2);
    }

    #[test]
    fn test_update_refetches_unless_never_evicting() {
        let mgr = manager(EvictionPolicy::evicting());
        let web = mgr.add(Cluster::new("web", "lab")).unwrap();
        let fetches = mgr.source().fetches();

        let updated = mgr.update(&web, &json!({ "cloud_name": "prod" })).unwrap();
        assert_eq!(updated, Some(Cluster::new("web", "prod")));
        assert_eq!(mgr.source().fetches(), fetches + 1);

        let mgr = manager(EvictionPolicy::never_evicting());
        let web = mgr.add(Cluster::new("web", "lab")).unwrap();
        let fetches = mgr.source().fetches();
        let updated = mgr.update(&web, &json!({ "cloud_name": "prod" })).unwrap();
        assert_eq!(updated, Some(Cluster::new("web", "prod")));
        assert_eq!(mgr.source().fetches(), fetches);
    }

    #[test]
    fn test_refused_remove_still_forgets() {
        let mgr = manager(EvictionPolicy::evicting());
        let web = mgr.add(Cluster::new("web", "lab")).unwrap();

        mgr.source().set_refusing(true);
        assert!(!mgr.remove(&web).unwrap());
        assert!(mgr.get("web").unwrap().is_none());
        assert_eq!(mgr.source().removes(), 1);

        // a later refresh brings it back
        assert!(mgr.cached_get("web", true).unwrap().is_some());
    }

    #[test]
    fn test_undeclare_never_asks_the_source() {
        let mgr = manager(EvictionPolicy::evicting());
        let web = mgr.add(Cluster::new("web", "lab")).unwrap();

        assert!(mgr.undeclare(&web).unwrap());
        assert!(mgr.get("web").unwrap().is_none());
        assert_eq!(mgr.source().removes(), 0);
    }

    #[test]
    fn test_clear_without_cleanup_only_forgets() {
        let mgr = manager(EvictionPolicy::evicting());
        mgr.add(Cluster::new("web", "lab")).unwrap();
        mgr.add(Cluster::new("db", "lab")).unwrap();

        assert_eq!(mgr.clear(false).unwrap(), 2);
        assert_eq!(mgr.source().removes(), 0);
        assert!(mgr.list(ListOptions::cache_only()).unwrap().is_empty());
    }

    #[test]
    fn test_singleton() {
        let mgr = manager(EvictionPolicy::evicting());
        assert!(mgr.get_singleton_entity().unwrap().is_none());
        mgr.add(Cluster::new("web", "lab")).unwrap();
        assert_eq!(
            mgr.get_singleton_entity().unwrap().map(|c| c.name),
            Some("web".to_string())
        );
        mgr.add(Cluster::new("db", "lab")).unwrap();
        assert!(mgr.get_singleton_entity().unwrap().is_none());
    }

    #[test]
    fn test_children_through_child_manager() {
        let parents = manager(EvictionPolicy::evicting());
        let children = Arc::new(manager(EvictionPolicy::evicting()));
        parents.set_child_manager(children.clone());

        children.add(Cluster::new("web", "lab")).unwrap();
        children.add(Cluster::new("db", "prod")).unwrap();

        assert!(parents.has_children("lab").unwrap());
        assert!(!parents.has_children("none").unwrap());
        assert_eq!(parents.get_children("prod").unwrap(), vec!["db".to_string()]);

        assert!(parents.undeclare_children("lab").unwrap());
        assert!(!parents.has_children("lab").unwrap());
        assert!(parents.has_children("prod").unwrap());
    }
}
