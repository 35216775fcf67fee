//! Authoritative entity sources behind a cache

use crate::entity::Entity;
use crate::error::{MiniCloudError, Result};
use crate::store::{Record, Store};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Filter for [`Source::list_entities`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ListQuery<'a> {
    pub name: Option<&'a str>,
    pub parent: Option<&'a str>,
    /// Skip the entity with this name
    pub exclude: Option<&'a str>,
    /// The caller asked for a refresh past any source-side caching
    pub deep: bool,
}

impl<'a> ListQuery<'a> {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn named(name: &'a str) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    pub fn matches<E: Entity>(&self, entity: &E) -> bool {
        self.name.is_none_or(|n| entity.name() == n)
            && self.parent.is_none_or(|p| entity.is_child_of(p))
            && self.exclude.is_none_or(|x| entity.name() != x)
    }
}

/// Where a cached manager gets its entities from
pub trait Source: Send + Sync {
    type Entity: Entity;

    fn list_entities(&self, query: &ListQuery<'_>) -> Result<Vec<Self::Entity>>;

    /// Single-entity lookup; the first match of a named listing by default
    fn fetch_entity(&self, name: &str) -> Result<Option<Self::Entity>> {
        Ok(self.list_entities(&ListQuery::named(name))?.into_iter().next())
    }

    fn create_entity(&self, entity: Self::Entity) -> Result<Self::Entity>;

    /// Apply a patch and return the entity as it is now
    fn update_entity(&self, entity: &Self::Entity, patch: &Value) -> Result<Self::Entity>;

    /// Tear the entity down; false when the source refused
    fn remove_entity(&self, entity: &Self::Entity) -> Result<bool>;

    /// Whether forgetting an entity equals removing it
    fn undeclare_is_remove(&self) -> bool {
        false
    }
}

/// Source reading and writing a local [`Store`] table
pub struct StoreSource<E> {
    store: Arc<dyn Store>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> StoreSource<E> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}

impl<E> Source for StoreSource<E>
where
    E: Entity + Serialize + DeserializeOwned,
{
    type Entity = E;

    fn list_entities(&self, query: &ListQuery<'_>) -> Result<Vec<E>> {
        tracing::debug!(
            "[{} store] fetching {}",
            E::KIND,
            query.name.unwrap_or("all")
        );
        let mut entities = Vec::new();
        for record in self.store.all()? {
            let entity: E = record.to_entity()?;
            if query.matches(&entity) {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    fn fetch_entity(&self, name: &str) -> Result<Option<E>> {
        self.store
            .find_one(name)?
            .map(|record| record.to_entity())
            .transpose()
    }

    fn create_entity(&self, entity: E) -> Result<E> {
        self.store.upsert(Record::from_entity(&entity)?)?;
        Ok(entity)
    }

    fn update_entity(&self, entity: &E, patch: &Value) -> Result<E> {
        let mut value = serde_json::to_value(entity)?;
        if let (Value::Object(fields), Value::Object(changes)) = (&mut value, patch) {
            for (key, change) in changes {
                if key != "name" {
                    fields.insert(key.clone(), change.clone());
                }
            }
        }
        let updated: E = serde_json::from_value(value)?;

        if !self.store.update(Record::from_entity(&updated)?)? {
            return Err(MiniCloudError::DoesNotExist(format!(
                "{} {}",
                E::KIND,
                entity.name()
            )));
        }
        Ok(updated)
    }

    fn remove_entity(&self, entity: &E) -> Result<bool> {
        if !self.store.delete(&Record::from_entity(entity)?)? {
            tracing::warn!(
                "[{} store] {} had no record to delete",
                E::KIND,
                entity.name()
            );
        }
        Ok(true)
    }

    fn undeclare_is_remove(&self) -> bool {
        true
    }
}
