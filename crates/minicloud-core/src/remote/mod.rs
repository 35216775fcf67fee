//! Entities that live on a cloud
//!
//! A [`RemoteSource`] lists entities from every authenticated cloud and
//! routes writes to the context resolved for the entity.

mod resolve;

pub use resolve::{ContextResolver, Resolution};

use crate::entity::Entity;
use crate::error::{MiniCloudError, Result};
use crate::model::Cloud;
use crate::source::{ListQuery, Source};
use minicloud_cloud::{DeleteOutcome, RemoteContext, RemoteItem, ResourceKind, ResourceSpec};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Conversion between an entity and its remote representation
pub trait RemoteResource: Entity {
    const RESOURCE: ResourceKind;

    /// Entities the system can list but never create or delete
    const READ_ONLY: bool = false;

    fn remote_id(&self) -> Option<&str>;

    /// Cloud the entity is bound to
    fn cloud_name(&self) -> Option<&str>;

    fn bind_cloud(&mut self, cloud: &str);

    fn cluster_name(&self) -> Option<&str> {
        None
    }

    /// `None` for items that should not be mirrored (yet)
    fn from_remote(cloud: &str, item: &RemoteItem) -> Option<Self>;

    fn to_spec(&self) -> ResourceSpec;

    fn deletable(&self) -> bool {
        true
    }
}

pub struct RemoteSource<E> {
    resolver: Arc<ContextResolver>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: RemoteResource> RemoteSource<E> {
    pub fn new(resolver: Arc<ContextResolver>) -> Self {
        Self {
            resolver,
            _entity: PhantomData,
        }
    }

    pub fn resolver(&self) -> &Arc<ContextResolver> {
        &self.resolver
    }

    fn list_on_cloud(&self, cloud: &Cloud, query: &ListQuery<'_>) -> Result<Vec<E>> {
        let context = self.resolver.cloud_manager()?.context(cloud)?;
        if !context.authenticated() {
            tracing::debug!(
                "[{} source] skipping unauthenticated cloud {}",
                E::KIND,
                cloud.name
            );
            return Ok(Vec::new());
        }

        Ok(context
            .list(E::RESOURCE, query.name)?
            .iter()
            .filter_map(|item| E::from_remote(&cloud.name, item))
            .filter(|entity| query.matches(entity))
            .collect())
    }

    /// Copy of the entity bound to the cloud it resolves to
    ///
    /// A bound entity resolves directly, without another cluster lookup.
    pub fn bind(&self, entity: &E) -> Result<E> {
        let (bound, _, _) = self.bind_context(entity.clone())?;
        Ok(bound)
    }

    fn bind_context(&self, mut entity: E) -> Result<(E, String, Arc<dyn RemoteContext>)> {
        let resolution = self.resolver.resolve(&entity)?;
        tracing::trace!("[{} source] {} -> {:?}", E::KIND, entity.name(), resolution);
        let context = self.resolver.context(&resolution)?;
        let cloud = resolution.cloud().to_string();
        entity.bind_cloud(&cloud);
        Ok((entity, cloud, context))
    }

    /// Backend id of the entity, looked up by name when it has none
    fn find_remote_id(&self, context: &dyn RemoteContext, entity: &E) -> Result<Option<String>> {
        if let Some(id) = entity.remote_id() {
            return Ok(Some(id.to_string()));
        }
        Ok(context
            .list(E::RESOURCE, Some(entity.name()))?
            .into_iter()
            .next()
            .map(|item| item.id))
    }
}

impl<E: RemoteResource> Source for RemoteSource<E> {
    type Entity = E;

    fn list_entities(&self, query: &ListQuery<'_>) -> Result<Vec<E>> {
        let clouds = self.resolver.cloud_manager()?.list_all()?;
        if clouds.is_empty() {
            tracing::error!("[{} source] No clouds!", E::KIND);
            return Err(MiniCloudError::integrity(format!(
                "no clouds to list {}s from",
                E::KIND
            )));
        }

        let mut entities = Vec::new();
        for cloud in &clouds {
            match self.list_on_cloud(cloud, query) {
                Ok(mut found) => entities.append(&mut found),
                Err(e) => tracing::warn!(
                    "[{} source] listing on {} failed: {}",
                    E::KIND,
                    cloud.name,
                    e
                ),
            }
        }
        Ok(entities)
    }

    fn create_entity(&self, entity: E) -> Result<E> {
        if E::READ_ONLY {
            return Err(MiniCloudError::integrity(format!(
                "{}s are read-only",
                E::KIND
            )));
        }

        let (entity, cloud, context) = self.bind_context(entity)?;
        let item = context.create(&entity.to_spec()).map_err(|e| {
            tracing::error!(
                "[{} source] creating {} on {} failed: {}",
                E::KIND,
                entity.name(),
                cloud,
                e
            );
            MiniCloudError::from(e)
        })?;

        Ok(E::from_remote(&cloud, &item).unwrap_or(entity))
    }

    fn update_entity(&self, entity: &E, patch: &Value) -> Result<E> {
        let (entity, cloud, context) = self.bind_context(entity.clone())?;
        let id = self
            .find_remote_id(context.as_ref(), &entity)?
            .ok_or_else(|| {
                MiniCloudError::DoesNotExist(format!("{} {}", E::KIND, entity.name()))
            })?;

        let item = context.update(E::RESOURCE, &id, patch)?;
        Ok(E::from_remote(&cloud, &item).unwrap_or(entity))
    }

    fn remove_entity(&self, entity: &E) -> Result<bool> {
        if E::READ_ONLY {
            tracing::warn!("[{} source] {}s are read-only", E::KIND, E::KIND);
            return Ok(false);
        }
        if !entity.deletable() {
            tracing::warn!(
                "[{} source] {} cannot be deleted via MiniCloud.",
                E::KIND,
                entity.describe()
            );
            return Ok(false);
        }

        let (entity, cloud, context) = self.bind_context(entity.clone())?;
        let Some(id) = self.find_remote_id(context.as_ref(), &entity)? else {
            tracing::warn!(
                "[{} source] {} is already gone from {}",
                E::KIND,
                entity.name(),
                cloud
            );
            return Ok(true);
        };

        match context.delete(E::RESOURCE, &id)? {
            DeleteOutcome::Deleted => {
                tracing::info!("[{} source] deleted {} on {}", E::KIND, entity.name(), cloud);
            }
            DeleteOutcome::NotFound => {
                tracing::warn!(
                    "[{} source] {} was not found on {}",
                    E::KIND,
                    entity.name(),
                    cloud
                );
            }
            DeleteOutcome::ServerError(msg) => {
                tracing::warn!(
                    "[{} source] {} on {} failed to delete, it may linger: {}",
                    E::KIND,
                    entity.name(),
                    cloud,
                    msg
                );
            }
        }
        Ok(true)
    }
}
