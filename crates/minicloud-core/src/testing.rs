//! Test doubles: a scripted [`Source`] and a spying remote context

use crate::entity::Entity;
use crate::error::{MiniCloudError, Result};
use crate::model::Cloud;
use crate::source::{ListQuery, Source};
use minicloud_cloud::{
    AuthStatus, CloudError, CloudType, ConnectionInfo, DeleteOutcome, Driver, RemoteContext,
    RemoteItem, ResourceKind, ResourceSpec,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory source counting every call
pub struct ScriptedSource<E> {
    entities: Mutex<Vec<E>>,
    /// Created while lagging; invisible to listings and fetches
    lagging_names: Mutex<HashSet<String>>,
    lagging: AtomicBool,
    refusing: AtomicBool,
    lists: AtomicUsize,
    fetches: AtomicUsize,
    creates: AtomicUsize,
    removes: AtomicUsize,
}

impl<E: Entity> Default for ScriptedSource<E> {
    fn default() -> Self {
        Self {
            entities: Mutex::new(Vec::new()),
            lagging_names: Mutex::new(HashSet::new()),
            lagging: AtomicBool::new(false),
            refusing: AtomicBool::new(false),
            lists: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
        }
    }
}

impl<E: Entity> ScriptedSource<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, entity: E) {
        lock(&self.entities).push(entity);
    }

    /// Created entities stay out of listings
    pub fn set_lagging(&self, lagging: bool) {
        self.lagging.store(lagging, Ordering::SeqCst);
    }

    /// Removals report a refusal
    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn removes(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }

    fn visible(&self, query: &ListQuery<'_>) -> Vec<E> {
        let hidden = lock(&self.lagging_names);
        lock(&self.entities)
            .iter()
            .filter(|e| !hidden.contains(e.name()) && query.matches(*e))
            .cloned()
            .collect()
    }
}

impl<E> Source for ScriptedSource<E>
where
    E: Entity + Serialize + DeserializeOwned,
{
    type Entity = E;

    fn list_entities(&self, query: &ListQuery<'_>) -> Result<Vec<E>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.visible(query))
    }

    fn fetch_entity(&self, name: &str) -> Result<Option<E>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.visible(&ListQuery::named(name)).into_iter().next())
    }

    fn create_entity(&self, entity: E) -> Result<E> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.lagging.load(Ordering::SeqCst) {
            lock(&self.lagging_names).insert(entity.name().to_string());
        }
        let mut entities = lock(&self.entities);
        entities.retain(|e| e.name() != entity.name());
        entities.push(entity.clone());
        Ok(entity)
    }

    fn update_entity(&self, entity: &E, patch: &Value) -> Result<E> {
        let mut value = serde_json::to_value(entity)?;
        if let (Value::Object(fields), Value::Object(changes)) = (&mut value, patch) {
            for (key, change) in changes {
                fields.insert(key.clone(), change.clone());
            }
        }
        let updated: E = serde_json::from_value(value)?;

        let mut entities = lock(&self.entities);
        match entities.iter_mut().find(|e| e.name() == entity.name()) {
            Some(existing) => *existing = updated.clone(),
            None => {
                return Err(MiniCloudError::DoesNotExist(entity.name().to_string()));
            }
        }
        Ok(updated)
    }

    fn remove_entity(&self, entity: &E) -> Result<bool> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        if self.refusing.load(Ordering::SeqCst) {
            return Ok(false);
        }
        lock(&self.entities).retain(|e| e.name() != entity.name());
        Ok(true)
    }
}

/// Remote operations a [`FakeContext`] counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Update,
    Delete,
}

/// Remote context keeping items in memory and counting calls per kind
pub struct FakeContext {
    name: String,
    accepts_credentials: bool,
    authenticated: AtomicBool,
    items: Mutex<Vec<RemoteItem>>,
    calls: Mutex<HashMap<(Op, ResourceKind), usize>>,
    next_id: AtomicUsize,
    failing_lists: AtomicBool,
    delete_outcome: Mutex<Option<DeleteOutcome>>,
}

impl FakeContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accepts_credentials: true,
            authenticated: AtomicBool::new(false),
            items: Mutex::new(Vec::new()),
            calls: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            failing_lists: AtomicBool::new(false),
            delete_outcome: Mutex::new(None),
        }
    }

    /// A context whose authentication always fails
    pub fn rejecting(name: impl Into<String>) -> Self {
        Self {
            accepts_credentials: false,
            ..Self::new(name)
        }
    }

    pub fn seed(&self, item: RemoteItem) {
        lock(&self.items).push(item);
    }

    pub fn items(&self, kind: ResourceKind) -> Vec<RemoteItem> {
        lock(&self.items)
            .iter()
            .filter(|i| i.kind == kind)
            .cloned()
            .collect()
    }

    pub fn calls(&self, op: Op, kind: ResourceKind) -> usize {
        lock(&self.calls).get(&(op, kind)).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    pub fn fail_lists(&self, fail: bool) {
        self.failing_lists.store(fail, Ordering::SeqCst);
    }

    /// Answer every delete with this outcome without deleting
    pub fn respond_to_deletes(&self, outcome: DeleteOutcome) {
        *lock(&self.delete_outcome) = Some(outcome);
    }

    fn record(&self, op: Op, kind: ResourceKind) {
        *lock(&self.calls).entry((op, kind)).or_default() += 1;
    }

    fn require_auth(&self) -> minicloud_cloud::Result<()> {
        if self.authenticated.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CloudError::NotAuthenticated(self.name.clone()))
        }
    }
}

impl RemoteContext for FakeContext {
    fn driver_name(&self) -> &str {
        "fake"
    }

    fn authenticate(&self) -> minicloud_cloud::Result<AuthStatus> {
        if self.accepts_credentials {
            self.authenticated.store(true, Ordering::SeqCst);
            Ok(AuthStatus::ok(format!("fake account on {}", self.name)))
        } else {
            Ok(AuthStatus::failed("credentials rejected"))
        }
    }

    fn authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn list(&self, kind: ResourceKind, name: Option<&str>) -> minicloud_cloud::Result<Vec<RemoteItem>> {
        self.require_auth()?;
        self.record(Op::List, kind);
        if self.failing_lists.load(Ordering::SeqCst) {
            return Err(CloudError::Transport(format!("{} is unreachable", self.name)));
        }
        Ok(lock(&self.items)
            .iter()
            .filter(|i| i.kind == kind && name.is_none_or(|n| i.name == n))
            .cloned()
            .collect())
    }

    fn create(&self, spec: &ResourceSpec) -> minicloud_cloud::Result<RemoteItem> {
        self.require_auth()?;
        self.record(Op::Create, spec.kind);

        let mut items = lock(&self.items);
        if items.iter().any(|i| i.kind == spec.kind && i.name == spec.name) {
            return Err(CloudError::ResourceAlreadyExists(spec.name.clone()));
        }
        let id = format!("{}-{}", spec.kind, self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut item = RemoteItem::new(spec.kind, id, spec.name.clone());
        if let Value::Object(config) = &spec.config {
            for (key, value) in config {
                if !value.is_null() {
                    item.set_attribute(key.clone(), value.clone());
                }
            }
        }
        if spec.kind == ResourceKind::Instance {
            item.set_attribute("status", Value::from("ACTIVE"));
        }
        items.push(item.clone());
        Ok(item)
    }

    fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        patch: &Value,
    ) -> minicloud_cloud::Result<RemoteItem> {
        self.require_auth()?;
        self.record(Op::Update, kind);

        let mut items = lock(&self.items);
        let item = items
            .iter_mut()
            .find(|i| i.kind == kind && i.id == id)
            .ok_or_else(|| CloudError::ResourceNotFound(id.to_string()))?;
        if let Value::Object(changes) = patch {
            for (key, value) in changes {
                if value.is_null() {
                    item.attributes.remove(key);
                } else {
                    item.set_attribute(key.clone(), value.clone());
                }
            }
        }
        Ok(item.clone())
    }

    fn delete(&self, kind: ResourceKind, id: &str) -> minicloud_cloud::Result<DeleteOutcome> {
        self.require_auth()?;
        self.record(Op::Delete, kind);

        if let Some(outcome) = lock(&self.delete_outcome).clone() {
            return Ok(outcome);
        }
        let mut items = lock(&self.items);
        let before = items.len();
        items.retain(|i| !(i.kind == kind && i.id == id));
        Ok(if items.len() < before {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        })
    }
}

/// OpenStack-typed driver handing out one shared [`FakeContext`] per cloud
#[derive(Default)]
pub struct FakeDriver {
    contexts: Mutex<HashMap<String, Arc<FakeContext>>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context of a cloud, created on first use
    pub fn context(&self, cloud: &str) -> Arc<FakeContext> {
        lock(&self.contexts)
            .entry(cloud.to_string())
            .or_insert_with(|| Arc::new(FakeContext::new(cloud)))
            .clone()
    }

    /// Serve a cloud with a prepared context
    pub fn insert(&self, cloud: &str, context: FakeContext) -> Arc<FakeContext> {
        let context = Arc::new(context);
        lock(&self.contexts).insert(cloud.to_string(), context.clone());
        context
    }
}

impl Driver for FakeDriver {
    fn cloud_type(&self) -> CloudType {
        CloudType::OpenStack
    }

    fn connect(&self, info: &ConnectionInfo) -> minicloud_cloud::Result<Arc<dyn RemoteContext>> {
        Ok(self.context(&info.cloud_name))
    }
}

/// An OpenStack cloud served by [`FakeDriver`]
pub fn openstack_cloud(name: &str) -> Cloud {
    Cloud {
        cloud_type: CloudType::OpenStack,
        location: "lab".to_string(),
        auth_url: format!("http://{}:5000/v3", name),
        tenant: "admin".to_string(),
        username: "admin".to_string(),
        ..Cloud::stub(name)
    }
}
