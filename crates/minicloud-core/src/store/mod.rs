//! Local persistence of stored entities
//!
//! A [`Store`] holds the records of one table. [`Database`] opens the tables
//! a MiniCloud system needs on one backend.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::entity::{Entity, fingerprint};
use crate::error::{MiniCloudError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

pub const CLOUDS_TABLE: &str = "clouds";
pub const CLUSTERS_TABLE: &str = "clusters";

/// One stored row, keyed by the fingerprint of its name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub fingerprint: u64,
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn from_entity<E: Entity + Serialize>(entity: &E) -> Result<Self> {
        let fields = match serde_json::to_value(entity)? {
            Value::Object(fields) => fields,
            other => {
                return Err(MiniCloudError::Store(format!(
                    "{} {} does not serialize to an object: {}",
                    E::KIND,
                    entity.name(),
                    other
                )));
            }
        };
        Ok(Self {
            fingerprint: entity.fingerprint(),
            name: entity.name().to_string(),
            fields,
        })
    }

    pub fn to_entity<E: Entity + DeserializeOwned>(&self) -> Result<E> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// Table of records
pub trait Store: Send + Sync {
    fn table(&self) -> &str;

    /// Whether records outlive the process
    fn is_persistent(&self) -> bool;

    fn all(&self) -> Result<Vec<Record>>;

    /// Insert, or replace the record with the same fingerprint
    fn upsert(&self, record: Record) -> Result<()>;

    /// Replace an existing record; false when there is none
    fn update(&self, record: Record) -> Result<bool>;

    fn delete(&self, record: &Record) -> Result<bool>;

    fn find_one(&self, name: &str) -> Result<Option<Record>>;

    fn count(&self) -> Result<usize>;

    fn drop_all(&self) -> Result<()>;
}

/// Check a fingerprint lookup actually found the named record
pub(crate) fn checked_lookup(
    table: &str,
    name: &str,
    found: Option<Record>,
) -> Result<Option<Record>> {
    match found {
        Some(record) if record.name != name => Err(MiniCloudError::Store(format!(
            "[{}] fingerprint {} of '{}' is taken by '{}'",
            table,
            fingerprint(name),
            name,
            record.name
        ))),
        other => Ok(other),
    }
}

/// Where the tables live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Directory(PathBuf),
}

/// The tables of one backend
#[derive(Clone)]
pub struct Database {
    backend: Backend,
    clouds: Arc<dyn Store>,
    clusters: Arc<dyn Store>,
}

impl Database {
    pub fn open(backend: Backend) -> Result<Self> {
        let (clouds, clusters): (Arc<dyn Store>, Arc<dyn Store>) = match &backend {
            Backend::Memory => (
                Arc::new(MemoryStore::new(CLOUDS_TABLE)),
                Arc::new(MemoryStore::new(CLUSTERS_TABLE)),
            ),
            Backend::Directory(dir) => (
                Arc::new(FileStore::open(dir, CLOUDS_TABLE)?),
                Arc::new(FileStore::open(dir, CLUSTERS_TABLE)?),
            ),
        };
        tracing::debug!("[Database] opened {:?}", backend);
        Ok(Self {
            backend,
            clouds,
            clusters,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            clouds: Arc::new(MemoryStore::new(CLOUDS_TABLE)),
            clusters: Arc::new(MemoryStore::new(CLUSTERS_TABLE)),
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn is_persistent(&self) -> bool {
        self.clouds.is_persistent()
    }

    pub fn clouds(&self) -> Arc<dyn Store> {
        self.clouds.clone()
    }

    pub fn clusters(&self) -> Arc<dyn Store> {
        self.clusters.clone()
    }
}
