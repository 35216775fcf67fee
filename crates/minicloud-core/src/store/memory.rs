use super::{Record, Store, checked_lookup};
use crate::entity::fingerprint;
use crate::error::Result;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Store living in process memory only
pub struct MemoryStore {
    table: String,
    records: Mutex<BTreeMap<u64, Record>>,
}

impl MemoryStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            records: Mutex::new(BTreeMap::new()),
        }
    }

    fn records(&self) -> MutexGuard<'_, BTreeMap<u64, Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Store for MemoryStore {
    fn table(&self) -> &str {
        &self.table
    }

    fn is_persistent(&self) -> bool {
        false
    }

    fn all(&self) -> Result<Vec<Record>> {
        Ok(self.records().values().cloned().collect())
    }

    fn upsert(&self, record: Record) -> Result<()> {
        self.records().insert(record.fingerprint, record);
        Ok(())
    }

    fn update(&self, record: Record) -> Result<bool> {
        let mut records = self.records();
        match records.get_mut(&record.fingerprint) {
            Some(existing) => {
                *existing = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, record: &Record) -> Result<bool> {
        Ok(self.records().remove(&record.fingerprint).is_some())
    }

    fn find_one(&self, name: &str) -> Result<Option<Record>> {
        let found = self.records().get(&fingerprint(name)).cloned();
        checked_lookup(&self.table, name, found)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records().len())
    }

    fn drop_all(&self) -> Result<()> {
        self.records().clear();
        Ok(())
    }
}
