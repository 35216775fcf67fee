//! JSON file backed store
//!
//! Each table is one `<table>.json` file in the store directory. Every write
//! moves the previous file to `<table>.json.backup` first.

use super::{Record, Store, checked_lookup};
use crate::entity::fingerprint;
use crate::error::{MiniCloudError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

const TABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableFile {
    version: u32,
    updated_at: DateTime<Utc>,
    records: Vec<Record>,
}

impl TableFile {
    fn new() -> Self {
        Self {
            version: TABLE_VERSION,
            updated_at: Utc::now(),
            records: Vec::new(),
        }
    }
}

pub struct FileStore {
    table: String,
    dir: PathBuf,
    // serializes read-modify-write cycles on the file
    io: Mutex<()>,
}

impl FileStore {
    /// Open a table in a directory, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>, table: impl Into<String>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            tracing::debug!("Created store directory: {}", dir.display());
        }
        let store = Self {
            table: table.into(),
            dir,
            io: Mutex::new(()),
        };
        // surface version problems at open time
        store.load()?;
        Ok(store)
    }

    fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.table))
    }

    fn backup_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json.backup", self.table))
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.io.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self) -> Result<TableFile> {
        let path = self.path();
        if !path.exists() {
            tracing::trace!("[{}] table file not found, starting empty", self.table);
            return Ok(TableFile::new());
        }

        let content = fs::read_to_string(&path)?;
        let file: TableFile = serde_json::from_str(&content)?;

        if file.version > TABLE_VERSION {
            return Err(MiniCloudError::Store(format!(
                "Table file {} has version {}, newer than supported version {}",
                path.display(),
                file.version,
                TABLE_VERSION
            )));
        }

        Ok(file)
    }

    fn save(&self, mut file: TableFile) -> Result<()> {
        let path = self.path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup)?;
            }
            fs::rename(&path, &backup)?;
        }

        file.updated_at = Utc::now();
        fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        tracing::debug!("[{}] saved {} records", self.table, file.records.len());
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Record>) -> T) -> Result<T> {
        let _guard = self.guard();
        let mut file = self.load()?;
        let out = f(&mut file.records);
        self.save(file)?;
        Ok(out)
    }
}

impl Store for FileStore {
    fn table(&self) -> &str {
        &self.table
    }

    fn is_persistent(&self) -> bool {
        true
    }

    fn all(&self) -> Result<Vec<Record>> {
        let _guard = self.guard();
        Ok(self.load()?.records)
    }

    fn upsert(&self, record: Record) -> Result<()> {
        self.modify(|records| {
            match records.iter_mut().find(|r| r.fingerprint == record.fingerprint) {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
        })
    }

    fn update(&self, record: Record) -> Result<bool> {
        self.modify(|records| {
            match records.iter_mut().find(|r| r.fingerprint == record.fingerprint) {
                Some(existing) => {
                    *existing = record;
                    true
                }
                None => false,
            }
        })
    }

    fn delete(&self, record: &Record) -> Result<bool> {
        self.modify(|records| {
            let before = records.len();
            records.retain(|r| r.fingerprint != record.fingerprint);
            before != records.len()
        })
    }

    fn find_one(&self, name: &str) -> Result<Option<Record>> {
        let key = fingerprint(name);
        let found = self.all()?.into_iter().find(|r| r.fingerprint == key);
        checked_lookup(&self.table, name, found)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }

    fn drop_all(&self) -> Result<()> {
        self.modify(|records| records.clear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};
    use tempfile::tempdir;

    fn record(name: &str, cloud: &str) -> Record {
        let mut fields = Map::new();
        fields.insert("name".into(), json!(name));
        fields.insert("cloud_name".into(), json!(cloud));
        Record {
            fingerprint: fingerprint(name),
            name: name.to_string(),
            fields,
        }
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = FileStore::open(dir.path(), "clusters").unwrap();
            store.upsert(record("web", "lab")).unwrap();
            store.upsert(record("db", "lab")).unwrap();
        }

        let store = FileStore::open(dir.path(), "clusters").unwrap();
        assert!(store.is_persistent());
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(
            store.find_one("db").unwrap().unwrap().fields["cloud_name"],
            "lab"
        );
    }

    #[test]
    fn test_backup_written_on_second_save() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path(), "clouds").unwrap();
        store.upsert(record("lab", "")).unwrap();
        assert!(!dir.path().join("clouds.json.backup").exists());

        store.upsert(record("prod", "")).unwrap();
        assert!(dir.path().join("clouds.json").exists());
        assert!(dir.path().join("clouds.json.backup").exists());
    }

    #[test]
    fn test_update_delete_and_drop() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path(), "clusters").unwrap();
        store.upsert(record("web", "lab")).unwrap();

        assert!(store.update(record("web", "prod")).unwrap());
        assert!(!store.update(record("db", "prod")).unwrap());
        assert_eq!(
            store.find_one("web").unwrap().unwrap().fields["cloud_name"],
            "prod"
        );

        assert!(store.delete(&record("web", "prod")).unwrap());
        assert!(!store.delete(&record("web", "prod")).unwrap());

        store.upsert(record("db", "lab")).unwrap();
        store.drop_all().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("clouds.json"),
            r#"{"version": 99, "updated_at": "2026-01-01T00:00:00Z", "records": []}"#,
        )
        .unwrap();

        let result = FileStore::open(dir.path(), "clouds");
        assert!(matches!(result, Err(MiniCloudError::Store(_))));
    }
}
