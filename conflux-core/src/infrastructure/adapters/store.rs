// conflux-core/src/infrastructure/adapters/store.rs
//
// Record store backed by a single YAML file, rewritten atomically on every save.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::domain::record::ConfigurationRecord;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{atomic_write, read_yaml};
use crate::ports::store::{PersistenceError, RecordStore, StoredRecord};

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default = "first_id")]
    next_id: i64,
    #[serde(default)]
    records: Vec<StoreEntry>,
}

fn first_id() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreEntry {
    id: i64,
    updated_at: DateTime<Utc>,
    record: ConfigurationRecord,
}

impl From<InfrastructureError> for PersistenceError {
    fn from(err: InfrastructureError) -> Self {
        PersistenceError::Backend(err.to_string())
    }
}

pub struct YamlRecordStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl YamlRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StoreFile, InfrastructureError> {
        if !self.path.exists() {
            return Ok(StoreFile {
                next_id: first_id(),
                records: Vec::new(),
            });
        }
        read_yaml(&self.path)
    }

    fn write(&self, file: &StoreFile) -> Result<(), InfrastructureError> {
        let yaml = serde_yaml::to_string(file)?;
        atomic_write(&self.path, yaml)
    }
}

#[async_trait]
impl RecordStore for YamlRecordStore {
    #[instrument(skip(self, record), fields(store = ?self.path, kind = %record.kind()))]
    async fn save(&self, record: &ConfigurationRecord) -> Result<i64, PersistenceError> {
        let _guard = self.lock.lock().await;
        let mut file = self.read()?;

        let id = match record.id() {
            Some(id) => {
                if !file.records.iter().any(|e| e.id == id) {
                    return Err(PersistenceError::NotFound(id));
                }
                id
            }
            None => {
                // Hand-edited files may lack next_id or lag behind their records.
                let id = file
                    .records
                    .iter()
                    .map(|e| e.id + 1)
                    .max()
                    .unwrap_or(1)
                    .max(file.next_id)
                    .max(1);
                file.next_id = id + 1;
                id
            }
        };

        let mut stored = record.clone();
        stored.set_id(id);
        let entry = StoreEntry {
            id,
            updated_at: Utc::now(),
            record: stored,
        };
        match file.records.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => file.records.push(entry),
        }

        self.write(&file)?;
        debug!("Record {} written", id);
        Ok(id)
    }

    async fn fetch(&self, id: i64) -> Result<ConfigurationRecord, PersistenceError> {
        let _guard = self.lock.lock().await;
        self.read()?
            .records
            .into_iter()
            .find(|e| e.id == id)
            .map(|e| {
                let mut record = e.record;
                record.set_id(e.id);
                record
            })
            .ok_or(PersistenceError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<StoredRecord>, PersistenceError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read()?
            .records
            .into_iter()
            .map(|e| {
                let mut record = e.record;
                record.set_id(e.id);
                StoredRecord {
                    id: e.id,
                    updated_at: e.updated_at,
                    record,
                }
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::record::{DataQualityConfig, PipelineConfig};
    use anyhow::Result;
    use tempfile::tempdir;

    fn pipeline(name: &str) -> ConfigurationRecord {
        ConfigurationRecord::Pipeline(PipelineConfig {
            pipeline_name: name.into(),
            ..PipelineConfig::default()
        })
    }

    #[tokio::test]
    async fn test_save_assigns_ids_and_updates_in_place() -> Result<()> {
        let dir = tempdir()?;
        let store = YamlRecordStore::new(dir.path().join("records.yaml"));

        let first = store.save(&pipeline("orders_load")).await?;
        let second = store
            .save(&ConfigurationRecord::DataQuality(DataQualityConfig {
                rule_name: "ids_not_null".into(),
                ..DataQualityConfig::default()
            }))
            .await?;
        assert_eq!((first, second), (1, 2));

        let mut renamed = pipeline("orders_load_v2");
        renamed.set_id(1);
        assert_eq!(store.save(&renamed).await?, 1);

        let listed = store.list().await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(store.fetch(1).await?.name(), "orders_load_v2");
        Ok(())
    }

    #[tokio::test]
    async fn test_new_id_skips_past_existing_records() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("records.yaml");
        let store = YamlRecordStore::new(&path);
        store.save(&pipeline("orders_load")).await?;

        // Counter dropped by hand: the next record must not reuse id 1.
        let yaml: String = std::fs::read_to_string(&path)?
            .lines()
            .filter(|line| !line.starts_with("next_id:"))
            .map(|line| format!("{}\n", line))
            .collect();
        std::fs::write(&path, yaml)?;

        assert_eq!(store.save(&pipeline("customers_load")).await?, 2);
        let listed = store.list().await?;
        let ids: Vec<i64> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.fetch(1).await?.name(), "orders_load");
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_ids() -> Result<()> {
        let dir = tempdir()?;
        let store = YamlRecordStore::new(dir.path().join("records.yaml"));
        assert!(matches!(
            store.fetch(4).await,
            Err(PersistenceError::NotFound(4))
        ));

        let mut ghost = pipeline("ghost");
        ghost.set_id(4);
        assert!(matches!(
            store.save(&ghost).await,
            Err(PersistenceError::NotFound(4))
        ));
        // Nothing was written.
        assert!(!store.path().exists());
        Ok(())
    }
}
