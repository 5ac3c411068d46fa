// conflux-core/src/ports/store.rs

// Persistence layer port: where normalized records go on submit and come from on load.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::domain::record::ConfigurationRecord;

#[derive(Error, Debug, Diagnostic)]
pub enum PersistenceError {
    #[error("Record {0} not found")]
    #[diagnostic(code(conflux::store::not_found))]
    NotFound(i64),

    #[error("Record store failure: {0}")]
    #[diagnostic(
        code(conflux::store::backend),
        help("The record was not saved. Check the store file and retry.")
    )]
    Backend(String),
}

/// Stored record plus its bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: i64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub record: ConfigurationRecord,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts (no id) or replaces (id set). Returns the record id.
    async fn save(&self, record: &ConfigurationRecord) -> Result<i64, PersistenceError>;

    async fn fetch(&self, id: i64) -> Result<ConfigurationRecord, PersistenceError>;

    async fn list(&self) -> Result<Vec<StoredRecord>, PersistenceError>;
}
