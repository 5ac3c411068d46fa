// conflux-core/src/application/reconcile.rs
//
// Batch drift check: one stored pipeline record against the live catalog.

use serde::Serialize;
use tracing::{info, instrument};

use crate::application::session::{EditingSession, Notice};
use crate::domain::error::DomainError;
use crate::domain::form::Field;
use crate::domain::policy::ModePolicy;
use crate::domain::record::ConfigurationRecord;
use crate::error::ConsoleError;
use crate::ports::metadata::MetadataProvider;
use crate::ports::store::RecordStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub record_id: i64,
    pub table: Option<String>,
    pub before: Vec<String>,
    pub after: Vec<String>,
    pub notices: Vec<Notice>,
    pub written: bool,
}

impl DriftReport {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[instrument(skip(policy, provider, store))]
pub async fn reconcile_record(
    id: i64,
    policy: ModePolicy,
    provider: &dyn MetadataProvider,
    store: &dyn RecordStore,
    write: bool,
) -> Result<DriftReport, ConsoleError> {
    let record = store.fetch(id).await?;
    let ConfigurationRecord::Pipeline(config) = &record else {
        return Err(DomainError::InvalidRecord(format!(
            "Record {} is a {} record; only pipelines carry change-detection columns",
            id,
            record.kind()
        ))
        .into());
    };
    let before = config.md5_columns.clone();
    let table = config.target.table_name.clone();

    let mut session = EditingSession::load(&record, policy);
    session.sync(provider).await;

    let after = session.state().list(Field::Md5Columns).unwrap_or_default();
    let notices = session.drain_notices();

    let mut written = false;
    if write && before != after {
        session.submit(store).await?;
        written = true;
        info!("✅ Record {} updated with repaired columns", id);
    }

    Ok(DriftReport {
        record_id: id,
        table,
        before,
        after,
        notices,
        written,
    })
}
