// conflux-core/src/application/session.rs
//
// One editing session = one form, one Selection State, one metadata cache.
// Edits run to completion (reduce -> apply -> evict -> reconcile) before the next one;
// provider calls are the only async part and go through `sync`.

use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::application::cache::{Completion, MetadataCache, MetadataRequest};
use crate::domain::error::{DomainError, ValidationReport};
use crate::domain::form::{Field, FieldChange, FieldValue, FormKind, FormManifest, SelectionState, join_list};
use crate::domain::metadata::{MetadataKey, MetadataValue};
use crate::domain::normalizer::{SubmissionNormalizer, hydrate};
use crate::domain::policy::{Flag, ModePolicy};
use crate::domain::reconciler::{ColumnSetReconciler, ReconcileOutcome};
use crate::domain::record::ConfigurationRecord;
use crate::domain::resolver::{FormView, Reducer, Rejection, key_for, resolve, wanted_keys};
use crate::error::ConsoleError;
use crate::ports::metadata::{MetadataError, MetadataProvider, fetch_key};
use crate::ports::store::RecordStore;

/// Something the user should be told about, collected during edits and syncs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "notice", rename_all = "snake_case")]
pub enum Notice {
    SchemaDrift {
        table: String,
        added: Vec<String>,
        removed: Vec<String>,
    },
    /// Dynamic schema is off and the selection references dropped columns.
    ColumnsMissing {
        table: String,
        columns: Vec<String>,
    },
    Rejected(Rejection),
    MetadataUnavailable {
        key: String,
        reason: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaDrift {
                table,
                added,
                removed,
            } => write!(
                f,
                "Schema drift on '{}': added [{}], removed [{}]",
                table,
                added.join(", "),
                removed.join(", ")
            ),
            Self::ColumnsMissing { table, columns } => write!(
                f,
                "Columns no longer in '{}': {} (dynamic schema is off)",
                table,
                columns.join(", ")
            ),
            Self::Rejected(rejection) => write!(f, "{}", rejection),
            Self::MetadataUnavailable { key, reason } => {
                write!(f, "Could not load {}: {}", key, reason)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditOutcome {
    pub changes: Vec<FieldChange>,
    pub cleared: Vec<Field>,
    pub rejection: Option<Rejection>,
}

pub struct EditingSession {
    manifest: FormManifest,
    policy: ModePolicy,
    state: SelectionState,
    cache: MetadataCache,
    record_id: Option<i64>,
    notices: Vec<Notice>,
    /// Last live column list the reconciler ran against, per table key.
    seen_columns: BTreeMap<MetadataKey, Vec<String>>,
}

impl EditingSession {
    /// New record, seeded with the form's defaults.
    pub fn create(kind: FormKind, policy: ModePolicy) -> Self {
        let manifest = FormManifest::for_kind(kind);
        let state = SelectionState::with_values(manifest.defaults.iter().cloned());
        Self::with_state(manifest, policy, state, None)
    }

    /// Existing record, seeded from its persisted form.
    pub fn load(record: &ConfigurationRecord, policy: ModePolicy) -> Self {
        let manifest = FormManifest::for_kind(record.kind());
        let state = SelectionState::with_values(hydrate(record));
        Self::with_state(manifest, policy, state, record.id())
    }

    fn with_state(
        manifest: FormManifest,
        policy: ModePolicy,
        state: SelectionState,
        record_id: Option<i64>,
    ) -> Self {
        Self {
            manifest,
            policy,
            state,
            cache: MetadataCache::new(),
            record_id,
            notices: Vec::new(),
            seen_columns: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> FormKind {
        self.manifest.kind
    }

    pub fn record_id(&self) -> Option<i64> {
        self.record_id
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Observers see each batch once it is fully applied.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&FieldChange) + Send + 'static,
    {
        self.state.subscribe(observer);
    }

    #[instrument(skip(self, value), fields(form = %self.manifest.kind))]
    pub fn set(&mut self, field: Field, value: Option<FieldValue>) -> EditOutcome {
        let transition = {
            let connections = match self.cache.get(&MetadataKey::Connections) {
                Some(MetadataValue::Connections(list)) => Some(list.as_slice()),
                _ => None,
            };
            Reducer {
                manifest: &self.manifest,
                policy: &self.policy,
                connections,
            }
            .reduce(&self.state, field, value)
        };

        if let Some(rejection) = transition.rejection {
            info!("{}", rejection);
            self.notices.push(Notice::Rejected(rejection.clone()));
            return EditOutcome {
                rejection: Some(rejection),
                ..EditOutcome::default()
            };
        }

        if transition.updates.is_empty() {
            // Re-selecting the same value retries whatever failed below it.
            self.retry_failed_children(field);
            return EditOutcome::default();
        }

        let changes = self.state.apply(&transition.updates);
        if !transition.cleared.is_empty() {
            debug!("Cascade cleared: {:?}", transition.cleared);
        }

        let wanted = self.wanted();
        for key in self.cache.retain_wanted(&wanted) {
            self.seen_columns.remove(&key);
        }
        // Reconciler mode may have changed: the next pass starts from scratch.
        if matches!(field, Field::EnableDynamicSchema | Field::LoadType) {
            if let Some(key) = key_for(&self.manifest, &self.state, Field::Md5Columns) {
                self.seen_columns.remove(&key);
            }
        }
        self.reconcile_columns();

        EditOutcome {
            changes,
            cleared: transition.cleared,
            rejection: None,
        }
    }

    pub fn wanted(&self) -> BTreeSet<MetadataKey> {
        wanted_keys(&self.manifest, &self.policy, &self.state)
    }

    pub fn pending_requests(&mut self) -> Vec<MetadataRequest> {
        let wanted = self.wanted();
        self.cache.issue(&wanted)
    }

    pub fn complete(
        &mut self,
        request: &MetadataRequest,
        result: Result<MetadataValue, MetadataError>,
    ) -> Completion {
        let wanted = self.wanted();
        let completion = self.cache.accept(request, result, &wanted);
        match &completion {
            Completion::Applied => self.reconcile_columns(),
            Completion::Failed(reason) => {
                warn!(key = %request.key, "Metadata unavailable: {}", reason);
                self.notices.push(Notice::MetadataUnavailable {
                    key: request.key.to_string(),
                    reason: reason.clone(),
                });
            }
            Completion::Discarded => {}
        }
        completion
    }

    /// Fetches everything the current selection needs, concurrently, until nothing is
    /// pending. Returns how many responses were applied.
    #[instrument(skip(self, provider), fields(form = %self.manifest.kind))]
    pub async fn sync(&mut self, provider: &dyn MetadataProvider) -> usize {
        let mut applied = 0;
        loop {
            let requests = self.pending_requests();
            if requests.is_empty() {
                break;
            }
            debug!("Fetching {} metadata key(s)", requests.len());

            let results = join_all(requests.iter().map(|r| fetch_key(provider, &r.key))).await;
            for (request, result) in requests.iter().zip(results) {
                if self.complete(request, result) == Completion::Applied {
                    applied += 1;
                }
            }
        }
        applied
    }

    /// Forgets the metadata behind `field` so the next sync fetches it again.
    pub fn refresh(&mut self, field: Field) -> bool {
        match key_for(&self.manifest, &self.state, field) {
            Some(key) => {
                self.cache.invalidate(&key);
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> FormView {
        resolve(&self.manifest, &self.policy, &self.state, &self.cache)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// The record that would be submitted now.
    pub fn record(&self) -> Result<ConfigurationRecord, ValidationReport> {
        SubmissionNormalizer {
            manifest: &self.manifest,
            policy: &self.policy,
            lookup: &self.cache,
        }
        .normalize(&self.state, self.record_id)
    }

    /// Normalizes and hands the record to the store. Nothing is written on failure.
    #[instrument(skip(self, store), fields(form = %self.manifest.kind))]
    pub async fn submit(&mut self, store: &dyn RecordStore) -> Result<i64, ConsoleError> {
        let record = self.record().map_err(DomainError::Validation)?;
        let id = store.save(&record).await?;
        info!("💾 Saved {} '{}' as record {}", record.kind(), record.name(), id);
        self.record_id = Some(id);
        Ok(id)
    }

    fn retry_failed_children(&mut self, field: Field) {
        let children: Vec<Field> = self
            .manifest
            .fields
            .iter()
            .filter(|spec| spec.source.parent() == Some(field))
            .map(|spec| spec.field)
            .collect();
        for child in children {
            if let Some(key) = key_for(&self.manifest, &self.state, child) {
                if self.cache.forget_failure(&key) {
                    debug!(key = %key, "Retrying unavailable metadata");
                }
            }
        }
    }

    /// Runs the column-set reconciler when the target table's live columns are known
    /// for the first time, or differ from the last list it ran against.
    ///
    /// A stored selection seen for the first time is only repaired when it names
    /// columns the table no longer has; a deliberate subset is kept as is.
    fn reconcile_columns(&mut self) {
        if !self.policy.is_enabled(&self.manifest, &self.state, Field::Md5Columns) {
            return;
        }
        let Some(key) = key_for(&self.manifest, &self.state, Field::Md5Columns) else {
            return;
        };
        let live = match self.cache.get(&key) {
            Some(value) => value.names(),
            None => return,
        };
        let first_sighting = match self.seen_columns.get(&key) {
            Some(seen) if *seen == live => return,
            Some(_) => false,
            None => true,
        };

        let current = self.state.list(Field::Md5Columns);
        let dynamic = self.state.mode::<Flag>(Field::EnableDynamicSchema) == Some(Flag::Yes);
        let baseline = first_sighting
            && current
                .as_deref()
                .is_some_and(|c| !c.is_empty() && c.iter().all(|col| live.contains(col)));
        let outcome = if baseline {
            ReconcileOutcome::Unchanged
        } else {
            ColumnSetReconciler::reconcile(current.as_deref(), &live, dynamic)
        };
        self.seen_columns.insert(key, live);

        let table = self
            .state
            .text(Field::TargetTable)
            .unwrap_or_default()
            .to_string();
        match &outcome {
            ReconcileOutcome::Defaulted { .. } => {
                debug!("Change-detection columns defaulted for '{}'", table);
            }
            ReconcileOutcome::Repaired { added, removed, .. } => {
                info!("🔧 Schema drift repaired on '{}'", table);
                self.notices.push(Notice::SchemaDrift {
                    table: table.clone(),
                    added: added.clone(),
                    removed: removed.clone(),
                });
            }
            ReconcileOutcome::Skipped { invalid } if !invalid.is_empty() => {
                warn!("Change-detection columns missing from '{}': {:?}", table, invalid);
                self.notices.push(Notice::ColumnsMissing {
                    table: table.clone(),
                    columns: invalid.clone(),
                });
            }
            _ => {}
        }

        if let Some(selection) = outcome.selection() {
            // Not a user edit: no cascade to run, md5 has no children.
            self.state
                .set(Field::Md5Columns, Some(FieldValue::text(join_list(selection))));
        }
    }
}
