// conflux-core/src/domain/resolver/reducer.rs
//
// (old state, changed field, new value) -> (updates, cascade clears).
// Pure: the caller applies the returned updates to the Selection State in one batch.

use serde::Serialize;
use std::fmt;

use crate::domain::form::{Field, FieldValue, FormManifest, SelectionState};
use crate::domain::metadata::Connection;
use crate::domain::policy::{ExecutionLayer, LoadType, ModePolicy, ModeValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub field: Field,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = '{}' rejected: {}", self.field, self.value, self.reason)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Triggering update first, then the clears, in cascade order.
    pub updates: Vec<(Field, Option<FieldValue>)>,
    pub cleared: Vec<Field>,
    pub rejection: Option<Rejection>,
}

impl Transition {
    fn rejected(field: Field, value: &FieldValue, reason: String) -> Self {
        Self {
            rejection: Some(Rejection {
                field,
                value: value.to_string(),
                reason,
            }),
            ..Self::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.updates.is_empty()
    }
}

pub struct Reducer<'a> {
    pub manifest: &'a FormManifest,
    pub policy: &'a ModePolicy,
    /// Connection list if already known; needed to decide eligibility on a system change.
    pub connections: Option<&'a [Connection]>,
}

impl Reducer<'_> {
    pub fn reduce(
        &self,
        state: &SelectionState,
        field: Field,
        value: Option<FieldValue>,
    ) -> Transition {
        let value = match value.map(blank_to_none) {
            Some(Some(v)) => match self.policy.check_value(self.manifest, state, field, &v) {
                Ok(canonical) => Some(canonical),
                Err(reason) => return Transition::rejected(field, &v, reason),
            },
            _ => None,
        };

        if !self.manifest.contains(field) {
            return Transition::rejected(
                field,
                &FieldValue::text(""),
                format!("'{}' is not part of the {} form", field, self.manifest.kind),
            );
        }

        if state.get(field) == value.as_ref() {
            return Transition::default();
        }

        let mut cleared: Vec<Field> = self.manifest.descendants(field);

        // A layer change may leave the current load type illegal.
        if field == Field::ExecutionLayer {
            let layer = value
                .as_ref()
                .and_then(|v| v.as_text())
                .and_then(ExecutionLayer::parse);
            if let Some(load) = state.mode::<LoadType>(Field::LoadType)
                && !ModePolicy::legal_load_types(layer).contains(&load)
            {
                cleared.push(Field::LoadType);
            }
        }

        // A system change keeps the connection only if it is still eligible.
        if let Some(chain) = self.manifest.chain_for_system(field)
            && let Some(connection_id) = state.integer(chain.connection)
        {
            let eligible = match (value.as_ref().and_then(|v| v.as_text()), self.connections) {
                (Some(system), Some(connections)) => connections.iter().any(|c| {
                    c.id == connection_id
                        && self.policy.aliases().matches(system, &c.connection_type)
                }),
                _ => false,
            };
            if !eligible {
                cleared.push(chain.connection);
                cleared.extend(self.manifest.descendants(chain.connection));
            }
        }

        let mut seen = Vec::with_capacity(cleared.len());
        for f in cleared {
            if f != field && state.is_set(f) && !seen.contains(&f) {
                seen.push(f);
            }
        }

        let mut updates = vec![(field, value)];
        updates.extend(seen.iter().map(|f| (*f, None)));

        Transition {
            updates,
            cleared: seen,
            rejection: None,
        }
    }
}

fn blank_to_none(value: FieldValue) -> Option<FieldValue> {
    match &value {
        FieldValue::Text(s) if s.trim().is_empty() => None,
        _ => Some(value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::form::FormKind;

    fn connections() -> Vec<Connection> {
        vec![
            Connection {
                id: 7,
                name: "mysql_prod".into(),
                connection_type: "MySQL".into(),
            },
            Connection {
                id: 8,
                name: "pg_dwh".into(),
                connection_type: "PostgreSQL".into(),
            },
            Connection {
                id: 9,
                name: "gcp_lake".into(),
                connection_type: "GCP".into(),
            },
        ]
    }

    fn full_source_chain() -> SelectionState {
        SelectionState::with_values([
            (Field::SourceSystem, FieldValue::text("MySQL")),
            (Field::SourceConnectionId, FieldValue::Integer(7)),
            (Field::SourceSchema, FieldValue::text("sales")),
            (Field::SourceTable, FieldValue::text("orders")),
            (Field::TargetConnectionId, FieldValue::Integer(8)),
        ])
    }

    fn apply(state: &mut SelectionState, t: &Transition) {
        state.apply(&t.updates);
    }

    #[test]
    fn test_connection_change_clears_everything_below() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let conns = connections();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: Some(&conns),
        };
        let mut state = full_source_chain();

        let t = reducer.reduce(&state, Field::SourceConnectionId, Some(FieldValue::Integer(2)));
        assert_eq!(t.cleared, vec![Field::SourceSchema, Field::SourceTable]);
        apply(&mut state, &t);
        assert!(!state.is_set(Field::SourceSchema));
        assert!(!state.is_set(Field::SourceTable));
        // Other chain untouched.
        assert_eq!(state.integer(Field::TargetConnectionId), Some(8));
    }

    #[test]
    fn test_every_ancestor_change_unsets_descendants() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: None,
        };

        let mut seeded = SelectionState::with_values(
            [
                Field::TargetConnectionId,
                Field::TargetSchema,
                Field::TargetTable,
                Field::PrimaryKey,
                Field::EffectiveDateColumn,
                Field::Md5Columns,
                Field::TemporaryTargetTable,
            ]
            .map(|f| (f, FieldValue::text("x"))),
        );
        seeded.set(Field::TargetConnectionId, Some(FieldValue::Integer(1)));

        for ancestor in [Field::TargetConnectionId, Field::TargetSchema, Field::TargetTable] {
            let t = reducer.reduce(&seeded, ancestor, Some(FieldValue::text("42")));
            let mut state = SelectionState::with_values(seeded.values().clone());
            apply(&mut state, &t);
            for d in manifest.descendants(ancestor) {
                assert!(!state.is_set(d), "{} must be unset after {} changed", d, ancestor);
            }
        }
    }

    #[test]
    fn test_table_change_clears_change_detection_columns() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: None,
        };
        let state = SelectionState::with_values([
            (Field::TargetTable, FieldValue::text("orders")),
            (Field::Md5Columns, FieldValue::text("id,amount")),
            (Field::PrimaryKey, FieldValue::text("id")),
            (Field::TemporaryTargetTable, FieldValue::text("orders_tmp")),
        ]);
        let t = reducer.reduce(&state, Field::TargetTable, Some("customers".into()));
        assert!(t.cleared.contains(&Field::Md5Columns));
        assert!(t.cleared.contains(&Field::PrimaryKey));
        // Staging table hangs off the schema, not the table.
        assert!(!t.cleared.contains(&Field::TemporaryTargetTable));
    }

    #[test]
    fn test_system_change_clears_ineligible_connection() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let conns = connections();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: Some(&conns),
        };
        let state = full_source_chain();

        let t = reducer.reduce(&state, Field::SourceSystem, Some("PostgreSQL".into()));
        assert_eq!(
            t.cleared,
            vec![Field::SourceConnectionId, Field::SourceSchema, Field::SourceTable]
        );
    }

    #[test]
    fn test_system_change_keeps_eligible_connection() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let conns = connections();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: Some(&conns),
        };
        let state = SelectionState::with_values([
            (Field::SourceSystem, FieldValue::text("GCP")),
            (Field::SourceConnectionId, FieldValue::Integer(9)),
            (Field::SourceSchema, FieldValue::text("raw")),
        ]);

        // BigQuery is an alias for GCP-typed connections.
        let t = reducer.reduce(&state, Field::SourceSystem, Some("BigQuery".into()));
        assert!(t.cleared.is_empty());
        assert_eq!(t.updates.len(), 1);
    }

    #[test]
    fn test_unknown_connection_list_clears_on_system_change() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: None,
        };
        let state = full_source_chain();
        let t = reducer.reduce(&state, Field::SourceSystem, Some("MySQL 8".into()));
        assert!(t.cleared.contains(&Field::SourceConnectionId));
    }

    #[test]
    fn test_layer_change_clears_illegal_load_type() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: None,
        };
        let mut state = SelectionState::with_values([
            (Field::ExecutionLayer, FieldValue::text("Silver")),
            (Field::LoadType, FieldValue::text("SCD2")),
        ]);

        let t = reducer.reduce(&state, Field::ExecutionLayer, Some("Bronze".into()));
        assert_eq!(t.cleared, vec![Field::LoadType]);
        apply(&mut state, &t);

        // And SCD2 cannot come back while on Bronze.
        let t = reducer.reduce(&state, Field::LoadType, Some("SCD2".into()));
        assert!(t.rejection.is_some());
        assert!(t.is_noop());

        let t = reducer.reduce(&state, Field::LoadType, Some("incremental_load".into()));
        assert_eq!(t.updates, vec![(Field::LoadType, Some(FieldValue::text("Incremental")))]);
    }

    #[test]
    fn test_layer_change_keeps_legal_load_type() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: None,
        };
        let state = SelectionState::with_values([
            (Field::ExecutionLayer, FieldValue::text("Gold")),
            (Field::LoadType, FieldValue::text("Truncate")),
        ]);
        let t = reducer.reduce(&state, Field::ExecutionLayer, Some("Bronze".into()));
        assert!(t.cleared.is_empty());
    }

    #[test]
    fn test_same_value_and_blank_handling() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: None,
        };
        let state = full_source_chain();

        let t = reducer.reduce(&state, Field::SourceSchema, Some("sales".into()));
        assert!(t.is_noop());

        // Blank text is an unset, which still cascades.
        let t = reducer.reduce(&state, Field::SourceSchema, Some("  ".into()));
        assert_eq!(t.updates[0], (Field::SourceSchema, None));
        assert_eq!(t.cleared, vec![Field::SourceTable]);
    }

    #[test]
    fn test_field_outside_form_is_rejected() {
        let manifest = FormManifest::for_kind(FormKind::Reconciliation);
        let policy = ModePolicy::default();
        let reducer = Reducer {
            manifest: &manifest,
            policy: &policy,
            connections: None,
        };
        let t = reducer.reduce(&SelectionState::new(), Field::LoadType, Some("Truncate".into()));
        assert!(t.rejection.is_some());
    }
}
