// conflux-core/src/domain/resolver/keys.rs

use std::collections::BTreeSet;

use crate::domain::form::{ChoiceSource, Field, FormManifest, SelectionState};
use crate::domain::metadata::MetadataKey;
use crate::domain::policy::ModePolicy;

/// Metadata call behind `field`'s choices, keyed by the current values of its inputs.
/// `None` when the field takes free input or an input is still unset.
pub fn key_for(manifest: &FormManifest, state: &SelectionState, field: Field) -> Option<MetadataKey> {
    let spec = manifest.spec(field)?;
    match spec.source {
        ChoiceSource::Free | ChoiceSource::Flag => None,
        ChoiceSource::Enum(kind) => Some(MetadataKey::Enum(kind)),
        ChoiceSource::Connections { .. } => Some(MetadataKey::Connections),
        ChoiceSource::Schemas { connection } => Some(MetadataKey::Schemas {
            connection: state.integer(connection)?,
        }),
        ChoiceSource::Tables { connection, schema } => Some(MetadataKey::Tables {
            connection: state.integer(connection)?,
            schema: state.text(schema)?.to_string(),
        }),
        ChoiceSource::Columns {
            connection,
            schema,
            table,
        } => Some(MetadataKey::Columns {
            connection: state.integer(connection)?,
            schema: state.text(schema)?.to_string(),
            table: state.text(table)?.to_string(),
        }),
        ChoiceSource::TypedColumns {
            connection,
            schema,
            table,
            filter,
        } => Some(MetadataKey::TypedColumns {
            connection: state.integer(connection)?,
            schema: state.text(schema)?.to_string(),
            table: state.text(table)?.to_string(),
            filter,
        }),
    }
}

/// Every metadata key the current selection needs to offer choices for enabled fields.
pub fn wanted_keys(
    manifest: &FormManifest,
    policy: &ModePolicy,
    state: &SelectionState,
) -> BTreeSet<MetadataKey> {
    manifest
        .fields
        .iter()
        .filter(|spec| policy.is_enabled(manifest, state, spec.field))
        .filter_map(|spec| key_for(manifest, state, spec.field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::{FieldValue, FormKind};
    use crate::domain::metadata::{EnumKind, TypeFilter};

    #[test]
    fn test_keys_track_the_selected_chain() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let state = SelectionState::with_values([
            (Field::ExecutionLayer, FieldValue::text("Silver")),
            (Field::LoadType, FieldValue::text("Incremental")),
            (Field::TargetSystem, FieldValue::text("PostgreSQL")),
            (Field::TargetConnectionId, FieldValue::Integer(2)),
            (Field::TargetSchema, FieldValue::text("public")),
            (Field::TargetTable, FieldValue::text("orders")),
        ]);

        let keys = wanted_keys(&manifest, &policy, &state);
        assert!(keys.contains(&MetadataKey::Connections));
        assert!(keys.contains(&MetadataKey::Enum(EnumKind::LoadTypes)));
        assert!(keys.contains(&MetadataKey::Tables {
            connection: 2,
            schema: "public".into()
        }));
        assert!(keys.contains(&MetadataKey::TypedColumns {
            connection: 2,
            schema: "public".into(),
            table: "orders".into(),
            filter: TypeFilter::DateLike,
        }));
        // Nothing is asked for the source side beyond its enum lists.
        assert!(!keys.iter().any(|k| matches!(k, MetadataKey::Schemas { connection } if *connection != 2)));
    }

    #[test]
    fn test_no_key_until_inputs_are_set() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let state = SelectionState::with_values([(Field::SourceConnectionId, FieldValue::Integer(1))]);
        assert_eq!(
            key_for(&manifest, &state, Field::SourceSchema),
            Some(MetadataKey::Schemas { connection: 1 })
        );
        assert_eq!(key_for(&manifest, &state, Field::SourceTable), None);
        assert_eq!(key_for(&manifest, &state, Field::Name), None);
    }
}
