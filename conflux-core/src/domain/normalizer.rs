// conflux-core/src/domain/normalizer.rs
//
// Selection State -> persisted record (submit), and persisted record -> field values
// (load). Display forms live in the state, stored forms in the record.

use regex::Regex;

use crate::domain::error::{ValidationErrorKind, ValidationReport};
use crate::domain::form::{
    ChoiceSource, Field, FieldValue, FormKind, FormManifest, SelectionState, join_list,
};
use crate::domain::metadata::MetadataLookup;
use crate::domain::policy::{
    EndpointKind, ExecutionLayer, Flag, LoadType, ModePolicy, ModeValue, ReconType,
    ValidationType,
};
use crate::domain::record::{
    ConfigurationRecord, DataQualityConfig, Endpoint, PipelineConfig, ReconciliationConfig,
};
use crate::domain::resolver::choices_for;

/// Enum-backed fields whose legality the mode policy owns.
const MODE_FIELDS: &[Field] = &[
    Field::ExecutionLayer,
    Field::LoadType,
    Field::SourceType,
    Field::TargetType,
    Field::ReconType,
    Field::ValidationType,
    Field::ActiveFlag,
    Field::EnableDynamicSchema,
];

pub struct SubmissionNormalizer<'a> {
    pub manifest: &'a FormManifest,
    pub policy: &'a ModePolicy,
    /// Metadata known at submit time. Choice checks are skipped for lists not loaded.
    pub lookup: &'a dyn MetadataLookup,
}

impl SubmissionNormalizer<'_> {
    pub fn normalize(
        &self,
        state: &SelectionState,
        id: Option<i64>,
    ) -> Result<ConfigurationRecord, ValidationReport> {
        let report = self.validate(state);
        if !report.is_empty() {
            return Err(report);
        }

        let stripped: Vec<&str> = state
            .values()
            .keys()
            .filter(|f| !self.policy.is_relevant(self.manifest, state, **f))
            .map(|f| f.as_str())
            .collect();
        if !stripped.is_empty() {
            tracing::debug!("Stripped irrelevant fields: {}", stripped.join(", "));
        }

        let view = Relevant {
            manifest: self.manifest,
            policy: self.policy,
            state,
        };
        Ok(match self.manifest.kind {
            FormKind::Pipeline => ConfigurationRecord::Pipeline(view.pipeline(id)),
            FormKind::Reconciliation => ConfigurationRecord::Reconciliation(view.reconciliation(id)),
            FormKind::DataQuality => ConfigurationRecord::DataQuality(view.data_quality(id)),
        })
    }

    /// Every per-field problem; empty when the state can be submitted.
    pub fn validate(&self, state: &SelectionState) -> ValidationReport {
        let mut report = ValidationReport::new();

        for spec in &self.manifest.fields {
            let field = spec.field;
            if !self.policy.is_relevant(self.manifest, state, field) {
                continue;
            }

            let Some(value) = state.get(field) else {
                if self.policy.is_required(self.manifest, state, field) {
                    report.push(field, ValidationErrorKind::Required, "A value is required");
                }
                continue;
            };

            // 1. Chain invariant
            let unset: Vec<&str> = self
                .manifest
                .prerequisites(field)
                .into_iter()
                .filter(|f| !state.is_set(*f))
                .map(|f| f.as_str())
                .collect();
            if !unset.is_empty() {
                report.push(
                    field,
                    ValidationErrorKind::AncestorUnset,
                    format!("Set while {} is unset", unset.join(", ")),
                );
                continue;
            }

            // 2. Mode legality and value shape
            if let Err(reason) = self.policy.check_value(self.manifest, state, field, value) {
                report.push(field, ValidationErrorKind::IllegalValue, reason);
                continue;
            }

            // 3. Membership in the choices derived from the ancestors
            if !matches!(spec.source, ChoiceSource::Free | ChoiceSource::Flag)
                && !MODE_FIELDS.contains(&field)
            {
                let choices = choices_for(self.manifest, self.policy, state, self.lookup, field);
                let items: Vec<FieldValue> = if spec.multi {
                    value.items().into_iter().map(FieldValue::Text).collect()
                } else {
                    vec![value.clone()]
                };
                let invalid: Vec<String> = items
                    .iter()
                    .filter(|item| choices.allows(item) == Some(false))
                    .map(|item| item.to_string())
                    .collect();
                if !invalid.is_empty() {
                    report.push(
                        field,
                        ValidationErrorKind::InvalidChoice,
                        format!("Not a valid choice: {}", invalid.join(", ")),
                    );
                    continue;
                }
            }

            // 4. Field rules
            if let Some(reason) = self.field_rule(state, field, value) {
                report.push(field, ValidationErrorKind::IllegalValue, reason);
            }
        }

        report
    }

    fn field_rule(&self, state: &SelectionState, field: Field, value: &FieldValue) -> Option<String> {
        match field {
            Field::PrimaryKey => {
                let items = value.items();
                let duplicate = items
                    .iter()
                    .enumerate()
                    .find(|(i, c)| items[..*i].contains(*c))
                    .map(|(_, c)| c.clone());
                duplicate.map(|c| format!("Column '{}' is listed twice", c))
            }
            Field::Threshold => match value.as_integer() {
                Some(t) if (0..=100).contains(&t) => None,
                _ => Some(format!("Threshold must be between 0 and 100, got '{}'", value)),
            },
            Field::Pattern => Regex::new(&value.to_string())
                .err()
                .map(|e| format!("Invalid regular expression: {}", e)),
            Field::MaxValue => {
                let min = state.text(Field::MinValue)?.trim().parse::<f64>().ok()?;
                let max = value.to_string().trim().parse::<f64>().ok()?;
                (min > max).then(|| format!("Max value {} is below min value {}", max, min))
            }
            Field::TemporaryTargetTable => {
                let target = state.text(Field::TargetTable)?;
                (value.as_text() == Some(target))
                    .then(|| "Temporary table must differ from the target table".to_string())
            }
            _ => None,
        }
    }
}

/// Read-through of the state that hides fields gated off by the current modes.
struct Relevant<'a> {
    manifest: &'a FormManifest,
    policy: &'a ModePolicy,
    state: &'a SelectionState,
}

impl Relevant<'_> {
    fn on(&self, field: Field) -> bool {
        self.policy.is_relevant(self.manifest, self.state, field)
    }

    fn text(&self, field: Field) -> Option<String> {
        if !self.on(field) {
            return None;
        }
        self.state.get(field).map(FieldValue::to_string)
    }

    fn integer(&self, field: Field) -> Option<i64> {
        if !self.on(field) {
            return None;
        }
        self.state.integer(field)
    }

    fn list(&self, field: Field) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        if self.on(field) {
            for item in self.state.list(field).unwrap_or_default() {
                if !out.contains(&item) {
                    out.push(item);
                }
            }
        }
        out
    }

    fn mode<T: ModeValue>(&self, field: Field) -> Option<T> {
        if !self.on(field) {
            return None;
        }
        self.state.mode::<T>(field)
    }

    fn endpoint(&self, fields: EndpointFields) -> Endpoint {
        let get = |f: Option<Field>| f.and_then(|f| self.text(f));
        Endpoint {
            system: get(fields.system),
            kind: fields.kind.and_then(|f| self.mode::<EndpointKind>(f)),
            connection_id: self.integer(fields.connection),
            schema_name: self.text(fields.schema),
            table_name: self.text(fields.table),
            column_name: get(fields.column),
            file_path: get(fields.file_path),
            delimiter: get(fields.delimiter),
            filter: get(fields.filter),
        }
    }

    fn pipeline(&self, id: Option<i64>) -> PipelineConfig {
        PipelineConfig {
            id,
            pipeline_name: self.text(Field::Name).unwrap_or_default(),
            execution_layer: self.mode::<ExecutionLayer>(Field::ExecutionLayer),
            source: self.endpoint(EndpointFields::SOURCE),
            target: self.endpoint(EndpointFields::TARGET),
            load_type: self.mode::<LoadType>(Field::LoadType),
            primary_key: self.list(Field::PrimaryKey),
            effective_date_column: self.text(Field::EffectiveDateColumn),
            md5_columns: self.list(Field::Md5Columns),
            enable_dynamic_schema: self.mode::<Flag>(Field::EnableDynamicSchema),
            temporary_target_table: self.text(Field::TemporaryTargetTable),
            custom_code: self.text(Field::CustomCode),
            execution_sequence: self.text(Field::ExecutionSequence),
            active_flag: self.mode::<Flag>(Field::ActiveFlag).unwrap_or_default(),
        }
    }

    fn reconciliation(&self, id: Option<i64>) -> ReconciliationConfig {
        ReconciliationConfig {
            id,
            rule_name: self.text(Field::Name).unwrap_or_default(),
            recon_type: self.mode::<ReconType>(Field::ReconType),
            source: self.endpoint(EndpointFields::SOURCE),
            target: self.endpoint(EndpointFields::TARGET),
            active_flag: self.mode::<Flag>(Field::ActiveFlag).unwrap_or_default(),
        }
    }

    fn data_quality(&self, id: Option<i64>) -> DataQualityConfig {
        DataQualityConfig {
            id,
            rule_name: self.text(Field::Name).unwrap_or_default(),
            validation_type: self.mode::<ValidationType>(Field::ValidationType),
            target: self.endpoint(EndpointFields::TARGET),
            reference_table_name: self.text(Field::ReferenceTable),
            reference_column_name: self.text(Field::ReferenceColumn),
            threshold: self.integer(Field::Threshold),
            min_value: self.text(Field::MinValue),
            max_value: self.text(Field::MaxValue),
            pattern: self.text(Field::Pattern),
            active_flag: self.mode::<Flag>(Field::ActiveFlag).unwrap_or_default(),
        }
    }
}

/// Field ids behind one record endpoint. Fields absent from a form read as unset.
#[derive(Clone, Copy)]
struct EndpointFields {
    system: Option<Field>,
    kind: Option<Field>,
    connection: Field,
    schema: Field,
    table: Field,
    column: Option<Field>,
    file_path: Option<Field>,
    delimiter: Option<Field>,
    filter: Option<Field>,
}

impl EndpointFields {
    const SOURCE: Self = Self {
        system: Some(Field::SourceSystem),
        kind: Some(Field::SourceType),
        connection: Field::SourceConnectionId,
        schema: Field::SourceSchema,
        table: Field::SourceTable,
        column: Some(Field::SourceColumn),
        file_path: Some(Field::SourceFilePath),
        delimiter: Some(Field::SourceDelimiter),
        filter: Some(Field::SourceFilter),
    };

    const TARGET: Self = Self {
        system: Some(Field::TargetSystem),
        kind: Some(Field::TargetType),
        connection: Field::TargetConnectionId,
        schema: Field::TargetSchema,
        table: Field::TargetTable,
        column: Some(Field::TargetColumn),
        file_path: Some(Field::TargetFilePath),
        delimiter: None,
        filter: Some(Field::TargetFilter),
    };
}

/// Inverse of [`SubmissionNormalizer::normalize`]: field values (display forms) that
/// seed a Selection State from a persisted record.
pub fn hydrate(record: &ConfigurationRecord) -> Vec<(Field, FieldValue)> {
    let mut out = Values::default();
    match record {
        ConfigurationRecord::Pipeline(c) => {
            out.text(Field::Name, Some(&c.pipeline_name));
            out.mode(Field::ExecutionLayer, c.execution_layer);
            out.endpoint(EndpointFields::SOURCE, &c.source);
            out.endpoint(EndpointFields::TARGET, &c.target);
            out.mode(Field::LoadType, c.load_type);
            out.list(Field::PrimaryKey, &c.primary_key);
            out.text(Field::EffectiveDateColumn, c.effective_date_column.as_ref());
            out.list(Field::Md5Columns, &c.md5_columns);
            out.mode(Field::EnableDynamicSchema, c.enable_dynamic_schema);
            out.text(Field::TemporaryTargetTable, c.temporary_target_table.as_ref());
            out.text(Field::CustomCode, c.custom_code.as_ref());
            out.text(Field::ExecutionSequence, c.execution_sequence.as_ref());
            out.mode(Field::ActiveFlag, Some(c.active_flag));
        }
        ConfigurationRecord::Reconciliation(c) => {
            out.text(Field::Name, Some(&c.rule_name));
            out.mode(Field::ReconType, c.recon_type);
            out.endpoint(EndpointFields::SOURCE, &c.source);
            out.endpoint(EndpointFields::TARGET, &c.target);
            out.mode(Field::ActiveFlag, Some(c.active_flag));
        }
        ConfigurationRecord::DataQuality(c) => {
            out.text(Field::Name, Some(&c.rule_name));
            out.mode(Field::ValidationType, c.validation_type);
            out.endpoint(EndpointFields::TARGET, &c.target);
            out.text(Field::ReferenceTable, c.reference_table_name.as_ref());
            out.text(Field::ReferenceColumn, c.reference_column_name.as_ref());
            if let Some(t) = c.threshold {
                out.0.push((Field::Threshold, FieldValue::Integer(t)));
            }
            out.text(Field::MinValue, c.min_value.as_ref());
            out.text(Field::MaxValue, c.max_value.as_ref());
            out.text(Field::Pattern, c.pattern.as_ref());
            out.mode(Field::ActiveFlag, Some(c.active_flag));
        }
    }

    // Only fields the record's form knows about.
    let manifest = FormManifest::for_kind(record.kind());
    out.0.retain(|(f, _)| manifest.contains(*f));
    out.0
}

#[derive(Default)]
struct Values(Vec<(Field, FieldValue)>);

impl Values {
    fn text(&mut self, field: Field, value: Option<&String>) {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.0.push((field, FieldValue::text(v.as_str())));
        }
    }

    fn mode<T: ModeValue>(&mut self, field: Field, value: Option<T>) {
        if let Some(v) = value {
            self.0.push((field, FieldValue::text(v.display())));
        }
    }

    fn list(&mut self, field: Field, items: &[String]) {
        if !items.is_empty() {
            self.0.push((field, FieldValue::text(join_list(items))));
        }
    }

    fn endpoint(&mut self, fields: EndpointFields, endpoint: &Endpoint) {
        if let Some(f) = fields.system {
            self.text(f, endpoint.system.as_ref());
        }
        if let Some(f) = fields.kind {
            self.mode(f, endpoint.kind);
        }
        if let Some(id) = endpoint.connection_id {
            self.0.push((fields.connection, FieldValue::Integer(id)));
        }
        self.text(fields.schema, endpoint.schema_name.as_ref());
        self.text(fields.table, endpoint.table_name.as_ref());
        for (field, value) in [
            (fields.column, &endpoint.column_name),
            (fields.file_path, &endpoint.file_path),
            (fields.delimiter, &endpoint.delimiter),
            (fields.filter, &endpoint.filter),
        ] {
            if let Some(f) = field {
                self.text(f, value.as_ref());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::metadata::{Lookup, MetadataKey, MetadataValue, NoMetadata};
    use std::collections::BTreeMap;

    fn pipeline_state(extra: &[(Field, FieldValue)]) -> SelectionState {
        let mut values = vec![
            (Field::Name, FieldValue::text("orders_load")),
            (Field::ExecutionLayer, FieldValue::text("Silver")),
            (Field::SourceSystem, FieldValue::text("MySQL")),
            (Field::SourceType, FieldValue::text("Table")),
            (Field::SourceConnectionId, FieldValue::Integer(1)),
            (Field::SourceSchema, FieldValue::text("shop")),
            (Field::SourceTable, FieldValue::text("orders")),
            (Field::TargetSystem, FieldValue::text("PostgreSQL")),
            (Field::TargetType, FieldValue::text("Table")),
            (Field::TargetConnectionId, FieldValue::Integer(2)),
            (Field::TargetSchema, FieldValue::text("public")),
            (Field::TargetTable, FieldValue::text("orders")),
            (Field::ActiveFlag, FieldValue::text("Y")),
        ];
        values.extend(extra.iter().cloned());
        SelectionState::with_values(values)
    }

    fn normalize(state: &SelectionState) -> Result<ConfigurationRecord, ValidationReport> {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        SubmissionNormalizer {
            manifest: &manifest,
            policy: &policy,
            lookup: &NoMetadata,
        }
        .normalize(state, None)
    }

    #[test]
    fn test_incremental_without_effective_date_is_rejected() {
        let state = pipeline_state(&[
            (Field::LoadType, FieldValue::text("Incremental")),
            (Field::PrimaryKey, FieldValue::text("id")),
        ]);
        let report = normalize(&state).unwrap_err();
        assert_eq!(
            report.kind_of(Field::EffectiveDateColumn),
            Some(ValidationErrorKind::Required)
        );
        assert!(report.to_string().contains("effective_date_column"));
    }

    #[test]
    fn test_irrelevant_values_are_stripped() {
        let state = pipeline_state(&[
            (Field::LoadType, FieldValue::text("Truncate")),
            // Left over from an earlier SCD2 selection.
            (Field::TemporaryTargetTable, FieldValue::text("orders_tmp")),
            (Field::Md5Columns, FieldValue::text("id,amount")),
        ]);
        let ConfigurationRecord::Pipeline(config) = normalize(&state).unwrap() else {
            panic!("expected a pipeline record");
        };
        assert_eq!(config.load_type, Some(LoadType::Truncate));
        assert_eq!(config.temporary_target_table, None);
        assert!(config.md5_columns.is_empty());
        assert_eq!(config.target.table_name.as_deref(), Some("orders"));
    }

    #[test]
    fn test_file_source_drops_connection_chain() {
        let state = pipeline_state(&[
            (Field::SourceType, FieldValue::text("File")),
            (Field::SourceFilePath, FieldValue::text("/landing/orders.csv")),
            (Field::SourceDelimiter, FieldValue::text(",")),
            (Field::LoadType, FieldValue::text("Truncate")),
        ]);
        let ConfigurationRecord::Pipeline(config) = normalize(&state).unwrap() else {
            panic!("expected a pipeline record");
        };
        assert_eq!(config.source.kind, Some(EndpointKind::File));
        assert_eq!(config.source.connection_id, None);
        assert_eq!(config.source.system, None);
        assert_eq!(config.source.file_path.as_deref(), Some("/landing/orders.csv"));
    }

    #[test]
    fn test_scd2_rules() {
        let state = pipeline_state(&[
            (Field::LoadType, FieldValue::text("SCD2")),
            (Field::PrimaryKey, FieldValue::text("id,id")),
            (Field::EffectiveDateColumn, FieldValue::text("updated_at")),
            (Field::Md5Columns, FieldValue::text("id,amount")),
            (Field::TemporaryTargetTable, FieldValue::text("orders")),
        ]);
        let report = normalize(&state).unwrap_err();
        assert_eq!(
            report.kind_of(Field::PrimaryKey),
            Some(ValidationErrorKind::IllegalValue)
        );
        assert_eq!(
            report.kind_of(Field::TemporaryTargetTable),
            Some(ValidationErrorKind::IllegalValue)
        );
        assert!(!report.contains(Field::Md5Columns));
    }

    #[test]
    fn test_bronze_scd_combination_is_illegal_at_submit() {
        let state = pipeline_state(&[
            (Field::ExecutionLayer, FieldValue::text("Bronze")),
            (Field::LoadType, FieldValue::text("SCD1")),
        ]);
        let report = normalize(&state).unwrap_err();
        assert_eq!(
            report.kind_of(Field::LoadType),
            Some(ValidationErrorKind::IllegalValue)
        );
    }

    #[test]
    fn test_chain_field_with_unset_ancestor() {
        let mut state = pipeline_state(&[(Field::LoadType, FieldValue::text("Truncate"))]);
        state.set(Field::TargetSchema, None);
        let report = normalize(&state).unwrap_err();
        assert_eq!(
            report.kind_of(Field::TargetTable),
            Some(ValidationErrorKind::AncestorUnset)
        );
        assert_eq!(
            report.kind_of(Field::TargetSchema),
            Some(ValidationErrorKind::Required)
        );
    }

    struct Columns(BTreeMap<MetadataKey, MetadataValue>);

    impl MetadataLookup for Columns {
        fn lookup(&self, key: &MetadataKey) -> Lookup<'_> {
            self.0.get(key).map(Lookup::Ready).unwrap_or(Lookup::Missing)
        }
    }

    #[test]
    fn test_md5_column_missing_from_live_table_is_invalid_choice() {
        let manifest = FormManifest::for_kind(FormKind::Pipeline);
        let policy = ModePolicy::default();
        let mut known = BTreeMap::new();
        known.insert(
            MetadataKey::Columns {
                connection: 2,
                schema: "public".into(),
                table: "orders".into(),
            },
            MetadataValue::Names(vec!["id".into(), "amount".into()]),
        );
        let lookup = Columns(known);
        let state = pipeline_state(&[
            (Field::LoadType, FieldValue::text("SCD1")),
            (Field::PrimaryKey, FieldValue::text("id")),
            (Field::Md5Columns, FieldValue::text("id,status")),
        ]);

        let report = SubmissionNormalizer {
            manifest: &manifest,
            policy: &policy,
            lookup: &lookup,
        }
        .validate(&state);
        assert_eq!(
            report.kind_of(Field::Md5Columns),
            Some(ValidationErrorKind::InvalidChoice)
        );
        assert!(!report.contains(Field::PrimaryKey));
    }

    #[test]
    fn test_hydrate_then_normalize_round_trips() {
        let record = ConfigurationRecord::Pipeline(PipelineConfig {
            id: Some(4),
            pipeline_name: "orders_scd".into(),
            execution_layer: Some(ExecutionLayer::Gold),
            source: Endpoint {
                system: Some("MySQL".into()),
                kind: Some(EndpointKind::Table),
                connection_id: Some(1),
                schema_name: Some("shop".into()),
                table_name: Some("orders".into()),
                ..Endpoint::default()
            },
            target: Endpoint {
                system: Some("PostgreSQL".into()),
                kind: Some(EndpointKind::Table),
                connection_id: Some(2),
                schema_name: Some("public".into()),
                table_name: Some("orders".into()),
                ..Endpoint::default()
            },
            load_type: Some(LoadType::Scd1),
            primary_key: vec!["id".into()],
            md5_columns: vec!["id".into(), "amount".into()],
            enable_dynamic_schema: Some(Flag::Yes),
            active_flag: Flag::Yes,
            ..PipelineConfig::default()
        });

        let values = hydrate(&record);
        assert!(values.contains(&(Field::LoadType, FieldValue::text("SCD1"))));
        assert!(values.contains(&(Field::ExecutionLayer, FieldValue::text("Gold"))));

        let state = SelectionState::with_values(values);
        assert_eq!(normalize(&state).map(|mut r| {
            r.set_id(4);
            r
        }), Ok(record));
    }

    #[test]
    fn test_data_quality_threshold_and_pattern() {
        let manifest = FormManifest::for_kind(FormKind::DataQuality);
        let policy = ModePolicy::default();
        let normalizer = SubmissionNormalizer {
            manifest: &manifest,
            policy: &policy,
            lookup: &NoMetadata,
        };
        let base = [
            (Field::Name, FieldValue::text("email_format")),
            (Field::TargetConnectionId, FieldValue::Integer(2)),
            (Field::TargetSchema, FieldValue::text("public")),
            (Field::TargetTable, FieldValue::text("customers")),
            (Field::TargetColumn, FieldValue::text("email")),
            (Field::ActiveFlag, FieldValue::text("Y")),
        ];

        let mut state = SelectionState::with_values(base.clone());
        state.set(Field::ValidationType, Some("Pattern Check".into()));
        state.set(Field::Pattern, Some("([a-z".into()));
        state.set(Field::Threshold, Some(FieldValue::Integer(250)));
        let report = normalizer.validate(&state);
        assert_eq!(
            report.kind_of(Field::Pattern),
            Some(ValidationErrorKind::IllegalValue)
        );
        // Threshold is not relevant for pattern checks.
        assert!(!report.contains(Field::Threshold));

        let mut state = SelectionState::with_values(base);
        state.set(Field::ValidationType, Some("Range Check".into()));
        state.set(Field::MinValue, Some("10".into()));
        state.set(Field::MaxValue, Some("2.5".into()));
        let report = normalizer.validate(&state);
        assert_eq!(
            report.kind_of(Field::MaxValue),
            Some(ValidationErrorKind::IllegalValue)
        );
    }
}
