// conflux-core/src/domain/policy/mode_policy.rs

use crate::domain::form::{
    Chain, ChoiceSource, Field, FieldValue, FormKind, FormManifest, SelectionState, join_list,
    split_list,
};
use crate::domain::policy::alias::SystemAliases;
use crate::domain::policy::modes::{
    EndpointKind, ExecutionLayer, Flag, LoadType, ModeValue, ReconType, ValidationType,
};

const BRONZE_LOADS: &[LoadType] = &[LoadType::Truncate, LoadType::Incremental];
const ALL_LOADS: &[LoadType] = LoadType::ALL;

/// Which values a mode attribute may take, and which fields each mode switches on.
#[derive(Debug, Clone, Default)]
pub struct ModePolicy {
    aliases: SystemAliases,
}

impl ModePolicy {
    pub fn new(aliases: SystemAliases) -> Self {
        Self { aliases }
    }

    pub fn aliases(&self) -> &SystemAliases {
        &self.aliases
    }

    /// Bronze only lands raw data: no slowly-changing-dimension loads.
    pub fn legal_load_types(layer: Option<ExecutionLayer>) -> &'static [LoadType] {
        match layer {
            Some(ExecutionLayer::Bronze) => BRONZE_LOADS,
            _ => ALL_LOADS,
        }
    }

    pub fn endpoint_kind(
        manifest: &FormManifest,
        state: &SelectionState,
        chain: Chain,
    ) -> EndpointKind {
        manifest
            .chain(chain)
            .and_then(|c| c.kind)
            .and_then(|kind_field| state.mode::<EndpointKind>(kind_field))
            .unwrap_or_default()
    }

    /// Whether `field` applies under the current modes. Irrelevant fields keep their
    /// value in memory but are never submitted.
    pub fn is_relevant(&self, manifest: &FormManifest, state: &SelectionState, field: Field) -> bool {
        if !manifest.contains(field) {
            return false;
        }

        if let Some(chain) = manifest.chain_of(field)
            && chain.kind.is_some()
        {
            let kind = Self::endpoint_kind(manifest, state, chain.chain);
            if chain.file_fields().contains(&field) {
                return kind == EndpointKind::File;
            }
            if kind == EndpointKind::File {
                return false;
            }
        }

        let target_is_table =
            Self::endpoint_kind(manifest, state, Chain::Target) == EndpointKind::Table;
        let load = state.mode::<LoadType>(Field::LoadType);
        let validation = state.mode::<ValidationType>(Field::ValidationType);

        match field {
            Field::EffectiveDateColumn => {
                target_is_table && matches!(load, Some(LoadType::Incremental | LoadType::Scd2))
            }
            Field::PrimaryKey => {
                target_is_table
                    && matches!(
                        load,
                        Some(LoadType::Incremental | LoadType::Scd1 | LoadType::Scd2)
                    )
            }
            Field::Md5Columns
            | Field::EnableDynamicSchema
            | Field::CustomCode
            | Field::ExecutionSequence => target_is_table && load.is_some_and(|l| l.is_scd()),
            Field::TemporaryTargetTable => target_is_table && load == Some(LoadType::Scd2),
            Field::SourceColumn | Field::TargetColumn
                if manifest.kind == FormKind::Reconciliation =>
            {
                state.mode::<ReconType>(Field::ReconType) == Some(ReconType::AmountCheck)
            }
            Field::ReferenceTable | Field::ReferenceColumn | Field::Threshold => {
                validation.is_some_and(|v| v.needs_reference())
            }
            Field::MinValue | Field::MaxValue => validation == Some(ValidationType::RangeCheck),
            Field::Pattern => validation == Some(ValidationType::PatternCheck),
            _ => true,
        }
    }

    /// Relevant and selectable: every prerequisite up the chain is set.
    pub fn is_enabled(&self, manifest: &FormManifest, state: &SelectionState, field: Field) -> bool {
        self.is_relevant(manifest, state, field)
            && manifest
                .prerequisites(field)
                .into_iter()
                .all(|f| state.is_set(f))
    }

    pub fn is_required(&self, manifest: &FormManifest, state: &SelectionState, field: Field) -> bool {
        if !self.is_relevant(manifest, state, field) {
            return false;
        }

        let in_chain = manifest.chains.iter().any(|c| {
            c.table_fields().contains(&field) || c.file_fields().contains(&field)
        });

        match field {
            Field::Name
            | Field::ExecutionLayer
            | Field::LoadType
            | Field::SourceType
            | Field::TargetType
            | Field::ReconType
            | Field::ValidationType
            | Field::ActiveFlag => true,
            Field::EffectiveDateColumn
            | Field::Md5Columns
            | Field::TemporaryTargetTable
            | Field::ReferenceTable
            | Field::ReferenceColumn
            | Field::MinValue
            | Field::MaxValue
            | Field::Pattern => true,
            Field::PrimaryKey => state
                .mode::<LoadType>(Field::LoadType)
                .is_some_and(|l| l.is_scd()),
            _ => in_chain,
        }
    }

    /// Canonicalizes a value about to be written, or explains why it is not acceptable.
    pub fn check_value(
        &self,
        manifest: &FormManifest,
        state: &SelectionState,
        field: Field,
        value: &FieldValue,
    ) -> Result<FieldValue, String> {
        let Some(spec) = manifest.spec(field) else {
            return Err(format!("'{}' is not part of the {} form", field, manifest.kind));
        };

        if matches!(spec.source, ChoiceSource::Connections { .. }) || field == Field::Threshold {
            return value
                .as_integer()
                .map(FieldValue::Integer)
                .ok_or_else(|| format!("'{}' expects an integer, got '{}'", field, value));
        }

        let raw = value.to_string();
        match field {
            Field::ExecutionLayer => canonical::<ExecutionLayer>(field, &raw),
            Field::SourceType | Field::TargetType => canonical::<EndpointKind>(field, &raw),
            Field::ReconType => canonical::<ReconType>(field, &raw),
            Field::ValidationType => canonical::<ValidationType>(field, &raw),
            Field::ActiveFlag | Field::EnableDynamicSchema => canonical::<Flag>(field, &raw),
            Field::LoadType => {
                let load = LoadType::parse(&raw)
                    .ok_or_else(|| format!("'{}' is not a valid {}", raw, field))?;
                let layer = state.mode::<ExecutionLayer>(Field::ExecutionLayer);
                if !Self::legal_load_types(layer).contains(&load) {
                    return Err(format!(
                        "Load type '{}' is not allowed for the {} layer",
                        load.display(),
                        layer.map(|l| l.display()).unwrap_or("current")
                    ));
                }
                Ok(FieldValue::text(load.display()))
            }
            _ if spec.multi => Ok(FieldValue::text(join_list(&split_list(&raw)))),
            _ => Ok(FieldValue::text(raw.trim())),
        }
    }
}

fn canonical<T: ModeValue>(field: Field, raw: &str) -> Result<FieldValue, String> {
    T::parse(raw)
        .map(|v| FieldValue::text(v.display()))
        .ok_or_else(|| format!("'{}' is not a valid {}", raw, field))
}
