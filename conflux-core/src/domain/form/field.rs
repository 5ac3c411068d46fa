// conflux-core/src/domain/form/field.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every field any configuration form can hold.
///
/// Forms only use a subset (see [`super::FormManifest`]); the Selection State is keyed by
/// this enum so a field name typo is a compile error instead of a silent no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    ExecutionLayer,
    ActiveFlag,

    // --- Source chain ---
    SourceSystem,
    SourceType,
    SourceConnectionId,
    SourceSchema,
    SourceTable,
    SourceColumn,
    SourceFilePath,
    SourceDelimiter,
    SourceFilter,

    // --- Target chain ---
    TargetSystem,
    TargetType,
    TargetConnectionId,
    TargetSchema,
    TargetTable,
    TargetColumn,
    TargetFilePath,
    TargetFilter,

    // --- Load behaviour (pipelines) ---
    LoadType,
    PrimaryKey,
    EffectiveDateColumn,
    Md5Columns,
    EnableDynamicSchema,
    TemporaryTargetTable,
    CustomCode,
    ExecutionSequence,

    // --- Reconciliation ---
    ReconType,

    // --- Data quality ---
    ValidationType,
    ReferenceTable,
    ReferenceColumn,
    Threshold,
    MinValue,
    MaxValue,
    Pattern,
}

impl Field {
    pub const ALL: [Field; 36] = [
        Field::Name,
        Field::ExecutionLayer,
        Field::ActiveFlag,
        Field::SourceSystem,
        Field::SourceType,
        Field::SourceConnectionId,
        Field::SourceSchema,
        Field::SourceTable,
        Field::SourceColumn,
        Field::SourceFilePath,
        Field::SourceDelimiter,
        Field::SourceFilter,
        Field::TargetSystem,
        Field::TargetType,
        Field::TargetConnectionId,
        Field::TargetSchema,
        Field::TargetTable,
        Field::TargetColumn,
        Field::TargetFilePath,
        Field::TargetFilter,
        Field::LoadType,
        Field::PrimaryKey,
        Field::EffectiveDateColumn,
        Field::Md5Columns,
        Field::EnableDynamicSchema,
        Field::TemporaryTargetTable,
        Field::CustomCode,
        Field::ExecutionSequence,
        Field::ReconType,
        Field::ValidationType,
        Field::ReferenceTable,
        Field::ReferenceColumn,
        Field::Threshold,
        Field::MinValue,
        Field::MaxValue,
        Field::Pattern,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ExecutionLayer => "execution_layer",
            Self::ActiveFlag => "active_flag",
            Self::SourceSystem => "source_system",
            Self::SourceType => "source_type",
            Self::SourceConnectionId => "source_connection_id",
            Self::SourceSchema => "source_schema",
            Self::SourceTable => "source_table",
            Self::SourceColumn => "source_column",
            Self::SourceFilePath => "source_file_path",
            Self::SourceDelimiter => "source_delimiter",
            Self::SourceFilter => "source_filter",
            Self::TargetSystem => "target_system",
            Self::TargetType => "target_type",
            Self::TargetConnectionId => "target_connection_id",
            Self::TargetSchema => "target_schema",
            Self::TargetTable => "target_table",
            Self::TargetColumn => "target_column",
            Self::TargetFilePath => "target_file_path",
            Self::TargetFilter => "target_filter",
            Self::LoadType => "load_type",
            Self::PrimaryKey => "primary_key",
            Self::EffectiveDateColumn => "effective_date_column",
            Self::Md5Columns => "md5_columns",
            Self::EnableDynamicSchema => "enable_dynamic_schema",
            Self::TemporaryTargetTable => "temporary_target_table",
            Self::CustomCode => "custom_code",
            Self::ExecutionSequence => "execution_sequence",
            Self::ReconType => "recon_type",
            Self::ValidationType => "validation_type",
            Self::ReferenceTable => "reference_table",
            Self::ReferenceColumn => "reference_column",
            Self::Threshold => "threshold",
            Self::MinValue => "min_value",
            Self::MaxValue => "max_value",
            Self::Pattern => "pattern",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

/// A primitive field value. "Null" is modelled by the field being absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Integer(_) => None,
        }
    }

    /// Integer view; numeric text (e.g. an id typed on the command line) is accepted too.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Items of a comma-joined multi-select value.
    pub fn items(&self) -> Vec<String> {
        match self {
            Self::Text(s) => split_list(s),
            Self::Integer(i) => vec![i.to_string()],
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Splits a comma-joined column list, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}
