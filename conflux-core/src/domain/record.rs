// conflux-core/src/domain/record.rs
//
// Persisted shape of a configuration record, as handed to the persistence layer.
// Mode attributes are kept in their stored (lower-case) form.

use serde::{Deserialize, Serialize};

use crate::domain::form::FormKind;
use crate::domain::policy::{EndpointKind, ExecutionLayer, Flag, LoadType, ReconType, ValidationType};

/// One side (source or target) of a record. Unset attributes are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<EndpointKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub pipeline_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_layer: Option<ExecutionLayer>,
    #[serde(default)]
    pub source: Endpoint,
    #[serde(default)]
    pub target: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_type: Option<LoadType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date_column: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub md5_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_dynamic_schema: Option<Flag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary_target_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_sequence: Option<String>,
    #[serde(default)]
    pub active_flag: Flag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub rule_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recon_type: Option<ReconType>,
    #[serde(default)]
    pub source: Endpoint,
    #[serde(default)]
    pub target: Endpoint,
    #[serde(default)]
    pub active_flag: Flag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub rule_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_type: Option<ValidationType>,
    #[serde(default)]
    pub target: Endpoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_column_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default)]
    pub active_flag: Flag,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigurationRecord {
    Pipeline(PipelineConfig),
    Reconciliation(ReconciliationConfig),
    DataQuality(DataQualityConfig),
}

impl ConfigurationRecord {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Pipeline(_) => FormKind::Pipeline,
            Self::Reconciliation(_) => FormKind::Reconciliation,
            Self::DataQuality(_) => FormKind::DataQuality,
        }
    }

    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Pipeline(c) => c.id,
            Self::Reconciliation(c) => c.id,
            Self::DataQuality(c) => c.id,
        }
    }

    pub fn set_id(&mut self, id: i64) {
        match self {
            Self::Pipeline(c) => c.id = Some(id),
            Self::Reconciliation(c) => c.id = Some(id),
            Self::DataQuality(c) => c.id = Some(id),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Pipeline(c) => &c.pipeline_name,
            Self::Reconciliation(c) => &c.rule_name,
            Self::DataQuality(c) => &c.rule_name,
        }
    }
}
