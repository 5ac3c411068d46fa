// conflux-core/src/domain/form/manifest.rs
//
// Per-form field manifest. The pipeline, reconciliation and data-quality forms share one
// resolver; what differs between them is declared here and nowhere else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::field::{Field, FieldValue};
use crate::domain::metadata::{EnumKind, TypeFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Pipeline,
    Reconciliation,
    DataQuality,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Reconciliation => "reconciliation",
            Self::DataQuality => "data_quality",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pipeline" => Ok(Self::Pipeline),
            "reconciliation" | "recon" => Ok(Self::Reconciliation),
            "data_quality" | "dq" => Ok(Self::DataQuality),
            _ => Err(format!("Unknown form kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Source,
    Target,
}

/// Where a field's valid choices come from. The inputs of a source are also the
/// field's prerequisites, and the last input is its cascade parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceSource {
    Free,
    Flag,
    Enum(EnumKind),
    Connections {
        system: Option<Field>,
    },
    Schemas {
        connection: Field,
    },
    Tables {
        connection: Field,
        schema: Field,
    },
    Columns {
        connection: Field,
        schema: Field,
        table: Field,
    },
    TypedColumns {
        connection: Field,
        schema: Field,
        table: Field,
        filter: TypeFilter,
    },
}

impl ChoiceSource {
    pub fn inputs(&self) -> Vec<Field> {
        match *self {
            Self::Free | Self::Flag | Self::Enum(_) => vec![],
            Self::Connections { system } => system.into_iter().collect(),
            Self::Schemas { connection } => vec![connection],
            Self::Tables { connection, schema } => vec![connection, schema],
            Self::Columns {
                connection,
                schema,
                table,
            }
            | Self::TypedColumns {
                connection,
                schema,
                table,
                ..
            } => vec![connection, schema, table],
        }
    }

    /// Field whose change unconditionally clears this one.
    ///
    /// Connections have none: a system change only clears the connection when it
    /// becomes ineligible.
    pub fn parent(&self) -> Option<Field> {
        match self {
            Self::Connections { .. } => None,
            other => other.inputs().last().copied(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub source: ChoiceSource,
    /// Comma-joined multi-select.
    pub multi: bool,
}

impl FieldSpec {
    const fn new(field: Field, source: ChoiceSource) -> Self {
        Self {
            field,
            source,
            multi: false,
        }
    }

    const fn multi(field: Field, source: ChoiceSource) -> Self {
        Self {
            field,
            source,
            multi: true,
        }
    }
}

/// One connection → schema → table → column chain of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSpec {
    pub chain: Chain,
    pub system: Option<Field>,
    /// Table/File selector.
    pub kind: Option<Field>,
    pub connection: Field,
    pub schema: Field,
    pub table: Field,
    pub column: Option<Field>,
    pub file_path: Option<Field>,
    pub delimiter: Option<Field>,
}

impl ChainSpec {
    /// Fields only meaningful when the endpoint is a table.
    pub fn table_fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self.system.into_iter().collect();
        fields.extend([self.connection, self.schema, self.table]);
        fields.extend(self.column);
        fields
    }

    /// Fields only meaningful when the endpoint is a file.
    pub fn file_fields(&self) -> Vec<Field> {
        self.file_path.into_iter().chain(self.delimiter).collect()
    }
}

#[derive(Debug, Clone)]
pub struct FormManifest {
    pub kind: FormKind,
    pub fields: Vec<FieldSpec>,
    pub chains: Vec<ChainSpec>,
    pub defaults: Vec<(Field, FieldValue)>,
}

impl FormManifest {
    pub fn for_kind(kind: FormKind) -> Self {
        match kind {
            FormKind::Pipeline => Self::pipeline(),
            FormKind::Reconciliation => Self::reconciliation(),
            FormKind::DataQuality => Self::data_quality(),
        }
    }

    pub fn spec(&self, field: Field) -> Option<&FieldSpec> {
        self.fields.iter().find(|s| s.field == field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.spec(field).is_some()
    }

    pub fn parent(&self, field: Field) -> Option<Field> {
        self.spec(field).and_then(|s| s.source.parent())
    }

    /// Transitive inputs: every field that must be set before `field` is selectable.
    pub fn prerequisites(&self, field: Field) -> Vec<Field> {
        let mut out = Vec::new();
        let mut stack = self
            .spec(field)
            .map(|s| s.source.inputs())
            .unwrap_or_default();
        while let Some(f) = stack.pop() {
            if out.contains(&f) {
                continue;
            }
            out.push(f);
            if let Some(spec) = self.spec(f) {
                stack.extend(spec.source.inputs());
            }
        }
        out
    }

    /// Transitive cascade children, nearest first.
    pub fn descendants(&self, field: Field) -> Vec<Field> {
        let mut out: Vec<Field> = Vec::new();
        let mut frontier = vec![field];
        while let Some(current) = frontier.pop() {
            for spec in &self.fields {
                if spec.source.parent() == Some(current) && !out.contains(&spec.field) {
                    out.push(spec.field);
                    frontier.push(spec.field);
                }
            }
        }
        out
    }

    pub fn chain(&self, chain: Chain) -> Option<&ChainSpec> {
        self.chains.iter().find(|c| c.chain == chain)
    }

    /// Chain whose `system` selector is `field`.
    pub fn chain_for_system(&self, field: Field) -> Option<&ChainSpec> {
        self.chains.iter().find(|c| c.system == Some(field))
    }

    /// Chain owning `field` as a table or file field.
    pub fn chain_of(&self, field: Field) -> Option<&ChainSpec> {
        self.chains
            .iter()
            .find(|c| c.table_fields().contains(&field) || c.file_fields().contains(&field))
    }

    // =============================================================================
    //  FORM DEFINITIONS
    // =============================================================================

    fn pipeline() -> Self {
        use ChoiceSource::*;
        use Field::*;

        let target_cols = Columns {
            connection: TargetConnectionId,
            schema: TargetSchema,
            table: TargetTable,
        };

        Self {
            kind: FormKind::Pipeline,
            fields: vec![
                FieldSpec::new(Name, Free),
                FieldSpec::new(ExecutionLayer, Enum(EnumKind::ExecutionLayers)),
                FieldSpec::new(SourceSystem, Enum(EnumKind::SourceSystems)),
                FieldSpec::new(SourceType, Enum(EnumKind::SourceTypes)),
                FieldSpec::new(
                    SourceConnectionId,
                    Connections {
                        system: Some(SourceSystem),
                    },
                ),
                FieldSpec::new(
                    SourceSchema,
                    Schemas {
                        connection: SourceConnectionId,
                    },
                ),
                FieldSpec::new(
                    SourceTable,
                    Tables {
                        connection: SourceConnectionId,
                        schema: SourceSchema,
                    },
                ),
                FieldSpec::new(SourceFilePath, Free),
                FieldSpec::new(SourceDelimiter, Enum(EnumKind::Delimiters)),
                FieldSpec::new(TargetSystem, Enum(EnumKind::TargetSystems)),
                FieldSpec::new(TargetType, Enum(EnumKind::TargetTypes)),
                FieldSpec::new(
                    TargetConnectionId,
                    Connections {
                        system: Some(TargetSystem),
                    },
                ),
                FieldSpec::new(
                    TargetSchema,
                    Schemas {
                        connection: TargetConnectionId,
                    },
                ),
                FieldSpec::new(
                    TargetTable,
                    Tables {
                        connection: TargetConnectionId,
                        schema: TargetSchema,
                    },
                ),
                FieldSpec::new(TargetFilePath, Free),
                FieldSpec::new(LoadType, Enum(EnumKind::LoadTypes)),
                FieldSpec::multi(PrimaryKey, target_cols),
                FieldSpec::new(
                    EffectiveDateColumn,
                    TypedColumns {
                        connection: TargetConnectionId,
                        schema: TargetSchema,
                        table: TargetTable,
                        filter: TypeFilter::DateLike,
                    },
                ),
                FieldSpec::multi(Md5Columns, target_cols),
                FieldSpec::new(EnableDynamicSchema, Flag),
                FieldSpec::new(
                    TemporaryTargetTable,
                    Tables {
                        connection: TargetConnectionId,
                        schema: TargetSchema,
                    },
                ),
                FieldSpec::new(CustomCode, Free),
                FieldSpec::new(ExecutionSequence, Enum(EnumKind::ExecutionSequences)),
                FieldSpec::new(ActiveFlag, Enum(EnumKind::ActiveFlags)),
            ],
            chains: vec![
                ChainSpec {
                    chain: Chain::Source,
                    system: Some(SourceSystem),
                    kind: Some(SourceType),
                    connection: SourceConnectionId,
                    schema: SourceSchema,
                    table: SourceTable,
                    column: None,
                    file_path: Some(SourceFilePath),
                    delimiter: Some(SourceDelimiter),
                },
                ChainSpec {
                    chain: Chain::Target,
                    system: Some(TargetSystem),
                    kind: Some(TargetType),
                    connection: TargetConnectionId,
                    schema: TargetSchema,
                    table: TargetTable,
                    column: None,
                    file_path: Some(TargetFilePath),
                    delimiter: None,
                },
            ],
            defaults: vec![
                (SourceType, FieldValue::text("Table")),
                (TargetType, FieldValue::text("Table")),
                (EnableDynamicSchema, FieldValue::text("N")),
                (ActiveFlag, FieldValue::text("Y")),
            ],
        }
    }

    fn reconciliation() -> Self {
        use ChoiceSource::*;
        use Field::*;

        Self {
            kind: FormKind::Reconciliation,
            fields: vec![
                FieldSpec::new(Name, Free),
                FieldSpec::new(ReconType, Enum(EnumKind::ReconTypes)),
                FieldSpec::new(SourceSystem, Enum(EnumKind::SourceSystems)),
                FieldSpec::new(
                    SourceConnectionId,
                    Connections {
                        system: Some(SourceSystem),
                    },
                ),
                FieldSpec::new(
                    SourceSchema,
                    Schemas {
                        connection: SourceConnectionId,
                    },
                ),
                FieldSpec::new(
                    SourceTable,
                    Tables {
                        connection: SourceConnectionId,
                        schema: SourceSchema,
                    },
                ),
                FieldSpec::new(
                    SourceColumn,
                    Columns {
                        connection: SourceConnectionId,
                        schema: SourceSchema,
                        table: SourceTable,
                    },
                ),
                FieldSpec::new(SourceFilter, Free),
                FieldSpec::new(TargetSystem, Enum(EnumKind::TargetSystems)),
                FieldSpec::new(
                    TargetConnectionId,
                    Connections {
                        system: Some(TargetSystem),
                    },
                ),
                FieldSpec::new(
                    TargetSchema,
                    Schemas {
                        connection: TargetConnectionId,
                    },
                ),
                FieldSpec::new(
                    TargetTable,
                    Tables {
                        connection: TargetConnectionId,
                        schema: TargetSchema,
                    },
                ),
                FieldSpec::new(
                    TargetColumn,
                    Columns {
                        connection: TargetConnectionId,
                        schema: TargetSchema,
                        table: TargetTable,
                    },
                ),
                FieldSpec::new(TargetFilter, Free),
                FieldSpec::new(ActiveFlag, Enum(EnumKind::ActiveFlags)),
            ],
            chains: vec![
                ChainSpec {
                    chain: Chain::Source,
                    system: Some(SourceSystem),
                    kind: None,
                    connection: SourceConnectionId,
                    schema: SourceSchema,
                    table: SourceTable,
                    column: Some(SourceColumn),
                    file_path: None,
                    delimiter: None,
                },
                ChainSpec {
                    chain: Chain::Target,
                    system: Some(TargetSystem),
                    kind: None,
                    connection: TargetConnectionId,
                    schema: TargetSchema,
                    table: TargetTable,
                    column: Some(TargetColumn),
                    file_path: None,
                    delimiter: None,
                },
            ],
            defaults: vec![(ActiveFlag, FieldValue::text("Y"))],
        }
    }

    fn data_quality() -> Self {
        use ChoiceSource::*;
        use Field::*;

        Self {
            kind: FormKind::DataQuality,
            fields: vec![
                FieldSpec::new(Name, Free),
                FieldSpec::new(ValidationType, Enum(EnumKind::ValidationTypes)),
                FieldSpec::new(TargetConnectionId, Connections { system: None }),
                FieldSpec::new(
                    TargetSchema,
                    Schemas {
                        connection: TargetConnectionId,
                    },
                ),
                FieldSpec::new(
                    TargetTable,
                    Tables {
                        connection: TargetConnectionId,
                        schema: TargetSchema,
                    },
                ),
                FieldSpec::new(
                    TargetColumn,
                    Columns {
                        connection: TargetConnectionId,
                        schema: TargetSchema,
                        table: TargetTable,
                    },
                ),
                FieldSpec::new(
                    ReferenceTable,
                    Tables {
                        connection: TargetConnectionId,
                        schema: TargetSchema,
                    },
                ),
                FieldSpec::new(
                    ReferenceColumn,
                    Columns {
                        connection: TargetConnectionId,
                        schema: TargetSchema,
                        table: ReferenceTable,
                    },
                ),
                FieldSpec::new(Threshold, Free),
                FieldSpec::new(MinValue, Free),
                FieldSpec::new(MaxValue, Free),
                FieldSpec::new(Pattern, Free),
                FieldSpec::new(ActiveFlag, Enum(EnumKind::ActiveFlags)),
            ],
            chains: vec![ChainSpec {
                chain: Chain::Target,
                system: None,
                kind: None,
                connection: TargetConnectionId,
                schema: TargetSchema,
                table: TargetTable,
                column: Some(TargetColumn),
                file_path: None,
                delimiter: None,
            }],
            defaults: vec![(ActiveFlag, FieldValue::text("Y"))],
        }
    }
}
